//! Cross-section and extrusion library: turns a `ProfileDimensions` plus a
//! part length into a triangulated `Solid`, dispatched by profile category.

pub mod error;
pub mod extrude;
pub mod generators;
pub mod optimize;
pub mod profile2d;
pub mod triangulate;

pub use error::GeometryError;
pub use extrude::extrude;
pub use generators::generate;
pub use optimize::weld_duplicate_vertices;
pub use profile2d::{Section2D, CIRCULAR_SEGMENTS, HOT_ROLLED_FILLET_SEGMENTS};
pub use triangulate::{ear_clip, ensure_ccw, ensure_cw, triangulate_with_holes};
