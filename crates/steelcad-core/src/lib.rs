pub mod catalog;
pub mod error;
pub mod geometry;
pub mod part;
pub mod scene;

pub use catalog::Catalog;
pub use error::{Error, ErrorKind, Location, StructuredError};
pub use geometry::{BoundingBox, FaceRegion, Point2D, Point3D, PolySegment, Solid, Vector2D, Vector3D};
pub use part::{
    BevelType, ChamferParams, ColdFormedShape, Contour, ContourParams, EndCutParams, Face,
    Feature, FeatureKind, GrooveParams, Handedness, HeatTreatParams, HoleParams, MarkingMethod,
    MarkingParams, NotchParams, NotchShape, OriginMetadata, Part, PunchParams, ProfileCategory,
    ProfileDimensions, ReferenceEnd, SlottedHoleParams, ThreadParams, ThroughBlind,
};
pub use scene::{Scene, SceneMetadata};
