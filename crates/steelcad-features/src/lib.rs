//! Feature processor dispatch (component C): applies a part's feature list
//! to its base solid, one processor per `FeatureKind`, in declaration
//! order, without aborting on a single feature's failure.

pub mod boolean;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod processors;

pub use dispatch::{apply_features, FeatureOutcome};
pub use error::FeatureError;
pub use frame::{extents, face_frame, thickness_at_face, FaceFrame};
