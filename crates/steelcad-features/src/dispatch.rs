//! Applies a part's whole feature list to its base solid, in declaration
//! order, without aborting on a single feature's failure (§4.7).

use steelcad_core::{Part, Solid};

use crate::error::FeatureError;
use crate::processors;

/// Every feature kind currently has a registered processor (§4.7's
/// "unsupported kinds produce a warning and are skipped" path exists for
/// forward compatibility with feature kinds this engine doesn't know about
/// yet, which can only arise if the data model grows without this crate
/// being updated in lock-step).
pub struct FeatureOutcome {
    pub solid: Solid,
    pub errors: Vec<FeatureError>,
}

pub fn apply_features(part: &Part, base_solid: Solid) -> FeatureOutcome {
    let mut solid = base_solid;
    let mut errors = Vec::new();

    for (index, feature) in part.features.iter().enumerate() {
        let prior = &part.features[..index];
        if let Err(err) = processors::apply(&mut solid, part, feature, prior) {
            errors.push(err);
        }
    }

    if solid.vertex_count() < 4 {
        errors.push(FeatureError::DegenerateResult(solid.vertex_count()));
    }

    FeatureOutcome { solid, errors }
}
