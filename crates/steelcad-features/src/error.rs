use steelcad_core::Face;
use thiserror::Error;

/// Non-aborting per-feature failure: collected by the dispatcher and
/// handed back to the caller rather than short-circuiting the whole part.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeatureError {
    #[error("feature {feature_id} ({kind}): {message}")]
    Validation { feature_id: String, kind: &'static str, message: String },

    #[error("feature {feature_id} ({kind}) has no registered processor; left attached for retry")]
    UnsupportedKind { feature_id: String, kind: &'static str },

    #[error("feature {feature_id}: face {face:?} has no position frame on this part")]
    UnsupportedFace { feature_id: String, face: Face },

    #[error("post-condition violated: solid has {0} vertices after feature application, expected at least 4")]
    DegenerateResult(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display_includes_feature_id() {
        let err = FeatureError::Validation {
            feature_id: "BO_12_0".into(),
            kind: "HOLE",
            message: "diameter exceeds face width".into(),
        };
        assert!(err.to_string().contains("BO_12_0"));
    }
}
