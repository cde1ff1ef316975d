use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("format id '{0}' is already registered")]
    DuplicatePlugin(String),

    #[error("unknown format: {0}")]
    UnknownFormat(String),

    #[error("cannot detect format; scored candidates: {candidates:?}")]
    CannotDetectFormat { candidates: Vec<(String, f64)> },

    #[error("plugin failed validation: {fields:?}")]
    PluginValidationError { fields: Vec<String> },

    #[error("plugin '{0}' does not support {1}")]
    CapabilityMissing(String, &'static str),

    #[error(transparent)]
    Pipeline(#[from] steelcad_pipeline::PipelineError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_plugin_display() {
        let err = EngineError::DuplicatePlugin("dstv".into());
        assert_eq!(err.to_string(), "format id 'dstv' is already registered");
    }

    #[test]
    fn test_cannot_detect_format_display_lists_candidates() {
        let err = EngineError::CannotDetectFormat { candidates: vec![("dstv".into(), 0.3)] };
        assert!(err.to_string().contains("dstv"));
    }
}
