use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    #[error("pipeline cancelled during stage '{stage}'")]
    Cancelled { stage: String },

    #[error("pipeline timed out after {elapsed_ms}ms (limit {limit_ms}ms)")]
    TimedOut { elapsed_ms: u64, limit_ms: u64 },

    #[error("middleware '{middleware}' failed: {message}")]
    MiddlewareFailed { middleware: String, message: String },

    #[error("shared data key '{0}' not found")]
    MissingSharedData(String),

    #[error("shared data key '{0}' had an unexpected shape: {1}")]
    SharedDataShape(String, String),

    #[error(transparent)]
    Core(#[from] steelcad_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failed_display() {
        let err = PipelineError::StageFailed { stage: "lex".into(), message: "bad byte".into() };
        assert_eq!(err.to_string(), "stage 'lex' failed: bad byte");
    }

    #[test]
    fn test_timed_out_display() {
        let err = PipelineError::TimedOut { elapsed_ms: 120, limit_ms: 50 };
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_cancelled_display() {
        let err = PipelineError::Cancelled { stage: "semantic".into() };
        assert!(err.to_string().contains("semantic"));
    }
}
