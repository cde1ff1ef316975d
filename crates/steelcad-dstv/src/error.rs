use thiserror::Error;

#[derive(Debug, Error)]
pub enum DstvError {
    #[error("lex error at {line}:{column}: {message}")]
    Lex { line: usize, column: usize, message: String },

    #[error("unknown block kind: {0}")]
    UnknownBlockKind(String),

    #[error("block {kind} at line {line}: {message}")]
    BlockParse { kind: String, line: usize, message: String },

    #[error("missing ST block")]
    MissingStart,

    #[error("missing EN block")]
    MissingEnd,

    #[error("ST block must precede any feature block (feature at line {0})")]
    FeatureBeforeStart(usize),

    #[error(transparent)]
    Core(#[from] steelcad_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_display() {
        let err = DstvError::Lex { line: 3, column: 5, message: "bad byte".into() };
        assert_eq!(err.to_string(), "lex error at 3:5: bad byte");
    }

    #[test]
    fn test_missing_start_display() {
        assert_eq!(DstvError::MissingStart.to_string(), "missing ST block");
    }
}
