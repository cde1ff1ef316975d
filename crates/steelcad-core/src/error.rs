use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The error taxonomy surfaced through result envelopes. Not exhaustive
/// Rust error *types* — a classification every structured error carries so
/// callers can decide retry/abort policy without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller misuse: unknown format id, invalid options. Never retried.
    Usage,
    /// Input failed a structural or semantic check. Non-fatal in lenient
    /// mode, fatal in strict mode.
    Validation,
    /// Plugin lacks a required capability for the requested operation.
    Capability,
    /// Timeout, cancellation, or memory-limit exceeded.
    Resource,
    /// Invariant violation. Always fatal.
    Internal,
}

/// Where in the source an error or warning originated, when known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
}

impl Location {
    pub fn at_line(file_line: usize) -> Self {
        Self { file_line: Some(file_line), ..Default::default() }
    }
}

/// The uniform shape every error and warning takes once it reaches a
/// processing context or a result envelope. Parsers and feature
/// processors build these directly rather than raising exceptions; only
/// `ErrorKind::Internal` invariant violations propagate as a Rust `Err`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl StructuredError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), location: None, cause: None }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Resource, message)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("parameter not found: {0}")]
    ParameterNotFound(String),

    #[error("value out of range: {name} = {value} (expected {min}..{max})")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown profile designation: {0}")]
    UnknownDesignation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_dimension() {
        let err = Error::InvalidDimension("width must be positive".into());
        assert_eq!(err.to_string(), "invalid dimension: width must be positive");
    }

    #[test]
    fn test_error_display_out_of_range() {
        let err = Error::OutOfRange {
            name: "rpm".into(),
            value: 30000.0,
            min: 0.0,
            max: 24000.0,
        };
        assert!(err.to_string().contains("30000"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_display_unknown_designation() {
        let err = Error::UnknownDesignation("IPE999".into());
        assert_eq!(err.to_string(), "unknown profile designation: IPE999");
    }

    #[test]
    fn test_structured_error_builder() {
        let err = StructuredError::validation("missing ST block")
            .with_location(Location::at_line(1))
            .with_cause("file starts with BO");
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.location.unwrap().file_line, Some(1));
        assert_eq!(err.cause.as_deref(), Some("file starts with BO"));
    }

    #[test]
    fn test_structured_error_serde_omits_absent_fields() {
        let err = StructuredError::internal("vertex count below 4");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("location"));
        assert!(!json.contains("cause"));
    }
}
