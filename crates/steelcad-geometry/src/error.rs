use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("profile category {0:?} has no cross-section generator")]
    UnsupportedCategory(steelcad_core::ProfileCategory),

    #[error("degenerate cross-section: {0}")]
    DegenerateProfile(String),

    #[error("polygon could not be triangulated: {0}")]
    TriangulationFailed(String),

    #[error(transparent)]
    Core(#[from] steelcad_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_category_display() {
        let err = GeometryError::UnsupportedCategory(steelcad_core::ProfileCategory::Plate);
        assert!(err.to_string().contains("Plate"));
    }
}
