//! Profile catalogue loader (component A): static cross-section property
//! tables keyed by designation, loaded from a bundled data file at
//! construction. Not a hot path — no caching tier, matches the design note
//! that catalogue data needs none.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Error;
use crate::part::ProfileDimensions;

const BUNDLED_PROFILES_TOML: &str = include_str!("../data/profiles.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "profile", default)]
    profiles: Vec<CatalogEntryRaw>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntryRaw {
    designation: String,
    #[serde(flatten)]
    dimensions: ProfileDimensions,
}

/// Immutable, in-memory table of known profile designations. Construct
/// once via [`Catalog::load`] and share a reference; the table never
/// mutates after load.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: HashMap<String, ProfileDimensions>,
}

impl Catalog {
    /// Loads the bundled illustrative catalogue embedded in the binary.
    pub fn load() -> Result<Self, Error> {
        Self::from_toml_str(BUNDLED_PROFILES_TOML)
    }

    /// Loads a catalogue from an arbitrary TOML document in the same
    /// `[[profile]]` shape, for callers supplying their own full tables.
    pub fn from_toml_str(toml_source: &str) -> Result<Self, Error> {
        let file: CatalogFile = toml::from_str(toml_source)?;
        let mut entries = HashMap::with_capacity(file.profiles.len());
        for entry in file.profiles {
            entry.dimensions.validate()?;
            entries.insert(entry.designation, entry.dimensions);
        }
        Ok(Self { entries })
    }

    pub fn lookup(&self, designation: &str) -> Option<&ProfileDimensions> {
        self.entries.get(designation)
    }

    pub fn get(&self, designation: &str) -> Result<&ProfileDimensions, Error> {
        self.lookup(designation)
            .ok_or_else(|| Error::UnknownDesignation(designation.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn designations(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::ProfileCategory;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::load().unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_lookup_known_designation() {
        let catalog = Catalog::load().unwrap();
        let dims = catalog.get("IPE300").unwrap();
        assert_eq!(dims.category(), ProfileCategory::IBeam);
    }

    #[test]
    fn test_lookup_unknown_designation_errors() {
        let catalog = Catalog::load().unwrap();
        let err = catalog.get("NOT_A_REAL_PROFILE").unwrap_err();
        assert!(matches!(err, Error::UnknownDesignation(_)));
    }

    #[test]
    fn test_hollow_square_designation_present() {
        let catalog = Catalog::load().unwrap();
        let dims = catalog.get("HSS51X51X4.8").unwrap();
        assert_eq!(dims.category(), ProfileCategory::HollowSquare);
    }

    #[test]
    fn test_from_toml_str_rejects_invalid_entry() {
        let bad = r#"
            [[profile]]
            designation = "BAD"
            category = "PLATE"
            width = -1.0
            height = 10.0
            thickness = 2.0
        "#;
        assert!(Catalog::from_toml_str(bad).is_err());
    }

    #[test]
    fn test_designations_iterator_covers_all_entries() {
        let catalog = Catalog::load().unwrap();
        let count = catalog.designations().count();
        assert_eq!(count, catalog.len());
    }
}
