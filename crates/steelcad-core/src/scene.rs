//! Pivot scene model (component J): the neutral output of any import,
//! independent of the source format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::part::Part;

/// Per-block/per-element occurrence counts the semantic stage attaches
/// to the scene, e.g. `{"ST": 1, "BO": 2, "EN": 1}` for DSTV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneMetadata {
    pub element_counts: HashMap<String, u64>,
    #[serde(default)]
    pub source_format: Option<String>,
}

/// The neutral in-memory representation every format plugin converts
/// into and the geometry/feature stages consume. Owns its parts; dropping
/// the scene releases their solids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub parts: Vec<Part>,
    pub metadata: SceneMetadata,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    pub fn total_features(&self) -> usize {
        self.parts.iter().map(|p| p.features.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::part::{OriginMetadata, ProfileDimensions};

    fn sample_part(id: &str) -> Part {
        Part {
            id: id.to_string(),
            designation: "IPE300".into(),
            material_grade: "S355".into(),
            dimensions: ProfileDimensions::IBeam {
                height: 300.0,
                width: 150.0,
                web_thickness: 7.1,
                flange_thickness: 10.7,
                root_radius: 15.0,
                toe_radius: 0.0,
            },
            length_mm: 2700.0,
            origin: OriginMetadata::default(),
            features: Vec::new(),
            solid: None,
        }
    }

    #[test]
    fn test_scene_accumulates_parts() {
        let scene = Scene::new().with_part(sample_part("p1")).with_part(sample_part("p2"));
        assert_eq!(scene.parts.len(), 2);
    }

    #[test]
    fn test_scene_total_features_sums_across_parts() {
        let mut a = sample_part("p1");
        a.features.push(crate::part::Feature {
            id: "BO_1_0".into(),
            face: crate::part::Face::Web,
            position: crate::geometry::Point2D::origin(),
            source_line: 1,
            source_column: 1,
            kind: crate::part::FeatureKind::Hole(crate::part::HoleParams {
                diameter: 10.0,
                through_blind: crate::part::ThroughBlind::Through,
                depth: None,
            }),
        });
        let scene = Scene::new().with_part(a).with_part(sample_part("p2"));
        assert_eq!(scene.total_features(), 1);
    }
}
