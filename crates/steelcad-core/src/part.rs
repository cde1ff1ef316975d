//! The pivot data model: the neutral representation every format plugin
//! converts into and every geometry/feature stage consumes. Independent of
//! DSTV or any other input format.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::geometry::{PolySegment, Point2D, Solid};

/// Which named face of a profile a feature's coordinates are local to.
/// DSTV face codes `v/o/u/h` map onto this deterministically (see the DSTV
/// plugin's semantic stage) — this type itself carries no format knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Face {
    TopFlange,
    BottomFlange,
    Web,
    Front,
}

/// Closed set of cross-section families. Each variant has a fixed required
/// dimension set, enforced by `ProfileDimensions::validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileCategory {
    IBeam,
    ChannelU,
    Angle,
    Tee,
    HollowRect,
    HollowSquare,
    HollowCircular,
    ColdFormedC,
    ColdFormedZ,
    ColdFormedSigma,
    ColdFormedOmega,
    Flat,
    RoundBar,
    SquareBar,
    Plate,
}

/// Which of the four cold-formed families a `ProfileDimensions::ColdFormed`
/// value belongs to. A separate discriminant rather than four dimension
/// variants since C/Z/Sigma/Omega share the same four scalar dimensions
/// (height, width, thickness, lip length) and differ only in how the lip
/// folds and which side the flanges open to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColdFormedShape {
    C,
    Z,
    Sigma,
    Omega,
}

/// Cross-section dimensions, one variant per `ProfileCategory`. Kept as a
/// tagged union rather than one struct with every field optional so a
/// missing required dimension is a compile-time, not a runtime, shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileDimensions {
    IBeam {
        height: f64,
        width: f64,
        web_thickness: f64,
        flange_thickness: f64,
        root_radius: f64,
        toe_radius: f64,
    },
    ChannelU {
        height: f64,
        width: f64,
        web_thickness: f64,
        flange_thickness: f64,
        root_radius: f64,
        toe_radius: f64,
    },
    Angle {
        leg1: f64,
        leg2: f64,
        thickness: f64,
        root_radius: f64,
        toe_radius: f64,
    },
    Tee {
        height: f64,
        width: f64,
        web_thickness: f64,
        flange_thickness: f64,
        root_radius: f64,
    },
    HollowRect {
        height: f64,
        width: f64,
        wall_thickness: f64,
        outer_radius: f64,
    },
    HollowSquare {
        height: f64,
        width: f64,
        wall_thickness: f64,
        outer_radius: f64,
    },
    HollowCircular {
        outer_diameter: f64,
        wall_thickness: f64,
    },
    ColdFormed {
        shape: ColdFormedShape,
        height: f64,
        width: f64,
        thickness: f64,
        lip_length: f64,
    },
    FlatBar {
        width: f64,
        thickness: f64,
    },
    RoundBar {
        diameter: f64,
    },
    SquareBar {
        width: f64,
        thickness: f64,
    },
    Plate {
        width: f64,
        height: f64,
        thickness: f64,
    },
}

impl ProfileDimensions {
    pub fn category(&self) -> ProfileCategory {
        match self {
            ProfileDimensions::IBeam { .. } => ProfileCategory::IBeam,
            ProfileDimensions::ChannelU { .. } => ProfileCategory::ChannelU,
            ProfileDimensions::Angle { .. } => ProfileCategory::Angle,
            ProfileDimensions::Tee { .. } => ProfileCategory::Tee,
            ProfileDimensions::HollowRect { .. } => ProfileCategory::HollowRect,
            ProfileDimensions::HollowSquare { .. } => ProfileCategory::HollowSquare,
            ProfileDimensions::HollowCircular { .. } => ProfileCategory::HollowCircular,
            ProfileDimensions::ColdFormed { shape, .. } => match shape {
                ColdFormedShape::C => ProfileCategory::ColdFormedC,
                ColdFormedShape::Z => ProfileCategory::ColdFormedZ,
                ColdFormedShape::Sigma => ProfileCategory::ColdFormedSigma,
                ColdFormedShape::Omega => ProfileCategory::ColdFormedOmega,
            },
            ProfileDimensions::FlatBar { .. } => ProfileCategory::Flat,
            ProfileDimensions::RoundBar { .. } => ProfileCategory::RoundBar,
            ProfileDimensions::SquareBar { .. } => ProfileCategory::SquareBar,
            ProfileDimensions::Plate { .. } => ProfileCategory::Plate,
        }
    }

    /// Checks the invariants from the data model: all linear dimensions
    /// strictly positive, hollow-section wall thickness leaves a positive
    /// core, and hot-rolled fillet radii don't exceed the flange.
    pub fn validate(&self) -> Result<(), Error> {
        let positive = |name: &str, v: f64| -> Result<(), Error> {
            if v > 0.0 {
                Ok(())
            } else {
                Err(Error::InvalidDimension(format!("{name} must be positive, got {v}")))
            }
        };

        match *self {
            ProfileDimensions::IBeam { height, width, web_thickness, flange_thickness, root_radius, toe_radius } => {
                positive("height", height)?;
                positive("width", width)?;
                positive("web_thickness", web_thickness)?;
                positive("flange_thickness", flange_thickness)?;
                if root_radius + toe_radius > flange_thickness {
                    return Err(Error::InvalidDimension(
                        "root_radius + toe_radius must not exceed flange_thickness".into(),
                    ));
                }
            }
            ProfileDimensions::ChannelU { height, width, web_thickness, flange_thickness, root_radius, toe_radius } => {
                positive("height", height)?;
                positive("width", width)?;
                positive("web_thickness", web_thickness)?;
                positive("flange_thickness", flange_thickness)?;
                if root_radius + toe_radius > flange_thickness {
                    return Err(Error::InvalidDimension(
                        "root_radius + toe_radius must not exceed flange_thickness".into(),
                    ));
                }
            }
            ProfileDimensions::Angle { leg1, leg2, thickness, .. } => {
                positive("leg1", leg1)?;
                positive("leg2", leg2)?;
                positive("thickness", thickness)?;
            }
            ProfileDimensions::Tee { height, width, web_thickness, flange_thickness, .. } => {
                positive("height", height)?;
                positive("width", width)?;
                positive("web_thickness", web_thickness)?;
                positive("flange_thickness", flange_thickness)?;
            }
            ProfileDimensions::HollowRect { height, width, wall_thickness, .. } => {
                positive("height", height)?;
                positive("width", width)?;
                positive("wall_thickness", wall_thickness)?;
                if 2.0 * wall_thickness >= height.min(width) {
                    return Err(Error::InvalidDimension(
                        "2*wall_thickness must be less than min(height, width)".into(),
                    ));
                }
            }
            ProfileDimensions::HollowSquare { height, width, wall_thickness, .. } => {
                positive("height", height)?;
                positive("width", width)?;
                positive("wall_thickness", wall_thickness)?;
                if (height - width).abs() > 1e-6 {
                    return Err(Error::InvalidDimension("HOLLOW_SQUARE requires height == width".into()));
                }
                if 2.0 * wall_thickness >= height {
                    return Err(Error::InvalidDimension(
                        "2*wall_thickness must be less than the section size".into(),
                    ));
                }
            }
            ProfileDimensions::HollowCircular { outer_diameter, wall_thickness } => {
                positive("outer_diameter", outer_diameter)?;
                positive("wall_thickness", wall_thickness)?;
                if 2.0 * wall_thickness >= outer_diameter {
                    return Err(Error::InvalidDimension(
                        "2*wall_thickness must be less than outer_diameter".into(),
                    ));
                }
            }
            ProfileDimensions::ColdFormed { height, width, thickness, .. } => {
                positive("height", height)?;
                positive("width", width)?;
                positive("thickness", thickness)?;
            }
            ProfileDimensions::FlatBar { width, thickness } | ProfileDimensions::SquareBar { width, thickness } => {
                positive("width", width)?;
                positive("thickness", thickness)?;
            }
            ProfileDimensions::RoundBar { diameter } => {
                positive("diameter", diameter)?;
            }
            ProfileDimensions::Plate { width, height, thickness } => {
                positive("width", width)?;
                positive("height", height)?;
                positive("thickness", thickness)?;
            }
        }
        Ok(())
    }
}

/// A closed polyline in face-local coordinates, optionally with arc
/// (bulge) segments. Shared by OUTER_CONTOUR / INNER_CONTOUR / KA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub segments: Vec<PolySegment>,
}

impl Contour {
    pub fn is_closed(&self, tolerance_mm: f64) -> bool {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => first.start.distance_to(last.end) <= tolerance_mm,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThroughBlind {
    Through,
    Blind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkingMethod {
    Engrave,
    Stamp,
    Laser,
    Paint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BevelType {
    Square,
    Single,
    Double,
    Weld,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotchShape {
    Rectangular,
    V,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceEnd {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleParams {
    pub diameter: f64,
    pub through_blind: ThroughBlind,
    #[serde(default)]
    pub depth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlottedHoleParams {
    pub diameter: f64,
    pub slot_length: f64,
    pub slot_angle: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadParams {
    pub nominal_diameter: f64,
    pub pitch: f64,
    pub depth: f64,
    pub handedness: Handedness,
    pub class: String,
    #[serde(default)]
    pub standard: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourParams {
    pub contour: Contour,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndCutParams {
    pub angles: Vec<f64>,
    pub reference_end: ReferenceEnd,
    pub bevel_type: BevelType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotchParams {
    pub shape: NotchShape,
    pub size: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkingParams {
    pub text: String,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub rotation: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub method: Option<MarkingMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunchParams {
    #[serde(default)]
    pub force: Option<f64>,
    #[serde(default)]
    pub depth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChamferParams {
    pub edge_locator: String,
    #[serde(default = "default_chamfer_angle")]
    pub angle: f64,
    pub size: f64,
}

fn default_chamfer_angle() -> f64 {
    45.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrooveParams {
    pub start: Point2D,
    pub end: Point2D,
    pub width: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatTreatParams {
    pub polygon: Vec<Point2D>,
    pub method: String,
    pub intensity: f64,
}

/// The 12 recognised feature kinds, each carrying its own parameter struct.
/// Internally tagged on `kind` so the wire shape matches the data model's
/// `{kind, parameters...}` envelope described for each DSTV block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureKind {
    Hole(HoleParams),
    SlottedHole(SlottedHoleParams),
    Thread(ThreadParams),
    OuterContour(ContourParams),
    InnerContour(ContourParams),
    EndCut(EndCutParams),
    Notch(NotchParams),
    Marking(MarkingParams),
    Punch(PunchParams),
    Chamfer(ChamferParams),
    Groove(GrooveParams),
    HeatTreatArea(HeatTreatParams),
}

impl FeatureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FeatureKind::Hole(_) => "HOLE",
            FeatureKind::SlottedHole(_) => "SLOTTED_HOLE",
            FeatureKind::Thread(_) => "THREAD",
            FeatureKind::OuterContour(_) => "OUTER_CONTOUR",
            FeatureKind::InnerContour(_) => "INNER_CONTOUR",
            FeatureKind::EndCut(_) => "END_CUT",
            FeatureKind::Notch(_) => "NOTCH",
            FeatureKind::Marking(_) => "MARKING",
            FeatureKind::Punch(_) => "PUNCH",
            FeatureKind::Chamfer(_) => "CHAMFER",
            FeatureKind::Groove(_) => "GROOVE",
            FeatureKind::HeatTreatArea(_) => "HEAT_TREAT_AREA",
        }
    }
}

/// A single operational feature parsed from the source file, in the
/// uniform envelope the semantic stage produces regardless of which block
/// kind it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: String,
    pub face: Face,
    pub position: Point2D,
    pub source_line: usize,
    pub source_column: usize,
    pub kind: FeatureKind,
}

/// Where a part came from, for diagnostics — not part of its geometric
/// identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OriginMetadata {
    pub source_file: Option<String>,
    pub order_number: Option<String>,
    pub drawing_number: Option<String>,
    pub phase_number: Option<String>,
    pub piece_number: Option<String>,
}

/// A single manufactured piece: the pivot element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: String,
    pub designation: String,
    pub material_grade: String,
    pub dimensions: ProfileDimensions,
    pub length_mm: f64,
    #[serde(default)]
    pub origin: OriginMetadata,
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solid: Option<Solid>,
}

impl Part {
    pub fn category(&self) -> ProfileCategory {
        self.dimensions.category()
    }

    /// Data-model invariant #1 from the testable-properties list: positive
    /// length and all dimensions.
    pub fn validate(&self) -> Result<(), Error> {
        if self.length_mm <= 0.0 {
            return Err(Error::InvalidDimension(format!(
                "part {} has non-positive length {}",
                self.id, self.length_mm
            )));
        }
        self.dimensions.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_i_beam() -> ProfileDimensions {
        ProfileDimensions::IBeam {
            height: 300.0,
            width: 150.0,
            web_thickness: 7.1,
            flange_thickness: 10.7,
            root_radius: 15.0,
            toe_radius: 0.0,
        }
    }

    #[test]
    fn test_i_beam_validate_ok() {
        assert!(sample_i_beam().validate().is_ok());
    }

    #[test]
    fn test_i_beam_category() {
        assert_eq!(sample_i_beam().category(), ProfileCategory::IBeam);
    }

    #[test]
    fn test_i_beam_validate_rejects_fillet_larger_than_flange() {
        let dims = ProfileDimensions::IBeam {
            height: 300.0,
            width: 150.0,
            web_thickness: 7.1,
            flange_thickness: 10.7,
            root_radius: 20.0,
            toe_radius: 5.0,
        };
        assert!(dims.validate().is_err());
    }

    #[test]
    fn test_hollow_rect_wall_thickness_invariant() {
        let ok = ProfileDimensions::HollowRect {
            height: 50.8,
            width: 50.8,
            wall_thickness: 4.78,
            outer_radius: 6.0,
        };
        assert!(ok.validate().is_ok());

        let bad = ProfileDimensions::HollowRect {
            height: 10.0,
            width: 10.0,
            wall_thickness: 6.0,
            outer_radius: 2.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_hollow_square_requires_equal_height_width() {
        let bad = ProfileDimensions::HollowSquare {
            height: 50.0,
            width: 40.0,
            wall_thickness: 4.0,
            outer_radius: 5.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_hollow_circular_wall_thickness_invariant() {
        let bad = ProfileDimensions::HollowCircular {
            outer_diameter: 10.0,
            wall_thickness: 6.0,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_negative_dimension_rejected() {
        let bad = ProfileDimensions::Plate { width: -5.0, height: 10.0, thickness: 2.0 };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_part_validate_rejects_zero_length() {
        let part = Part {
            id: "p1".into(),
            designation: "IPE300".into(),
            material_grade: "S355".into(),
            dimensions: sample_i_beam(),
            length_mm: 0.0,
            origin: OriginMetadata::default(),
            features: Vec::new(),
            solid: None,
        };
        assert!(part.validate().is_err());
    }

    #[test]
    fn test_feature_kind_name() {
        let hole = FeatureKind::Hole(HoleParams { diameter: 17.5, through_blind: ThroughBlind::Through, depth: None });
        assert_eq!(hole.name(), "HOLE");
    }

    #[test]
    fn test_feature_serde_round_trip() {
        let feature = Feature {
            id: "BO_12_0".into(),
            face: Face::Web,
            position: Point2D::new(89.01, 25.40),
            source_line: 12,
            source_column: 1,
            kind: FeatureKind::Hole(HoleParams {
                diameter: 17.5,
                through_blind: ThroughBlind::Through,
                depth: None,
            }),
        };
        let json = serde_json::to_string(&feature).unwrap();
        let back: Feature = serde_json::from_str(&json).unwrap();
        assert_eq!(back, feature);
        assert!(json.contains("\"kind\":\"HOLE\""));
    }

    #[test]
    fn test_contour_is_closed() {
        let square = Contour {
            segments: vec![
                PolySegment::straight(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)),
                PolySegment::straight(Point2D::new(10.0, 0.0), Point2D::new(10.0, 10.0)),
                PolySegment::straight(Point2D::new(10.0, 10.0), Point2D::new(0.0, 10.0)),
                PolySegment::straight(Point2D::new(0.0, 10.0), Point2D::new(0.0, 0.0)),
            ],
        };
        assert!(square.is_closed(1e-9));
    }

    #[test]
    fn test_contour_not_closed() {
        let open = Contour {
            segments: vec![PolySegment::straight(Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0))],
        };
        assert!(!open.is_closed(1e-9));
    }
}
