//! One processor per `FeatureKind`, applying §4.7's feature-specific design
//! against the part's solid in its own face-local frame.

use std::f64::consts::PI;

use steelcad_core::{
    BevelType, ChamferParams, Contour, ContourParams, EndCutParams, Face, Feature, FeatureKind, GrooveParams, HeatTreatParams,
    HoleParams, MarkingParams, NotchParams, NotchShape, Part, PolySegment, PunchParams, ReferenceEnd, Solid, ThreadParams,
    ThroughBlind,
};

use crate::boolean::{append_bore, circle_ring, rect_ring, shear_end_cap, stadium_ring, swept_rect_ring, v_ring};
use crate::error::FeatureError;
use crate::frame::{extents, face_frame, thickness_at_face};

const ARC_SEGMENTS: usize = 12;
const HOLE_SEGMENTS: usize = 24;
const END_CAP_TOLERANCE: f64 = 1e-6;

fn invalid(feature: &Feature, message: impl Into<String>) -> FeatureError {
    FeatureError::Validation { feature_id: feature.id.clone(), kind: feature.kind.name(), message: message.into() }
}

fn require_positive(value: f64, what: &str, feature: &Feature) -> Result<(), FeatureError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(feature, format!("{what} must be positive, got {value}")))
    }
}

fn tessellate_arc(seg: &PolySegment, segments: usize) -> Vec<(f64, f64)> {
    if !seg.is_arc() {
        return vec![(seg.start.x, seg.start.y)];
    }
    let angle = seg.included_angle();
    let chord = seg.chord_length();
    if chord < 1e-9 || angle.abs() < 1e-9 {
        return vec![(seg.start.x, seg.start.y)];
    }
    let radius = chord / (2.0 * (angle / 2.0).sin()).abs();
    let (mx, my) = ((seg.start.x + seg.end.x) / 2.0, (seg.start.y + seg.end.y) / 2.0);
    let (dx, dy) = (seg.end.x - seg.start.x, seg.end.y - seg.start.y);
    let chord_len = (dx * dx + dy * dy).sqrt().max(1e-9);
    let (ux, uy) = (dx / chord_len, dy / chord_len);
    let (px, py) = (-uy, ux);
    let sagitta = radius - (radius * radius - (chord / 2.0).powi(2)).max(0.0).sqrt();
    let sign = if seg.bulge > 0.0 { 1.0 } else { -1.0 };
    let (cx, cy) = (mx + sign * px * (radius - sagitta), my + sign * py * (radius - sagitta));

    let start_angle = (seg.start.y - cy).atan2(seg.start.x - cx);
    let end_angle = (seg.end.y - cy).atan2(seg.end.x - cx);
    let mut delta = end_angle - start_angle;
    if sign > 0.0 {
        while delta <= 0.0 {
            delta += 2.0 * PI;
        }
    } else {
        while delta >= 0.0 {
            delta -= 2.0 * PI;
        }
    }

    (0..segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let a = start_angle + delta * t;
            (cx + radius * a.cos(), cy + radius * a.sin())
        })
        .collect()
}

fn contour_ring(contour: &Contour) -> Vec<(f64, f64)> {
    contour.segments.iter().flat_map(|seg| tessellate_arc(seg, ARC_SEGMENTS)).collect()
}

fn apply_hole(solid: &mut Solid, part: &Part, feature: &Feature, params: &HoleParams) -> Result<(), FeatureError> {
    require_positive(params.diameter, "diameter", feature)?;
    let (width, height) = extents(&part.dimensions);
    let face_span = if feature.face == Face::Web { height } else { width };
    if params.diameter >= face_span {
        return Err(invalid(feature, format!("diameter {} exceeds face span {}", params.diameter, face_span)));
    }

    let material = thickness_at_face(&part.dimensions, feature.face);
    let depth = match params.through_blind {
        ThroughBlind::Through => material,
        ThroughBlind::Blind => params.depth.ok_or_else(|| invalid(feature, "blind hole requires an explicit depth"))?,
    };
    require_positive(depth, "depth", feature)?;

    let frame = face_frame(&part.dimensions, part.length_mm, feature.face);
    let ring = circle_ring(feature.position.x, feature.position.y, params.diameter / 2.0, HOLE_SEGMENTS);
    append_bore(solid, &frame, &ring, 0.0, depth, feature.face);
    Ok(())
}

fn apply_slotted_hole(
    solid: &mut Solid,
    part: &Part,
    feature: &Feature,
    params: &steelcad_core::SlottedHoleParams,
) -> Result<(), FeatureError> {
    require_positive(params.diameter, "diameter", feature)?;
    require_positive(params.slot_length, "slot_length", feature)?;
    if params.slot_length < params.diameter {
        return Err(invalid(feature, "slot_length must be at least the hole diameter"));
    }

    let depth = thickness_at_face(&part.dimensions, feature.face);
    let frame = face_frame(&part.dimensions, part.length_mm, feature.face);
    let ring = stadium_ring(feature.position.x, feature.position.y, params.diameter, params.slot_length, params.slot_angle, HOLE_SEGMENTS / 2);
    append_bore(solid, &frame, &ring, 0.0, depth, feature.face);
    Ok(())
}

/// Threads carry no geometry of their own — they annotate the hole they're
/// cut into. Validated against the most recent HOLE feature at the same
/// face/position that precedes this one in declaration order.
fn apply_thread(feature: &Feature, params: &ThreadParams, prior: &[Feature]) -> Result<(), FeatureError> {
    require_positive(params.pitch, "pitch", feature)?;
    require_positive(params.depth, "depth", feature)?;

    let hosting_hole = prior.iter().rev().find_map(|f| match &f.kind {
        FeatureKind::Hole(hole) if f.face == feature.face && f.position.distance_to(feature.position) < 1e-6 => Some(hole),
        _ => None,
    });

    if let Some(hole) = hosting_hole {
        if params.nominal_diameter > hole.diameter + 1e-6 {
            return Err(invalid(feature, format!("thread diameter {} exceeds hosting hole diameter {}", params.nominal_diameter, hole.diameter)));
        }
    }
    Ok(())
}

fn contour_depth(part: &Part, face: Face) -> f64 {
    thickness_at_face(&part.dimensions, face)
}

fn apply_contour(solid: &mut Solid, part: &Part, feature: &Feature, params: &ContourParams) -> Result<(), FeatureError> {
    if !params.contour.is_closed(1e-3) {
        return Err(invalid(feature, "contour is not closed"));
    }
    let ring = contour_ring(&params.contour);
    if ring.len() < 3 {
        return Err(invalid(feature, "contour has fewer than 3 resolved points"));
    }

    let depth = contour_depth(part, feature.face);
    let frame = face_frame(&part.dimensions, part.length_mm, feature.face);
    // Both inner cuts and outer-shape overrides are modelled as the cavity
    // boundary this contour declares; see boolean.rs for why this engine
    // doesn't distinguish "subtract" from "intersect" at the mesh level.
    append_bore(solid, &frame, &ring, 0.0, depth, feature.face);
    Ok(())
}

fn apply_end_cut(solid: &mut Solid, part: &Part, feature: &Feature, params: &EndCutParams) -> Result<(), FeatureError> {
    if feature.face != Face::Front {
        return Err(invalid(feature, "end cut must be declared on the FRONT face"));
    }
    if params.angles.is_empty() {
        return Err(invalid(feature, "end cut requires at least one angle"));
    }
    for &angle in &params.angles {
        if !(0.0..90.0).contains(&angle) {
            return Err(invalid(feature, format!("end cut angle {angle} must be in [0, 90) degrees")));
        }
    }
    if params.bevel_type == BevelType::Weld && params.angles.len() < 2 {
        return Err(invalid(feature, "weld bevel requires both a root and face angle"));
    }

    let half_len = part.length_mm / 2.0;
    let target_z = match params.reference_end {
        ReferenceEnd::Start => -half_len,
        ReferenceEnd::End => half_len,
    };
    let shear_u = params.angles[0].to_radians().tan();
    let shear_v = params.angles.get(1).copied().unwrap_or(0.0).to_radians().tan();
    shear_end_cap(solid, target_z, shear_u, shear_v, END_CAP_TOLERANCE);
    Ok(())
}

fn apply_notch(solid: &mut Solid, part: &Part, feature: &Feature, params: &NotchParams) -> Result<(), FeatureError> {
    require_positive(params.size, "size", feature)?;
    require_positive(params.depth, "depth", feature)?;

    let frame = face_frame(&part.dimensions, part.length_mm, feature.face);
    let ring = match params.shape {
        NotchShape::Rectangular => rect_ring(feature.position.x, feature.position.y, params.size, params.size),
        NotchShape::V => v_ring(feature.position.x, feature.position.y, params.size),
    };
    append_bore(solid, &frame, &ring, 0.0, params.depth, feature.face);
    Ok(())
}

/// Markings and punches are annotation-only: they carry no Boolean, so
/// validation is the whole job.
fn apply_marking(feature: &Feature, params: &MarkingParams) -> Result<(), FeatureError> {
    if params.text.trim().is_empty() {
        return Err(invalid(feature, "marking text must not be empty"));
    }
    Ok(())
}

fn apply_punch(feature: &Feature, params: &PunchParams) -> Result<(), FeatureError> {
    if let Some(force) = params.force {
        require_positive(force, "force", feature)?;
    }
    Ok(())
}

/// Edge bevels are validated but not cut: `edge_locator` is an opaque
/// string with no defined mapping onto a concrete mesh edge in this data
/// model, so the geometric edit is out of scope here.
fn apply_chamfer(feature: &Feature, params: &ChamferParams) -> Result<(), FeatureError> {
    if params.edge_locator.trim().is_empty() {
        return Err(invalid(feature, "chamfer edge_locator must not be empty"));
    }
    require_positive(params.size, "size", feature)?;
    if !(0.0..90.0).contains(&params.angle) {
        return Err(invalid(feature, format!("chamfer angle {} must be in [0, 90)", params.angle)));
    }
    Ok(())
}

fn apply_groove(solid: &mut Solid, part: &Part, feature: &Feature, params: &GrooveParams) -> Result<(), FeatureError> {
    require_positive(params.width, "width", feature)?;
    require_positive(params.depth, "depth", feature)?;

    let frame = face_frame(&part.dimensions, part.length_mm, feature.face);
    let ring = swept_rect_ring((params.start.x, params.start.y), (params.end.x, params.end.y), params.width);
    append_bore(solid, &frame, &ring, 0.0, params.depth, feature.face);
    Ok(())
}

fn apply_heat_treat_area(feature: &Feature, params: &HeatTreatParams) -> Result<(), FeatureError> {
    require_positive(params.intensity, "intensity", feature)?;
    if params.polygon.len() < 3 {
        return Err(invalid(feature, "heat treat area polygon needs at least 3 points"));
    }
    Ok(())
}

/// Dispatches one feature. `prior` is every feature already applied to this
/// part, in declaration order, for processors (THREAD) that reference an
/// earlier feature.
pub fn apply(solid: &mut Solid, part: &Part, feature: &Feature, prior: &[Feature]) -> Result<(), FeatureError> {
    match &feature.kind {
        FeatureKind::Hole(params) => apply_hole(solid, part, feature, params),
        FeatureKind::SlottedHole(params) => apply_slotted_hole(solid, part, feature, params),
        FeatureKind::Thread(params) => apply_thread(feature, params, prior),
        FeatureKind::OuterContour(params) => apply_contour(solid, part, feature, params),
        FeatureKind::InnerContour(params) => apply_contour(solid, part, feature, params),
        FeatureKind::EndCut(params) => apply_end_cut(solid, part, feature, params),
        FeatureKind::Notch(params) => apply_notch(solid, part, feature, params),
        FeatureKind::Marking(params) => apply_marking(feature, params),
        FeatureKind::Punch(params) => apply_punch(feature, params),
        FeatureKind::Chamfer(params) => apply_chamfer(feature, params),
        FeatureKind::Groove(params) => apply_groove(solid, part, feature, params),
        FeatureKind::HeatTreatArea(params) => apply_heat_treat_area(feature, params),
    }
}
