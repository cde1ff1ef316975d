//! Builds the 2D cross-section outline (and, for hollow sections, the
//! inner hole loop) for each `ProfileCategory`, with corner fillets
//! tessellated to a fixed segment count per the catalogue's hot-rolled
//! convention: 8 segments for hot-rolled root/toe fillets, 32 for circular
//! hollow sections.

use std::f64::consts::PI;

use steelcad_core::{Face, Point2D, ProfileDimensions, Vector2D};

pub const HOT_ROLLED_FILLET_SEGMENTS: usize = 8;
pub const CIRCULAR_SEGMENTS: usize = 32;

/// A 2D cross-section: one outer boundary (CCW, one face tag per edge) and
/// zero or more inner hole loops.
#[derive(Debug, Clone)]
pub struct Section2D {
    pub outer: Vec<Point2D>,
    pub outer_edge_faces: Vec<Face>,
    pub holes: Vec<Vec<Point2D>>,
}

struct Corner {
    point: Point2D,
    radius: f64,
    outgoing_face: Face,
}

/// Rounds the corner at `corner`, tangent to both the edge from `prev` and
/// the edge to `next`, with an arc of `segments` sub-divisions. Works for
/// convex and concave corners alike since it only depends on the local
/// angle between the two adjacent edges. Returns `[corner]` unchanged when
/// `radius` is non-positive or the corner is degenerate.
fn round_corner(prev: Point2D, corner: Point2D, next: Point2D, radius: f64, segments: usize) -> Vec<Point2D> {
    if radius <= 1e-9 {
        return vec![corner];
    }

    let v1 = prev - corner;
    let v2 = next - corner;
    let (len1, len2) = (v1.length(), v2.length());
    if len1 < 1e-9 || len2 < 1e-9 {
        return vec![corner];
    }
    let u1 = Vector2D::new(v1.x / len1, v1.y / len1);
    let u2 = Vector2D::new(v2.x / len2, v2.y / len2);

    let dot = (u1.x * u2.x + u1.y * u2.y).clamp(-1.0, 1.0);
    let half_angle = dot.acos() / 2.0;
    if half_angle < 1e-6 || half_angle > PI / 2.0 - 1e-9 {
        return vec![corner];
    }

    let tangent_dist = (radius / half_angle.tan()).min(len1 * 0.99).min(len2 * 0.99);
    let t1 = corner + Vector2D::new(u1.x * tangent_dist, u1.y * tangent_dist);
    let t2 = corner + Vector2D::new(u2.x * tangent_dist, u2.y * tangent_dist);

    let bis = Vector2D::new(u1.x + u2.x, u1.y + u2.y);
    let bis_len = bis.length();
    if bis_len < 1e-9 {
        return vec![corner];
    }
    let bis_unit = Vector2D::new(bis.x / bis_len, bis.y / bis_len);
    let center_dist = radius / half_angle.sin();
    let center = corner + Vector2D::new(bis_unit.x * center_dist, bis_unit.y * center_dist);

    let a1 = (t1.y - center.y).atan2(t1.x - center.x);
    let a2 = (t2.y - center.y).atan2(t2.x - center.x);
    let mut delta = a2 - a1;
    while delta > PI {
        delta -= 2.0 * PI;
    }
    while delta < -PI {
        delta += 2.0 * PI;
    }

    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let ang = a1 + delta * t;
            Point2D::new(center.x + radius * ang.cos(), center.y + radius * ang.sin())
        })
        .collect()
}

/// Expands a coarse corner list (one entry per polygon vertex, each naming
/// the face of the edge leaving that vertex) into the tessellated ring plus
/// a parallel per-edge face tag. A corner's fillet arc and the straight run
/// up to the next corner share that corner's `outgoing_face`, since a
/// fillet only smooths geometry — it never crosses a named-face boundary.
fn build_ring(corners: &[Corner], segments: usize) -> (Vec<Point2D>, Vec<Face>) {
    let n = corners.len();
    let mut points = Vec::new();
    let mut faces = Vec::new();
    for i in 0..n {
        let prev = corners[(i + n - 1) % n].point;
        let next = corners[(i + 1) % n].point;
        let arc = round_corner(prev, corners[i].point, next, corners[i].radius, segments);
        for p in arc {
            points.push(p);
            faces.push(corners[i].outgoing_face);
        }
    }
    (points, faces)
}

fn circle(center: Point2D, radius: f64, segments: usize) -> Vec<Point2D> {
    (0..segments)
        .map(|i| {
            let ang = 2.0 * PI * i as f64 / segments as f64;
            Point2D::new(center.x + radius * ang.cos(), center.y + radius * ang.sin())
        })
        .collect()
}

pub fn i_beam(height: f64, width: f64, web_thickness: f64, flange_thickness: f64, root_radius: f64, toe_radius: f64) -> Section2D {
    let w2 = width / 2.0;
    let h2 = height / 2.0;
    let tw2 = web_thickness / 2.0;

    let corners = vec![
        Corner { point: Point2D::new(w2, -h2), radius: toe_radius, outgoing_face: Face::BottomFlange },
        Corner { point: Point2D::new(w2, -h2 + flange_thickness), radius: root_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(tw2, -h2 + flange_thickness), radius: root_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(tw2, h2 - flange_thickness), radius: root_radius, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(w2, h2 - flange_thickness), radius: toe_radius, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(w2, h2), radius: toe_radius, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(-w2, h2), radius: toe_radius, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(-w2, h2 - flange_thickness), radius: root_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(-tw2, h2 - flange_thickness), radius: root_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(-tw2, -h2 + flange_thickness), radius: root_radius, outgoing_face: Face::BottomFlange },
        Corner { point: Point2D::new(-w2, -h2 + flange_thickness), radius: toe_radius, outgoing_face: Face::BottomFlange },
        Corner { point: Point2D::new(-w2, -h2), radius: toe_radius, outgoing_face: Face::BottomFlange },
    ];
    let (outer, outer_edge_faces) = build_ring(&corners, HOT_ROLLED_FILLET_SEGMENTS);
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

pub fn channel_u(height: f64, width: f64, web_thickness: f64, flange_thickness: f64, root_radius: f64, toe_radius: f64) -> Section2D {
    let h2 = height / 2.0;
    // Web on the left (x=0), flanges opening to the right, matching the
    // "back against the web" orientation conventional for C-sections.
    let corners = vec![
        Corner { point: Point2D::new(0.0, -h2), radius: 0.0, outgoing_face: Face::BottomFlange },
        Corner { point: Point2D::new(width, -h2), radius: toe_radius, outgoing_face: Face::BottomFlange },
        Corner { point: Point2D::new(width, -h2 + flange_thickness), radius: toe_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(web_thickness, -h2 + flange_thickness), radius: root_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(web_thickness, h2 - flange_thickness), radius: root_radius, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(width, h2 - flange_thickness), radius: toe_radius, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(width, h2), radius: toe_radius, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(0.0, h2), radius: 0.0, outgoing_face: Face::Web },
    ];
    let (outer, outer_edge_faces) = build_ring(&corners, HOT_ROLLED_FILLET_SEGMENTS);
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

pub fn angle(leg1: f64, leg2: f64, thickness: f64, root_radius: f64, toe_radius: f64) -> Section2D {
    // L-section with the vertex at the origin, legs running along +X and +Y.
    let corners = vec![
        Corner { point: Point2D::new(0.0, 0.0), radius: 0.0, outgoing_face: Face::Web },
        Corner { point: Point2D::new(leg1, 0.0), radius: toe_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(leg1, thickness), radius: root_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(thickness, thickness), radius: root_radius, outgoing_face: Face::Front },
        Corner { point: Point2D::new(thickness, leg2), radius: toe_radius, outgoing_face: Face::Front },
        Corner { point: Point2D::new(0.0, leg2), radius: 0.0, outgoing_face: Face::Front },
    ];
    let (outer, outer_edge_faces) = build_ring(&corners, HOT_ROLLED_FILLET_SEGMENTS);
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

pub fn tee(height: f64, width: f64, web_thickness: f64, flange_thickness: f64, root_radius: f64) -> Section2D {
    let w2 = width / 2.0;
    let tw2 = web_thickness / 2.0;
    let corners = vec![
        Corner { point: Point2D::new(tw2, 0.0), radius: 0.0, outgoing_face: Face::Web },
        Corner { point: Point2D::new(tw2, height - flange_thickness), radius: root_radius, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(w2, height - flange_thickness), radius: 0.0, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(w2, height), radius: 0.0, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(-w2, height), radius: 0.0, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(-w2, height - flange_thickness), radius: 0.0, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(-tw2, height - flange_thickness), radius: root_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(-tw2, 0.0), radius: 0.0, outgoing_face: Face::Web },
    ];
    let (outer, outer_edge_faces) = build_ring(&corners, HOT_ROLLED_FILLET_SEGMENTS);
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

pub fn hollow_rect(height: f64, width: f64, wall_thickness: f64, outer_radius: f64) -> Section2D {
    let w2 = width / 2.0;
    let h2 = height / 2.0;
    let outer_corners = vec![
        Corner { point: Point2D::new(w2, -h2), radius: outer_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(w2, h2), radius: outer_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(-w2, h2), radius: outer_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(-w2, -h2), radius: outer_radius, outgoing_face: Face::Web },
    ];
    let (outer, outer_edge_faces) = build_ring(&outer_corners, HOT_ROLLED_FILLET_SEGMENTS);

    let iw2 = w2 - wall_thickness;
    let ih2 = h2 - wall_thickness;
    let inner_radius = (outer_radius - wall_thickness).max(0.0);
    let inner_corners = vec![
        Corner { point: Point2D::new(iw2, -ih2), radius: inner_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(iw2, ih2), radius: inner_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(-iw2, ih2), radius: inner_radius, outgoing_face: Face::Web },
        Corner { point: Point2D::new(-iw2, -ih2), radius: inner_radius, outgoing_face: Face::Web },
    ];
    let (hole, _) = build_ring(&inner_corners, HOT_ROLLED_FILLET_SEGMENTS);

    Section2D { outer, outer_edge_faces, holes: vec![hole] }
}

pub fn hollow_circular(outer_diameter: f64, wall_thickness: f64) -> Section2D {
    let outer = circle(Point2D::origin(), outer_diameter / 2.0, CIRCULAR_SEGMENTS);
    let outer_edge_faces = vec![Face::Web; outer.len()];
    let hole = circle(Point2D::origin(), outer_diameter / 2.0 - wall_thickness, CIRCULAR_SEGMENTS);
    Section2D { outer, outer_edge_faces, holes: vec![hole] }
}

/// Lipped C-channel: web on the left (x=0..thickness), both flanges open to
/// the right by `width` and fold back toward the web by `lip_length` at
/// their tips, per spec.md §4.6's requirement that C/Z cold-formed variants
/// carry a lip polyline rather than the plain open channel used for
/// hot-rolled sections. `lip_length <= 0` collapses to a plain channel.
pub fn cold_formed_c(height: f64, width: f64, thickness: f64, lip_length: f64) -> Section2D {
    let h2 = height / 2.0;
    let mut corners = vec![Corner { point: Point2D::new(0.0, -h2), radius: 0.0, outgoing_face: Face::BottomFlange }];
    corners.push(Corner { point: Point2D::new(width, -h2), radius: 0.0, outgoing_face: Face::Front });
    if lip_length > 1e-9 {
        corners.push(Corner { point: Point2D::new(width, -h2 + lip_length), radius: 0.0, outgoing_face: Face::Front });
        corners.push(Corner { point: Point2D::new(width - thickness, -h2 + lip_length), radius: 0.0, outgoing_face: Face::Front });
    }
    corners.push(Corner { point: Point2D::new(width - thickness, -h2 + thickness), radius: 0.0, outgoing_face: Face::BottomFlange });
    corners.push(Corner { point: Point2D::new(thickness, -h2 + thickness), radius: 0.0, outgoing_face: Face::Web });
    corners.push(Corner { point: Point2D::new(thickness, h2 - thickness), radius: 0.0, outgoing_face: Face::TopFlange });
    corners.push(Corner { point: Point2D::new(width - thickness, h2 - thickness), radius: 0.0, outgoing_face: Face::Front });
    if lip_length > 1e-9 {
        corners.push(Corner { point: Point2D::new(width - thickness, h2 - lip_length), radius: 0.0, outgoing_face: Face::Front });
        corners.push(Corner { point: Point2D::new(width, h2 - lip_length), radius: 0.0, outgoing_face: Face::Front });
    }
    corners.push(Corner { point: Point2D::new(width, h2), radius: 0.0, outgoing_face: Face::TopFlange });
    corners.push(Corner { point: Point2D::new(0.0, h2), radius: 0.0, outgoing_face: Face::Web });

    let (outer, outer_edge_faces) = build_ring(&corners, 1);
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

/// Z-section: flanges attach to opposite faces of the web and open in
/// opposite directions (point symmetry), each folding a lip inward at its
/// tip. Same four dimensions as `cold_formed_c`.
pub fn cold_formed_z(height: f64, width: f64, thickness: f64, lip_length: f64) -> Section2D {
    let h2 = height / 2.0;
    let mut corners = vec![Corner { point: Point2D::new(0.0, -h2), radius: 0.0, outgoing_face: Face::BottomFlange }];
    corners.push(Corner { point: Point2D::new(-width, -h2), radius: 0.0, outgoing_face: Face::Front });
    if lip_length > 1e-9 {
        corners.push(Corner { point: Point2D::new(-width, -h2 + lip_length), radius: 0.0, outgoing_face: Face::Front });
        corners.push(Corner { point: Point2D::new(-width + thickness, -h2 + lip_length), radius: 0.0, outgoing_face: Face::Front });
    }
    corners.push(Corner { point: Point2D::new(-width + thickness, -h2 + thickness), radius: 0.0, outgoing_face: Face::BottomFlange });
    corners.push(Corner { point: Point2D::new(0.0, -h2 + thickness), radius: 0.0, outgoing_face: Face::Web });
    corners.push(Corner { point: Point2D::new(0.0, h2), radius: 0.0, outgoing_face: Face::Web });
    corners.push(Corner { point: Point2D::new(thickness, h2), radius: 0.0, outgoing_face: Face::TopFlange });
    corners.push(Corner { point: Point2D::new(width + thickness, h2), radius: 0.0, outgoing_face: Face::Front });
    if lip_length > 1e-9 {
        corners.push(Corner { point: Point2D::new(width + thickness, h2 - lip_length), radius: 0.0, outgoing_face: Face::Front });
        corners.push(Corner { point: Point2D::new(width, h2 - lip_length), radius: 0.0, outgoing_face: Face::Front });
    }
    corners.push(Corner { point: Point2D::new(width, h2 - thickness), radius: 0.0, outgoing_face: Face::TopFlange });
    corners.push(Corner { point: Point2D::new(thickness, h2 - thickness), radius: 0.0, outgoing_face: Face::Web });
    corners.push(Corner { point: Point2D::new(thickness, -h2), radius: 0.0, outgoing_face: Face::Web });

    let (outer, outer_edge_faces) = build_ring(&corners, 1);
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

/// Sigma section: a C-channel whose lip is a single raked (diagonal) fold
/// rather than the squared two-segment return `cold_formed_c` uses, the
/// detail that distinguishes a sigma purlin's profile from a plain lipped
/// channel.
pub fn cold_formed_sigma(height: f64, width: f64, thickness: f64, lip_length: f64) -> Section2D {
    let h2 = height / 2.0;
    let mut corners = vec![Corner { point: Point2D::new(0.0, -h2), radius: 0.0, outgoing_face: Face::BottomFlange }];
    corners.push(Corner { point: Point2D::new(width, -h2), radius: 0.0, outgoing_face: Face::Front });
    if lip_length > 1e-9 {
        corners.push(Corner { point: Point2D::new(width, -h2 + lip_length * 0.5), radius: 0.0, outgoing_face: Face::Front });
        corners.push(Corner { point: Point2D::new(width - thickness, -h2 + lip_length), radius: 0.0, outgoing_face: Face::Front });
    }
    corners.push(Corner { point: Point2D::new(width - thickness, -h2 + thickness), radius: 0.0, outgoing_face: Face::BottomFlange });
    corners.push(Corner { point: Point2D::new(thickness, -h2 + thickness), radius: 0.0, outgoing_face: Face::Web });
    corners.push(Corner { point: Point2D::new(thickness, h2 - thickness), radius: 0.0, outgoing_face: Face::TopFlange });
    corners.push(Corner { point: Point2D::new(width - thickness, h2 - thickness), radius: 0.0, outgoing_face: Face::Front });
    if lip_length > 1e-9 {
        corners.push(Corner { point: Point2D::new(width - thickness, h2 - lip_length), radius: 0.0, outgoing_face: Face::Front });
        corners.push(Corner { point: Point2D::new(width, h2 - lip_length * 0.5), radius: 0.0, outgoing_face: Face::Front });
    }
    corners.push(Corner { point: Point2D::new(width, h2), radius: 0.0, outgoing_face: Face::TopFlange });
    corners.push(Corner { point: Point2D::new(0.0, h2), radius: 0.0, outgoing_face: Face::Web });

    let (outer, outer_edge_faces) = build_ring(&corners, 1);
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

/// Omega (hat) section: a flat crown of `width`, two vertical webs of
/// `height`, and base flanges that flare outward by `lip_length` rather
/// than folding inward — the opposite lip direction from C/Z, matching an
/// omega purlin's outward-flared mounting feet.
pub fn cold_formed_omega(height: f64, width: f64, thickness: f64, lip_length: f64) -> Section2D {
    let w2 = width / 2.0;
    let h2 = height / 2.0;
    let corners = vec![
        Corner { point: Point2D::new(-w2 - lip_length, -h2), radius: 0.0, outgoing_face: Face::BottomFlange },
        Corner { point: Point2D::new(-w2, -h2), radius: 0.0, outgoing_face: Face::Web },
        Corner { point: Point2D::new(-w2, h2), radius: 0.0, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(w2, h2), radius: 0.0, outgoing_face: Face::Web },
        Corner { point: Point2D::new(w2, -h2), radius: 0.0, outgoing_face: Face::BottomFlange },
        Corner { point: Point2D::new(w2 + lip_length, -h2), radius: 0.0, outgoing_face: Face::Front },
        Corner { point: Point2D::new(w2 + lip_length, -h2 + thickness), radius: 0.0, outgoing_face: Face::BottomFlange },
        Corner { point: Point2D::new(w2 - thickness, -h2 + thickness), radius: 0.0, outgoing_face: Face::Web },
        Corner { point: Point2D::new(w2 - thickness, h2 - thickness), radius: 0.0, outgoing_face: Face::TopFlange },
        Corner { point: Point2D::new(-w2 + thickness, h2 - thickness), radius: 0.0, outgoing_face: Face::Web },
        Corner { point: Point2D::new(-w2 + thickness, -h2 + thickness), radius: 0.0, outgoing_face: Face::BottomFlange },
        Corner { point: Point2D::new(-w2 - lip_length + thickness, -h2 + thickness), radius: 0.0, outgoing_face: Face::Front },
    ];
    let (outer, outer_edge_faces) = build_ring(&corners, 1);
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

/// Rectangle centred on the origin: flat bar / square bar / plate cross
/// sections, and the fallback shape for anything without a flange/web
/// distinction.
pub fn rectangle(width: f64, thickness: f64) -> Section2D {
    let w2 = width / 2.0;
    let t2 = thickness / 2.0;
    let outer = vec![Point2D::new(w2, -t2), Point2D::new(w2, t2), Point2D::new(-w2, t2), Point2D::new(-w2, -t2)];
    let outer_edge_faces = vec![Face::Web; outer.len()];
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

pub fn round(diameter: f64) -> Section2D {
    let outer = circle(Point2D::origin(), diameter / 2.0, CIRCULAR_SEGMENTS);
    let outer_edge_faces = vec![Face::Web; outer.len()];
    Section2D { outer, outer_edge_faces, holes: Vec::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i_beam_outline_point_count_without_fillets() {
        let section = i_beam(300.0, 150.0, 7.1, 10.7, 0.0, 0.0);
        assert_eq!(section.outer.len(), 12);
        assert_eq!(section.outer_edge_faces.len(), 12);
    }

    #[test]
    fn test_i_beam_with_fillets_inserts_arc_points() {
        let section = i_beam(300.0, 150.0, 7.1, 10.7, 15.0, 5.0);
        assert!(section.outer.len() > 12);
    }

    #[test]
    fn test_cold_formed_c_lip_adds_points_over_plain_channel() {
        let plain = cold_formed_c(200.0, 75.0, 2.0, 0.0);
        let lipped = cold_formed_c(200.0, 75.0, 2.0, 15.0);
        assert!(lipped.outer.len() > plain.outer.len());
    }

    #[test]
    fn test_cold_formed_z_flanges_open_on_opposite_sides() {
        let section = cold_formed_z(200.0, 75.0, 2.0, 15.0);
        let min_x = section.outer.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = section.outer.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        assert!(min_x < 0.0);
        assert!(max_x > 75.0);
    }

    #[test]
    fn test_cold_formed_sigma_lip_adds_points_over_plain_channel() {
        let plain = cold_formed_sigma(200.0, 75.0, 2.0, 0.0);
        let lipped = cold_formed_sigma(200.0, 75.0, 2.0, 15.0);
        assert!(lipped.outer.len() > plain.outer.len());
    }

    #[test]
    fn test_cold_formed_omega_flares_wider_than_crown() {
        let section = cold_formed_omega(100.0, 60.0, 2.0, 20.0);
        let width = section.outer.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max)
            - section.outer.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        assert!(width > 60.0);
    }

    #[test]
    fn test_hollow_rect_has_one_hole() {
        let section = hollow_rect(50.8, 50.8, 4.78, 6.0);
        assert_eq!(section.holes.len(), 1);
    }

    #[test]
    fn test_hollow_circular_segment_count() {
        let section = hollow_circular(60.0, 5.0);
        assert_eq!(section.outer.len(), CIRCULAR_SEGMENTS);
        assert_eq!(section.holes[0].len(), CIRCULAR_SEGMENTS);
    }

    #[test]
    fn test_round_corner_returns_single_point_for_zero_radius() {
        let pts = round_corner(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0), 0.0, 8);
        assert_eq!(pts.len(), 1);
    }

    #[test]
    fn test_round_corner_tessellates_to_requested_segments() {
        let pts = round_corner(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), Point2D::new(10.0, 10.0), 2.0, 8);
        assert_eq!(pts.len(), 9);
    }
}
