//! Extrudes a `Section2D` along the Z axis, centred on `[-length/2, length/2]`,
//! into a triangulated `Solid`: two end caps plus one quad strip per ring
//! edge (outer ring tagged per the section's face map, hole rings tagged
//! uniformly since inner bores have no named face).

use steelcad_core::{Face, FaceRegion, Point2D, Point3D, Solid};

use crate::error::GeometryError;
use crate::profile2d::Section2D;
use crate::triangulate::triangulate_with_holes;

pub fn extrude(section: &Section2D, length_mm: f64) -> Result<Solid, GeometryError> {
    if length_mm <= 0.0 {
        return Err(GeometryError::DegenerateProfile(format!("non-positive length {length_mm}")));
    }

    let half = length_mm / 2.0;
    let (cap_ring, cap_tris) = triangulate_with_holes(&section.outer, &section.holes)?;

    let mut solid = Solid::empty();
    add_cap(&mut solid, &cap_ring, &cap_tris, -half, true);
    add_cap(&mut solid, &cap_ring, &cap_tris, half, false);

    add_side_wall(&mut solid, &section.outer, &section.outer_edge_faces, half);
    for hole in &section.holes {
        let faces = vec![Face::Web; hole.len()];
        add_side_wall(&mut solid, hole, &faces, half);
    }

    Ok(solid)
}

fn add_cap(solid: &mut Solid, ring: &[Point2D], tris: &[[usize; 3]], z: f64, reversed: bool) {
    let base = solid.vertices.len() as u32;
    for p in ring {
        solid.vertices.push(Point3D::new(p.x, p.y, z));
    }
    for tri in tris {
        let (a, b, c) = (base + tri[0] as u32, base + tri[1] as u32, base + tri[2] as u32);
        if reversed {
            solid.indices.extend_from_slice(&[a, c, b]);
        } else {
            solid.indices.extend_from_slice(&[a, b, c]);
        }
    }
}

fn add_side_wall(solid: &mut Solid, ring: &[Point2D], faces: &[Face], half: f64) {
    let n = ring.len();
    for i in 0..n {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        let base = solid.vertices.len() as u32;
        solid.vertices.push(Point3D::new(a.x, a.y, -half));
        solid.vertices.push(Point3D::new(b.x, b.y, -half));
        solid.vertices.push(Point3D::new(b.x, b.y, half));
        solid.vertices.push(Point3D::new(a.x, a.y, half));

        let first_index = solid.indices.len();
        solid.indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        solid.face_regions.push(FaceRegion { face: faces[i], first_index, index_count: 6 });
    }
}
