//! Optional post-generation mesh optimization, gated by the DSTV plugin's
//! `optimize_geometry` knob (spec.md §6). Disabled by default since
//! `extrude`/`boolean` already produce correct, if not minimal, meshes —
//! this trades a pass over the vertex buffer for a smaller one.

use std::collections::HashMap;

use steelcad_core::{Point3D, Solid};

/// Merges vertices within `tolerance` of each other into one, remapping
/// `indices` in place. `face_regions` stay valid: they address ranges
/// within `indices`, whose length and order are unchanged, only the index
/// values they point at shrink.
pub fn weld_duplicate_vertices(solid: &mut Solid, tolerance: f64) {
    if tolerance <= 0.0 || solid.vertices.is_empty() {
        return;
    }

    let key_of = |p: &Point3D| -> (i64, i64, i64) {
        let scale = 1.0 / tolerance;
        ((p.x * scale).round() as i64, (p.y * scale).round() as i64, (p.z * scale).round() as i64)
    };

    let mut seen: HashMap<(i64, i64, i64), u32> = HashMap::with_capacity(solid.vertices.len());
    let mut welded: Vec<Point3D> = Vec::with_capacity(solid.vertices.len());
    let mut remap: Vec<u32> = Vec::with_capacity(solid.vertices.len());

    for vertex in &solid.vertices {
        let key = key_of(vertex);
        let index = *seen.entry(key).or_insert_with(|| {
            welded.push(*vertex);
            (welded.len() - 1) as u32
        });
        remap.push(index);
    }

    if welded.len() == solid.vertices.len() {
        return;
    }

    for index in solid.indices.iter_mut() {
        *index = remap[*index as usize];
    }
    solid.vertices = welded;
}
