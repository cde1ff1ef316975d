//! Ear-clipping triangulation for simple polygons, with hole support via
//! bridging: each hole loop is spliced into the outer ring through its
//! nearest outer vertex, turning "outer + holes" into one simple polygon
//! an ear-clipper can consume directly.

use steelcad_core::Point2D;

use crate::error::GeometryError;

fn cross(o: Point2D, a: Point2D, b: Point2D) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn signed_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Ensures a ring winds counter-clockwise (positive signed area), reversing
/// it in place otherwise.
pub fn ensure_ccw(points: &mut Vec<Point2D>) {
    if signed_area(points) < 0.0 {
        points.reverse();
    }
}

/// Ensures a ring winds clockwise, for hole loops that must wind opposite
/// the outer ring before bridging.
pub fn ensure_cw(points: &mut Vec<Point2D>) {
    if signed_area(points) > 0.0 {
        points.reverse();
    }
}

fn point_in_triangle(p: Point2D, a: Point2D, b: Point2D, c: Point2D) -> bool {
    let d1 = cross(a, b, p);
    let d2 = cross(b, c, p);
    let d3 = cross(c, a, p);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Classic O(n^2) ear clipping over a CCW simple polygon (no holes). Returns
/// vertex index triples into `points`.
pub fn ear_clip(points: &[Point2D]) -> Result<Vec<[usize; 3]>, GeometryError> {
    let n = points.len();
    if n < 3 {
        return Err(GeometryError::TriangulationFailed("fewer than 3 points".to_string()));
    }
    let mut indices: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n.saturating_sub(2));

    let mut guard = 0usize;
    while indices.len() > 3 {
        guard += 1;
        if guard > n * n + 16 {
            return Err(GeometryError::TriangulationFailed("ear clipping did not converge".to_string()));
        }

        let m = indices.len();
        let mut clipped = false;
        for i in 0..m {
            let prev = indices[(i + m - 1) % m];
            let curr = indices[i];
            let next = indices[(i + 1) % m];
            let (a, b, c) = (points[prev], points[curr], points[next]);

            if cross(a, b, c) <= 0.0 {
                continue;
            }

            let is_ear = indices
                .iter()
                .filter(|&&idx| idx != prev && idx != curr && idx != next)
                .all(|&idx| !point_in_triangle(points[idx], a, b, c));

            if is_ear {
                triangles.push([prev, curr, next]);
                indices.remove(i);
                clipped = true;
                break;
            }
        }

        if !clipped {
            return Err(GeometryError::TriangulationFailed("no ear found; polygon may be self-intersecting".to_string()));
        }
    }

    triangles.push([indices[0], indices[1], indices[2]]);
    Ok(triangles)
}

/// Splices `hole` into `outer` by connecting the hole vertex nearest to
/// some outer vertex with a zero-width bridge, producing one ring ear
/// clipping can triangulate without special-casing holes.
fn bridge_hole(outer: &[Point2D], hole: &[Point2D]) -> Vec<Point2D> {
    let (outer_idx, hole_idx) = outer
        .iter()
        .enumerate()
        .flat_map(|(oi, &op)| hole.iter().enumerate().map(move |(hi, &hp)| (oi, hi, op.distance_to(hp))))
        .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap())
        .map(|(oi, hi, _)| (oi, hi))
        .unwrap_or((0, 0));

    let mut spliced = Vec::with_capacity(outer.len() + hole.len() + 2);
    spliced.extend_from_slice(&outer[..=outer_idx]);
    spliced.extend(hole[hole_idx..].iter().chain(hole[..=hole_idx].iter()).copied());
    spliced.extend_from_slice(&outer[outer_idx..]);
    spliced
}

/// Triangulates an outer ring together with zero or more hole rings. Outer
/// is normalised CCW; each hole is normalised CW before bridging.
pub fn triangulate_with_holes(outer: &[Point2D], holes: &[Vec<Point2D>]) -> Result<(Vec<Point2D>, Vec<[usize; 3]>), GeometryError> {
    let mut ring = outer.to_vec();
    ensure_ccw(&mut ring);

    for hole in holes {
        let mut h = hole.clone();
        ensure_cw(&mut h);
        ring = bridge_hole(&ring, &h);
    }

    let triangles = ear_clip(&ring)?;
    Ok((ring, triangles))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(side: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(side, 0.0),
            Point2D::new(side, side),
            Point2D::new(0.0, side),
        ]
    }

    #[test]
    fn test_ear_clip_square_produces_two_triangles() {
        let tris = ear_clip(&square(10.0)).unwrap();
        assert_eq!(tris.len(), 2);
    }

    #[test]
    fn test_ear_clip_rejects_degenerate_input() {
        let points = vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)];
        assert!(ear_clip(&points).is_err());
    }

    #[test]
    fn test_ear_clip_l_shape_concave_polygon() {
        // An L-shaped hexagon: concave at one vertex, must not fan-triangulate.
        let l_shape = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 5.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(5.0, 10.0),
            Point2D::new(0.0, 10.0),
        ];
        let tris = ear_clip(&l_shape).unwrap();
        assert_eq!(tris.len(), 4);
    }

    #[test]
    fn test_triangulate_with_holes_covers_outer_area() {
        let outer = square(20.0);
        let hole = vec![
            Point2D::new(5.0, 5.0),
            Point2D::new(15.0, 5.0),
            Point2D::new(15.0, 15.0),
            Point2D::new(5.0, 15.0),
        ];
        let (ring, tris) = triangulate_with_holes(&outer, std::slice::from_ref(&hole)).unwrap();
        assert_eq!(ring.len(), outer.len() + hole.len() + 2);
        assert!(!tris.is_empty());
    }

    #[test]
    fn test_ensure_ccw_reverses_clockwise_ring() {
        let mut cw = vec![Point2D::new(0.0, 0.0), Point2D::new(0.0, 10.0), Point2D::new(10.0, 10.0), Point2D::new(10.0, 0.0)];
        ensure_ccw(&mut cw);
        assert!(signed_area(&cw) > 0.0);
    }
}
