use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

use crate::part::Face;

/// A point in face-local DSTV space: first axis along the part's length,
/// second axis across the face. Used by block parsers and feature payloads
/// before the semantic stage hands them to the geometry library.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance_to(self, other: Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Add<Vector2D> for Point2D {
    type Output = Point2D;
    fn add(self, v: Vector2D) -> Point2D {
        Point2D {
            x: self.x + v.x,
            y: self.y + v.y,
        }
    }
}

impl Sub for Point2D {
    type Output = Vector2D;
    fn sub(self, other: Point2D) -> Vector2D {
        Vector2D {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// A segment of a face-local polyline (AK/IK/KA outer/inner contours).
/// `bulge` is the tangent of one quarter of the segment's included angle;
/// zero means straight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolySegment {
    pub start: Point2D,
    pub end: Point2D,
    #[serde(default)]
    pub bulge: f64,
}

impl PolySegment {
    pub fn straight(start: Point2D, end: Point2D) -> Self {
        Self { start, end, bulge: 0.0 }
    }

    pub fn is_arc(&self) -> bool {
        self.bulge.abs() > 1e-12
    }

    pub fn chord_length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    /// Included angle implied by the bulge factor, in radians.
    pub fn included_angle(&self) -> f64 {
        4.0 * self.bulge.atan()
    }
}

/// A point in the part's 3D frame: extrusion axis along Z, length centred
/// on the origin so the bounding box spans `[-L/2, L/2]` on that axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn origin() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn distance_to(self, other: Point3D) -> f64 {
        (self - other).length()
    }
}

impl Add<Vector3D> for Point3D {
    type Output = Point3D;
    fn add(self, v: Vector3D) -> Point3D {
        Point3D::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub for Point3D {
    type Output = Vector3D;
    fn sub(self, other: Point3D) -> Vector3D {
        Vector3D::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vector3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3D {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn dot(self, other: Vector3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vector3D) -> Vector3D {
        Vector3D::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }
}

/// Axis-aligned bounding box of a solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3D,
    pub max: Point3D,
}

impl BoundingBox {
    pub fn span_x(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn span_y(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn span_z(&self) -> f64 {
        self.max.z - self.min.z
    }

    pub fn center(&self) -> Point3D {
        Point3D::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
            (self.min.z + self.max.z) / 2.0,
        )
    }

    /// Whether the box is centred on the origin along Z within `tolerance_mm`.
    pub fn centered_on_z(&self, tolerance_mm: f64) -> bool {
        (self.min.z + self.max.z).abs() / 2.0 <= tolerance_mm
    }
}

/// A contiguous run of triangle indices belonging to one named face of the
/// profile, so feature processors can find "the web" or "the top flange"
/// without re-deriving it from vertex positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub face: Face,
    pub first_index: usize,
    pub index_count: usize,
}

/// The renderer-agnostic output of the geometry library and feature
/// processors: a plain vertex/index buffer plus tags identifying which
/// indices belong to which named face. No mesh/scene-graph type from any
/// particular 3D engine leaks through this boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub vertices: Vec<Point3D>,
    /// Triangle list: every 3 entries is one triangle, indexing `vertices`.
    pub indices: Vec<u32>,
    pub face_regions: Vec<FaceRegion>,
}

impl Solid {
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            face_regions: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut iter = self.vertices.iter();
        let first = *iter.next()?;
        let mut min = first;
        let mut max = first;
        for v in iter {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            min.z = min.z.min(v.z);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
            max.z = max.z.max(v.z);
        }
        Some(BoundingBox { min, max })
    }

    /// Appends `other`'s vertices/indices, offsetting indices and shifting
    /// `other`'s face regions to land after this solid's existing ones.
    /// Used when a generator assembles a cross-section from sub-shapes
    /// (e.g. flange + web + flange) before extrusion.
    pub fn append(&mut self, other: &Solid) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
        let index_offset = self.indices.len() - other.indices.len();
        for region in &other.face_regions {
            self.face_regions.push(FaceRegion {
                face: region.face,
                first_index: region.first_index + index_offset,
                index_count: region.index_count,
            });
        }
    }

    /// Indices belonging to a given named face, flattened across all of
    /// that face's regions.
    pub fn indices_for_face(&self, face: Face) -> Vec<u32> {
        let mut out = Vec::new();
        for region in self.face_regions.iter().filter(|r| r.face == face) {
            let end = region.first_index + region.index_count;
            out.extend_from_slice(&self.indices[region.first_index..end]);
        }
        out
    }
}
