//! Maps a feature's face-local `(u, v)` position plus a depth into the
//! part's 3D frame, per the axis convention the geometry library extrudes
//! to: width along X, height along Y, length along Z centred on the origin.

use steelcad_core::{Face, Point3D, ProfileDimensions, Vector3D};

/// Overall width (X span) and height (Y span) of a cross-section, used to
/// place a face's local origin and to validate a feature fits within it.
pub fn extents(dimensions: &ProfileDimensions) -> (f64, f64) {
    match *dimensions {
        ProfileDimensions::IBeam { height, width, .. } => (width, height),
        ProfileDimensions::ChannelU { height, width, .. } => (width, height),
        ProfileDimensions::Angle { leg1, leg2, .. } => (leg1, leg2),
        ProfileDimensions::Tee { height, width, .. } => (width, height),
        ProfileDimensions::HollowRect { height, width, .. } => (width, height),
        ProfileDimensions::HollowSquare { height, width, .. } => (width, height),
        ProfileDimensions::HollowCircular { outer_diameter, .. } => (outer_diameter, outer_diameter),
        ProfileDimensions::ColdFormed { height, width, .. } => (width, height),
        ProfileDimensions::FlatBar { width, thickness } => (width, thickness),
        ProfileDimensions::RoundBar { diameter } => (diameter, diameter),
        ProfileDimensions::SquareBar { width, thickness } => (width, thickness),
        ProfileDimensions::Plate { width, height, .. } => (width, height),
    }
}

/// Material thickness a hole/notch/groove bores through when entering from
/// `face`. For hollow sections this is the wall thickness regardless of
/// face; for open sections it's the web or flange thickness as declared.
pub fn thickness_at_face(dimensions: &ProfileDimensions, face: Face) -> f64 {
    match (*dimensions, face) {
        (ProfileDimensions::IBeam { web_thickness, .. }, Face::Web) => web_thickness,
        (ProfileDimensions::IBeam { flange_thickness, .. }, _) => flange_thickness,
        (ProfileDimensions::ChannelU { web_thickness, .. }, Face::Web) => web_thickness,
        (ProfileDimensions::ChannelU { flange_thickness, .. }, _) => flange_thickness,
        (ProfileDimensions::Tee { web_thickness, .. }, Face::Web) => web_thickness,
        (ProfileDimensions::Tee { flange_thickness, .. }, _) => flange_thickness,
        (ProfileDimensions::HollowRect { wall_thickness, .. }, _) => wall_thickness,
        (ProfileDimensions::HollowSquare { wall_thickness, .. }, _) => wall_thickness,
        (ProfileDimensions::HollowCircular { wall_thickness, .. }, _) => wall_thickness,
        (ProfileDimensions::ColdFormed { thickness, .. }, _) => thickness,
        (ProfileDimensions::FlatBar { thickness, .. }, _) => thickness,
        (ProfileDimensions::SquareBar { thickness, .. }, _) => thickness,
        (ProfileDimensions::Plate { thickness, .. }, _) => thickness,
        (ProfileDimensions::Angle { thickness, .. }, _) => thickness,
        (ProfileDimensions::RoundBar { diameter }, _) => diameter,
    }
}

/// A face-local coordinate frame: `point(u, v, depth)` resolves to the
/// part's 3D frame. `depth` is always positive going into the material,
/// regardless of which side of the profile the face sits on.
#[derive(Debug, Clone, Copy)]
pub struct FaceFrame {
    pub origin: Point3D,
    pub u_axis: Vector3D,
    pub v_axis: Vector3D,
    pub normal: Vector3D,
}

impl FaceFrame {
    pub fn point(&self, u: f64, v: f64, depth: f64) -> Point3D {
        Point3D::new(
            self.origin.x + self.u_axis.x * u + self.v_axis.x * v + self.normal.x * depth,
            self.origin.y + self.u_axis.y * u + self.v_axis.y * v + self.normal.y * depth,
            self.origin.z + self.u_axis.z * u + self.v_axis.z * v + self.normal.z * depth,
        )
    }
}

/// Per §4.7: WEB is perpendicular to the width axis, TOP/BOTTOM_FLANGE
/// perpendicular to the height axis, FRONT is the end face. `u` always runs
/// along the part length (the DSTV x coordinate), `v` across the face.
pub fn face_frame(dimensions: &ProfileDimensions, length_mm: f64, face: Face) -> FaceFrame {
    let (width, height) = extents(dimensions);
    let half_len = length_mm / 2.0;
    match face {
        Face::Web => FaceFrame {
            origin: Point3D::new(0.0, -height / 2.0, -half_len),
            u_axis: Vector3D::new(0.0, 0.0, 1.0),
            v_axis: Vector3D::new(0.0, 1.0, 0.0),
            normal: Vector3D::new(1.0, 0.0, 0.0),
        },
        Face::TopFlange => FaceFrame {
            origin: Point3D::new(-width / 2.0, height / 2.0, -half_len),
            u_axis: Vector3D::new(0.0, 0.0, 1.0),
            v_axis: Vector3D::new(1.0, 0.0, 0.0),
            normal: Vector3D::new(0.0, -1.0, 0.0),
        },
        Face::BottomFlange => FaceFrame {
            origin: Point3D::new(-width / 2.0, -height / 2.0, -half_len),
            u_axis: Vector3D::new(0.0, 0.0, 1.0),
            v_axis: Vector3D::new(1.0, 0.0, 0.0),
            normal: Vector3D::new(0.0, 1.0, 0.0),
        },
        Face::Front => FaceFrame {
            origin: Point3D::new(-width / 2.0, -height / 2.0, -half_len),
            u_axis: Vector3D::new(1.0, 0.0, 0.0),
            v_axis: Vector3D::new(0.0, 1.0, 0.0),
            normal: Vector3D::new(0.0, 0.0, 1.0),
        },
    }
}
