//! Dispatches a `ProfileDimensions` to its cross-section generator and
//! extrudes the result to the part's length, producing the neutral `Solid`
//! that feature processors subtract/intersect against.

use steelcad_core::{ColdFormedShape, ProfileDimensions, Solid};

use crate::error::GeometryError;
use crate::extrude::extrude;
use crate::profile2d;

pub fn generate(dimensions: &ProfileDimensions, length_mm: f64) -> Result<Solid, GeometryError> {
    let section = match dimensions {
        ProfileDimensions::IBeam { height, width, web_thickness, flange_thickness, root_radius, toe_radius } => {
            profile2d::i_beam(*height, *width, *web_thickness, *flange_thickness, *root_radius, *toe_radius)
        }
        ProfileDimensions::ChannelU { height, width, web_thickness, flange_thickness, root_radius, toe_radius } => {
            profile2d::channel_u(*height, *width, *web_thickness, *flange_thickness, *root_radius, *toe_radius)
        }
        ProfileDimensions::Angle { leg1, leg2, thickness, root_radius, toe_radius } => {
            profile2d::angle(*leg1, *leg2, *thickness, *root_radius, *toe_radius)
        }
        ProfileDimensions::Tee { height, width, web_thickness, flange_thickness, root_radius } => {
            profile2d::tee(*height, *width, *web_thickness, *flange_thickness, *root_radius)
        }
        ProfileDimensions::HollowRect { height, width, wall_thickness, outer_radius } => {
            profile2d::hollow_rect(*height, *width, *wall_thickness, *outer_radius)
        }
        ProfileDimensions::HollowSquare { height, width, wall_thickness, outer_radius } => {
            profile2d::hollow_rect(*height, *width, *wall_thickness, *outer_radius)
        }
        ProfileDimensions::HollowCircular { outer_diameter, wall_thickness } => {
            profile2d::hollow_circular(*outer_diameter, *wall_thickness)
        }
        ProfileDimensions::ColdFormed { shape, height, width, thickness, lip_length } => match shape {
            ColdFormedShape::C => profile2d::cold_formed_c(*height, *width, *thickness, *lip_length),
            ColdFormedShape::Z => profile2d::cold_formed_z(*height, *width, *thickness, *lip_length),
            ColdFormedShape::Sigma => profile2d::cold_formed_sigma(*height, *width, *thickness, *lip_length),
            ColdFormedShape::Omega => profile2d::cold_formed_omega(*height, *width, *thickness, *lip_length),
        },
        ProfileDimensions::FlatBar { width, thickness } => profile2d::rectangle(*width, *thickness),
        ProfileDimensions::RoundBar { diameter } => profile2d::round(*diameter),
        ProfileDimensions::SquareBar { width, thickness } => profile2d::rectangle(*width, *thickness),
        ProfileDimensions::Plate { width, thickness, .. } => profile2d::rectangle(*width, *thickness),
    };

    extrude(&section, length_mm)
}
