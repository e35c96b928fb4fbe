//! 68-point facial landmark sets (iBUG 300-W ordering).
//!
//! Index groups: jaw 0-16, eyebrows 17-26, nose 27-35, eyes 36-47, mouth 48-67.

use thiserror::Error;

use super::constants::NUM_LANDMARKS;

pub type Point = (i32, i32);

#[derive(Error, Debug, PartialEq, Eq)]
#[error("expected 68 landmark points, got {0}")]
pub struct LandmarkCountError(pub usize);

/// Exactly 68 ordered integer points. Other lengths are unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Landmarks {
    points: [Point; NUM_LANDMARKS],
}

impl Landmarks {
    pub const fn new(points: [Point; NUM_LANDMARKS]) -> Self {
        Self { points }
    }

    /// Placeholder set used when no frame of the run has been detected yet.
    pub fn template() -> Self {
        TEMPLATE.clone()
    }

    pub fn points(&self) -> &[Point; NUM_LANDMARKS] {
        &self.points
    }

    /// Row-major `[x0, y0, x1, y1, ...]` layout used for `[68, 2]` arrays.
    pub fn to_flat(&self) -> Vec<i32> {
        self.points.iter().flat_map(|&(x, y)| [x, y]).collect()
    }
}

impl TryFrom<Vec<Point>> for Landmarks {
    type Error = LandmarkCountError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        let len = points.len();
        let points: [Point; NUM_LANDMARKS] =
            points.try_into().map_err(|_| LandmarkCountError(len))?;
        Ok(Self { points })
    }
}

/// Frontal mean face centered in a 640x480 frame.
pub static TEMPLATE: Landmarks = Landmarks::new([
    (220, 188), (222, 221), (228, 254), (237, 283), (249, 309), (264, 331),
    (282, 347), (300, 357), (320, 360), (340, 357), (358, 347), (376, 331),
    (391, 309), (403, 283), (412, 254), (418, 221), (420, 188), (240, 162),
    (256, 154), (272, 151), (288, 154), (304, 162), (336, 162), (352, 154),
    (368, 151), (384, 154), (400, 162), (320, 192), (320, 215), (320, 238),
    (320, 261), (300, 275), (310, 278), (320, 280), (330, 278), (340, 275),
    (264, 199), (272, 192), (288, 192), (296, 199), (288, 206), (272, 206),
    (344, 199), (352, 192), (368, 192), (376, 199), (368, 206), (352, 206),
    (284, 314), (289, 305), (302, 298), (320, 296), (338, 298), (351, 305),
    (356, 314), (351, 323), (338, 330), (320, 332), (302, 330), (289, 323),
    (296, 314), (303, 308), (320, 306), (337, 308), (344, 314), (337, 320),
    (320, 322), (303, 320),
]);
