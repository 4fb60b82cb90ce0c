//! Where the device is looking

use crate::coordinates::Cartesian3;
use serde::{Deserialize, Serialize};

/// Line of sight plus the screen's "up" direction, both in sky coordinates
///
/// The two vectors are unit length and perpendicular whenever they come out
/// of [`Pointing::new`] or the orientation model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointing {
    pub line_of_sight: Cartesian3,
    pub perpendicular: Cartesian3,
}

impl Default for Pointing {
    fn default() -> Self {
        Pointing {
            line_of_sight: Cartesian3::unit_x(),
            perpendicular: Cartesian3::unit_y(),
        }
    }
}

impl Pointing {
    /// Normalizes `line_of_sight` and makes `perpendicular` orthogonal to it.
    ///
    /// Returns `None` if either vector is zero or they are parallel.
    pub fn new(line_of_sight: Cartesian3, perpendicular: Cartesian3) -> Option<Self> {
        let line_of_sight = line_of_sight.normalize()?;
        let perpendicular = perpendicular.reject_from(&line_of_sight).normalize()?;
        Some(Pointing {
            line_of_sight,
            perpendicular,
        })
    }
}

/// How the device is held, which fixes the pointing and screen-up vectors
/// in phone coordinates
///
/// Phone coordinates: x across the short side, y along the long side, z out
/// of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewDirectionMode {
    /// Handheld, looking through the back of the phone
    #[default]
    Standard,
    /// Handheld with the display rotated a quarter turn
    Rotate90,
    /// Strapped to a telescope tube, sighting along the long edge
    Telescope,
}

impl ViewDirectionMode {
    /// Pointing direction in phone coordinates
    pub fn pointing_in_phone(&self) -> Cartesian3 {
        match self {
            ViewDirectionMode::Standard | ViewDirectionMode::Rotate90 => -Cartesian3::unit_z(),
            ViewDirectionMode::Telescope => Cartesian3::unit_y(),
        }
    }

    /// Screen-up direction in phone coordinates
    pub fn screen_up_in_phone(&self) -> Cartesian3 {
        match self {
            ViewDirectionMode::Standard => Cartesian3::unit_y(),
            ViewDirectionMode::Rotate90 => Cartesian3::unit_x(),
            ViewDirectionMode::Telescope => Cartesian3::unit_z(),
        }
    }
}
