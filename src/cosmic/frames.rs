/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use super::{AstroError, Bodies};
use crate::linalg::Matrix3;
use crate::utils::r1;
use serde_derive::{Deserialize, Serialize};
use std::cmp::PartialEq;
use std::fmt;

/// Mean obliquity of the ecliptic at J2000, in degrees (IAU 1976, 84381.448 arcseconds)
pub const J2000_OBLIQUITY_DEG: f64 = 84_381.448 / 3600.0;

/// Orientation of the axes of a frame, all of which are inertial.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameOrientation {
    /// Earth mean equator and equinox of J2000
    J2000,
    /// Ecliptic and equinox of J2000
    EclipticJ2000,
}

impl FrameOrientation {
    /// Returns the DCM which rotates a vector expressed in this orientation into the `to` orientation.
    pub fn dcm_to(&self, to: FrameOrientation) -> Matrix3<f64> {
        match (self, to) {
            (Self::J2000, Self::EclipticJ2000) => r1(J2000_OBLIQUITY_DEG.to_radians()),
            (Self::EclipticJ2000, Self::J2000) => r1(-J2000_OBLIQUITY_DEG.to_radians()),
            _ => Matrix3::identity(),
        }
    }
}

impl fmt::Display for FrameOrientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::J2000 => write!(f, "J2000"),
            Self::EclipticJ2000 => write!(f, "ECLIPJ2000"),
        }
    }
}

/// A frame is defined by its center, the orientation of its axes, and optionally the gravitational parameter of its center.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub center: Bodies,
    pub orientation: FrameOrientation,
    /// Gravitational parameter of the center, in km^3/s^2
    pub mu_km3_s2: Option<f64>,
}

pub const EARTH_J2000: Frame = Frame {
    center: Bodies::Earth,
    orientation: FrameOrientation::J2000,
    mu_km3_s2: Some(398_600.435_436),
};

pub const MOON_J2000: Frame = Frame {
    center: Bodies::Luna,
    orientation: FrameOrientation::J2000,
    mu_km3_s2: Some(4_902.800_066),
};

pub const SUN_J2000: Frame = Frame {
    center: Bodies::Sun,
    orientation: FrameOrientation::J2000,
    mu_km3_s2: Some(132_712_440_041.279_42),
};

pub const EARTH_ECLIPJ2000: Frame = Frame {
    center: Bodies::Earth,
    orientation: FrameOrientation::EclipticJ2000,
    mu_km3_s2: Some(398_600.435_436),
};

impl Frame {
    /// Builds a new frame with the default gravitational parameter of the center
    pub fn new(center: Bodies, orientation: FrameOrientation) -> Self {
        Self {
            center,
            orientation,
            mu_km3_s2: center.mu_km3_s2(),
        }
    }

    /// Returns a copy of this frame with the provided gravitational parameter
    pub fn with_mu_km3_s2(mut self, mu_km3_s2: f64) -> Self {
        self.mu_km3_s2 = Some(mu_km3_s2);
        self
    }

    /// Returns the gravitational parameter of the center of this frame
    pub fn mu_km3_s2(&self) -> Result<f64, AstroError> {
        self.mu_km3_s2
            .ok_or(AstroError::NoGravitationalParameter { frame: *self })
    }

    /// Returns a copy of this frame centered on another body, using the default GM of that body
    pub fn with_center(self, center: Bodies) -> Self {
        Self::new(center, self.orientation)
    }

    /// Returns whether both frames share the same center
    pub fn ephem_origin_match(&self, other: Self) -> bool {
        self.center == other.center
    }

    /// Returns whether both frames share the same orientation
    pub fn orient_origin_match(&self, other: Self) -> bool {
        self.orientation == other.orientation
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.center, self.orientation)?;
        if let Some(mu) = self.mu_km3_s2 {
            write!(f, " (μ = {mu} km^3/s^2)")?;
        }
        Ok(())
    }
}
