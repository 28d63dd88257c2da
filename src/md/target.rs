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

use super::{astro_err, ManeuverError};
use crate::cosmic::{Bodies, Ephemeris, Orbit};
use crate::linalg::Vector3;
use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// A direction defined by the orbital state itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum OrbitalDirection {
    /// Along the velocity
    Prograde,
    /// Against the velocity
    Retrograde,
    /// Away from the central body
    Zenith,
    /// Toward the central body
    Nadir,
    /// Along the orbital angular momentum
    Normal,
    /// Against the orbital angular momentum
    AntiNormal,
}

impl OrbitalDirection {
    /// Returns the unit vector of this direction for the provided state, in the frame of that state.
    ///
    /// The normal directions are undefined when the position and velocity are parallel.
    pub fn direction(&self, state: &Orbit) -> Result<Vector3<f64>, ManeuverError> {
        let unit = |v: Vector3<f64>, what: &str| {
            if v.norm() < f64::EPSILON {
                Err(ManeuverError::InvalidTarget {
                    msg: format!("{what} is zero"),
                })
            } else {
                Ok(v.normalize())
            }
        };
        match self {
            Self::Prograde => unit(state.velocity(), "velocity"),
            Self::Retrograde => unit(-state.velocity(), "velocity"),
            Self::Zenith => unit(state.radius(), "position"),
            Self::Nadir => unit(-state.radius(), "position"),
            Self::Normal => state.h_hat().map_err(astro_err("orbit normal")),
            Self::AntiNormal => Ok(-state.h_hat().map_err(astro_err("orbit anti-normal"))?),
        }
    }
}

impl fmt::Display for OrbitalDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Where an attitude should point a body vector.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttitudeTarget {
    Orbital(OrbitalDirection),
    /// Toward the center of a celestial body
    Celestial(Bodies),
}

impl AttitudeTarget {
    /// Returns the unit vector from the spacecraft toward this target, in the frame of the state.
    pub fn direction(
        &self,
        state: &Orbit,
        ephem: &dyn Ephemeris,
    ) -> Result<Vector3<f64>, ManeuverError> {
        match self {
            Self::Orbital(dir) => dir.direction(state),
            Self::Celestial(body) => {
                let target = ephem
                    .translate(*body, state.epoch, state.frame)
                    .map_err(astro_err("celestial target position"))?;
                let los = target.radius() - state.radius();
                if los.norm() < f64::EPSILON {
                    return Err(ManeuverError::InvalidTarget {
                        msg: format!("spacecraft is at the center of {body}"),
                    });
                }
                Ok(los.normalize())
            }
        }
    }
}

impl From<OrbitalDirection> for AttitudeTarget {
    fn from(dir: OrbitalDirection) -> Self {
        Self::Orbital(dir)
    }
}

impl From<Bodies> for AttitudeTarget {
    fn from(body: Bodies) -> Self {
        Self::Celestial(body)
    }
}

impl fmt::Display for AttitudeTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Orbital(dir) => write!(f, "{dir}"),
            Self::Celestial(body) => write!(f, "toward {body}"),
        }
    }
}
