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

use super::{AttitudeTarget, ManeuverError, OrbitalDirection, Triad};
use crate::cosmic::{Bodies, BodyAxis, Ephemeris, Orbit, Vehicle};
use crate::linalg::{UnitQuaternion, Vector3};
use crate::utils::rotation_between;
use std::fmt;

/// The catalog of attitude maneuvers. None of them consume propellant.
#[derive(Clone, Debug, PartialEq)]
pub enum AttitudeManeuver {
    /// Points a body axis toward a target, leaving the roll about that axis free
    Pointing {
        axis: BodyAxis,
        target: AttitudeTarget,
    },
    /// Points the boresight of an instrument of the vehicle toward a target
    InstrumentPointing {
        instrument: String,
        target: AttitudeTarget,
    },
    /// Fully constrained attitude from two vectors
    Triad(Triad),
}

impl AttitudeManeuver {
    /// Points the front of the spacecraft toward the provided target
    pub fn front_toward(target: AttitudeTarget) -> Self {
        Self::Pointing {
            axis: BodyAxis::Front,
            target,
        }
    }

    pub fn prograde() -> Self {
        Self::front_toward(OrbitalDirection::Prograde.into())
    }

    pub fn retrograde() -> Self {
        Self::front_toward(OrbitalDirection::Retrograde.into())
    }

    pub fn zenith() -> Self {
        Self::front_toward(OrbitalDirection::Zenith.into())
    }

    pub fn nadir() -> Self {
        Self::front_toward(OrbitalDirection::Nadir.into())
    }

    pub fn normal() -> Self {
        Self::front_toward(OrbitalDirection::Normal.into())
    }

    pub fn anti_normal() -> Self {
        Self::front_toward(OrbitalDirection::AntiNormal.into())
    }

    /// Points the front of the spacecraft toward the center of a celestial body
    pub fn celestial(body: Bodies) -> Self {
        Self::front_toward(body.into())
    }

    pub fn instrument_pointing(instrument: &str, target: AttitudeTarget) -> Self {
        Self::InstrumentPointing {
            instrument: instrument.to_string(),
            target,
        }
    }

    /// Computes the rotation from the spacecraft frame to the frame of the provided state.
    pub(crate) fn attitude<V: Vehicle + ?Sized>(
        &self,
        local: &Orbit,
        vehicle: &V,
        ephem: &dyn Ephemeris,
    ) -> Result<UnitQuaternion<f64>, ManeuverError> {
        match self {
            Self::Pointing { axis, target } => {
                let direction = target.direction(local, ephem)?;
                point(&axis.vector(), &direction)
            }
            Self::InstrumentPointing { instrument, target } => {
                let instr = vehicle
                    .instrument(instrument)
                    .ok_or_else(|| ManeuverError::UnknownInstrument {
                        name: instrument.clone(),
                    })?;
                let direction = target.direction(local, ephem)?;
                point(&instr.boresight_in_spacecraft_frame(), &direction)
            }
            Self::Triad(triad) => triad.attitude(local, ephem),
        }
    }
}

fn point(body: &Vector3<f64>, direction: &Vector3<f64>) -> Result<UnitQuaternion<f64>, ManeuverError> {
    rotation_between(body, direction).ok_or(ManeuverError::InvalidBodyVector { which: "pointed" })
}

impl fmt::Display for AttitudeManeuver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Pointing { axis, target } => write!(f, "{axis} {target}"),
            Self::InstrumentPointing { instrument, target } => {
                write!(f, "{instrument} boresight {target}")
            }
            Self::Triad(triad) => write!(f, "{triad}"),
        }
    }
}
