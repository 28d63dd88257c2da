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

use super::{AttitudeTarget, ManeuverError, OrbitalDirection};
use crate::cosmic::{Bodies, BodyAxis, Ephemeris, Instrument, Orbit};
use crate::linalg::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use super::{InvalidBodyVectorSnafu, InvalidSeparationSnafu};
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

/// Default minimum angle between the two vectors of a TRIAD, in degrees
pub const DEFAULT_MIN_SEPARATION_DEG: f64 = 5.0;

/// A fully constrained attitude from two body vectors and two targets (TRIAD algorithm).
///
/// The primary body vector is mapped exactly onto the primary target direction, and the secondary body vector
/// is mapped into the plane spanned by both target directions.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triad {
    pub primary_body: Vector3<f64>,
    pub primary_target: AttitudeTarget,
    pub secondary_body: Vector3<f64>,
    pub secondary_target: AttitudeTarget,
    pub min_separation_deg: f64,
}

impl Triad {
    pub fn new(
        primary_body: Vector3<f64>,
        primary_target: AttitudeTarget,
        secondary_body: Vector3<f64>,
        secondary_target: AttitudeTarget,
    ) -> Result<Self, ManeuverError> {
        Self::with_min_separation(
            primary_body,
            primary_target,
            secondary_body,
            secondary_target,
            DEFAULT_MIN_SEPARATION_DEG,
        )
    }

    /// Builds a TRIAD with a custom minimum separation between vectors, in degrees.
    pub fn with_min_separation(
        primary_body: Vector3<f64>,
        primary_target: AttitudeTarget,
        secondary_body: Vector3<f64>,
        secondary_target: AttitudeTarget,
        min_separation_deg: f64,
    ) -> Result<Self, ManeuverError> {
        ensure!(
            (0.0..90.0).contains(&min_separation_deg),
            InvalidSeparationSnafu { min_separation_deg }
        );
        if primary_body.norm() < f64::EPSILON {
            return Err(ManeuverError::InvalidBodyVector { which: "primary" });
        }
        if secondary_body.norm() < f64::EPSILON {
            return Err(ManeuverError::InvalidBodyVector { which: "secondary" });
        }
        check_separation(&primary_body, &secondary_body, min_separation_deg, "body")?;
        Ok(Self {
            primary_body,
            primary_target,
            secondary_body,
            secondary_target,
            min_separation_deg,
        })
    }

    /// Points the boresight of an instrument toward the primary target, and turns the instrument about its boresight
    /// so that its reference vector lies toward the secondary target.
    pub fn from_instrument(
        instrument: &Instrument,
        primary_target: AttitudeTarget,
        secondary_target: AttitudeTarget,
    ) -> Result<Self, ManeuverError> {
        let ref_vector = instrument
            .ref_vector_in_spacecraft_frame()
            .context(InvalidBodyVectorSnafu {
                which: "instrument reference",
            })?;
        Self::new(
            instrument.boresight_in_spacecraft_frame(),
            primary_target,
            ref_vector,
            secondary_target,
        )
    }

    /// Points the boresights of two instruments toward their respective targets.
    pub fn from_instruments(
        primary: &Instrument,
        primary_target: AttitudeTarget,
        secondary: &Instrument,
        secondary_target: AttitudeTarget,
    ) -> Result<Self, ManeuverError> {
        Self::new(
            primary.boresight_in_spacecraft_frame(),
            primary_target,
            secondary.boresight_in_spacecraft_frame(),
            secondary_target,
        )
    }

    /// Local vertical local horizontal: the bottom faces the central body and the front follows the velocity.
    pub fn lvlh() -> Self {
        Self {
            primary_body: BodyAxis::Down.vector(),
            primary_target: OrbitalDirection::Nadir.into(),
            secondary_body: BodyAxis::Front.vector(),
            secondary_target: OrbitalDirection::Prograde.into(),
            min_separation_deg: DEFAULT_MIN_SEPARATION_DEG,
        }
    }

    /// Front along the velocity with the top facing the Sun as much as possible.
    pub fn prograde_with_sun_tracking() -> Self {
        Self {
            primary_body: BodyAxis::Front.vector(),
            primary_target: OrbitalDirection::Prograde.into(),
            secondary_body: BodyAxis::Up.vector(),
            secondary_target: Bodies::Sun.into(),
            min_separation_deg: DEFAULT_MIN_SEPARATION_DEG,
        }
    }

    /// Computes the rotation from the spacecraft frame to the frame of the state.
    pub fn attitude(
        &self,
        state: &Orbit,
        ephem: &dyn Ephemeris,
    ) -> Result<UnitQuaternion<f64>, ManeuverError> {
        let primary_ref = self.primary_target.direction(state, ephem)?;
        let secondary_ref = self.secondary_target.direction(state, ephem)?;
        check_separation(
            &primary_ref,
            &secondary_ref,
            self.min_separation_deg,
            "reference",
        )?;
        Ok(triad_rotation(
            &self.primary_body,
            &self.secondary_body,
            &primary_ref,
            &secondary_ref,
        ))
    }
}

impl fmt::Display for Triad {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "TRIAD {} -> {}, {} -> {}",
            self.primary_body, self.primary_target, self.secondary_body, self.secondary_target
        )
    }
}

fn check_separation(
    a: &Vector3<f64>,
    b: &Vector3<f64>,
    min_separation_deg: f64,
    what: &'static str,
) -> Result<(), ManeuverError> {
    let angle = a.angle(b);
    let min_sep = min_separation_deg.to_radians();
    if angle < min_sep || angle > std::f64::consts::PI - min_sep {
        Err(ManeuverError::CollinearVectors {
            what,
            angle_deg: angle.to_degrees(),
            min_separation_deg,
        })
    } else {
        Ok(())
    }
}

/// Orthonormal triad whose first axis is along `primary`, as the columns of a matrix.
fn triad_matrix(primary: &Vector3<f64>, secondary: &Vector3<f64>) -> Matrix3<f64> {
    let t1 = primary.normalize();
    let t2 = t1.cross(secondary).normalize();
    let t3 = t1.cross(&t2);
    Matrix3::from_columns(&[t1, t2, t3])
}

/// Returns the rotation mapping the body vectors onto the reference directions, which must not be collinear.
pub(crate) fn triad_rotation(
    primary_body: &Vector3<f64>,
    secondary_body: &Vector3<f64>,
    primary_ref: &Vector3<f64>,
    secondary_ref: &Vector3<f64>,
) -> UnitQuaternion<f64> {
    let m_ref = triad_matrix(primary_ref, secondary_ref);
    let m_body = triad_matrix(primary_body, secondary_body);
    let dcm = m_ref * m_body.transpose();
    UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(dcm))
}
