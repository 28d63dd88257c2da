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

use super::{Frame, TimeTagged};
use crate::linalg::{Matrix3, Rotation3, UnitQuaternion, Vector3};
use crate::time::Epoch;
use std::fmt;

/// An orientation rotates vectors from a body frame into the inertial `frame`.
///
/// The angular velocity is always zero: re-pointing is instantaneous.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Orientation {
    pub q: UnitQuaternion<f64>,
    /// Angular velocity in rad/s
    pub angular_velocity: Vector3<f64>,
    pub epoch: Epoch,
    pub frame: Frame,
}

impl Orientation {
    pub fn new(q: UnitQuaternion<f64>, epoch: Epoch, frame: Frame) -> Self {
        Self {
            q,
            angular_velocity: Vector3::zeros(),
            epoch,
            frame,
        }
    }

    /// Builds an orientation from a direction cosine matrix, which must be a proper rotation.
    pub fn from_dcm(dcm: Matrix3<f64>, epoch: Epoch, frame: Frame) -> Self {
        Self::new(
            UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(dcm)),
            epoch,
            frame,
        )
    }

    /// Returns the rotation matrix of this orientation
    pub fn dcm(&self) -> Matrix3<f64> {
        self.q.to_rotation_matrix().into_inner()
    }

    /// Rotates a body-fixed vector into the frame of this orientation
    pub fn rotate_vector(&self, body_vector: &Vector3<f64>) -> Vector3<f64> {
        self.q * body_vector
    }
}

impl TimeTagged for Orientation {
    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let decimals = f.precision().unwrap_or(6);
        let q = self.q.quaternion();
        write!(
            f,
            "[{}] {}\tq = [{:.*}, {:.*}, {:.*}, {:.*}]",
            self.frame, self.epoch, decimals, q.w, decimals, q.i, decimals, q.j, decimals, q.k
        )
    }
}
