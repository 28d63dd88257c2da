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

use crate::linalg::{Matrix3, Unit, UnitQuaternion, Vector3};
use std::f64::consts::{PI, TAU};

/// Returns the provided angle bounded between 0.0 and 360.0
pub fn between_0_360(angle: f64) -> f64 {
    let mut bounded = angle % 360.0;
    if bounded < 0.0 {
        bounded += 360.0;
    }
    bounded
}

/// Returns the provided angle bounded between -180.0 and +180.0
pub fn between_pm_180(angle: f64) -> f64 {
    let mut bounded = between_0_360(angle);
    if bounded > 180.0 {
        bounded -= 360.0;
    }
    bounded
}

/// Returns the provided angle bounded between 0.0 and 2π, in radians
pub fn between_0_tau(angle_rad: f64) -> f64 {
    let mut bounded = angle_rad % TAU;
    if bounded < 0.0 {
        bounded += TAU;
    }
    bounded
}

/// Returns the signed angle in radians from `a` to `b`, positive when the rotation from `a` to `b`
/// is counter-clockwise about the `normal` direction. The result is in ]-π; π].
pub fn signed_angle(a: &Vector3<f64>, b: &Vector3<f64>, normal: &Vector3<f64>) -> f64 {
    let n_hat = normal.normalize();
    a.cross(b).dot(&n_hat).atan2(a.dot(b))
}

/// Returns the unsigned angular distance between two angles in radians, folded into [0; π].
pub fn angle_difference(a_rad: f64, b_rad: f64) -> f64 {
    let delta = (a_rad - b_rad + TAU) % TAU;
    if delta > PI {
        TAU - delta
    } else {
        delta
    }
}

/// Returns the minimal rotation which brings `from` onto `to`.
///
/// Unlike `UnitQuaternion::rotation_between`, anti-parallel vectors are supported: the rotation is then a
/// half turn about an axis orthogonal to `to`. Returns None if either vector is zero.
pub fn rotation_between(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<UnitQuaternion<f64>> {
    if from.norm() < f64::EPSILON || to.norm() < f64::EPSILON {
        return None;
    }
    if let Some(q) = UnitQuaternion::rotation_between(from, to) {
        return Some(q);
    }
    if from.dot(to) > 0.0 {
        // Parallel but rejected for precision reasons
        return Some(UnitQuaternion::identity());
    }
    // Anti-parallel: pick the axis least aligned with `to` to build an orthogonal rotation axis.
    let abs = to.abs();
    let least = if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let axis = Unit::new_normalize(to.cross(&least));
    Some(UnitQuaternion::from_axis_angle(&axis, PI))
}

/// Rotate a vector about a unit axis by the provided angle in radians (right hand rule).
pub fn rotate_about(v: &Vector3<f64>, axis: &Vector3<f64>, angle_rad: f64) -> Vector3<f64> {
    UnitQuaternion::from_axis_angle(&Unit::new_normalize(*axis), angle_rad) * v
}

/// Returns the DCM to rotate by the provided angle about the X axis
pub fn r1(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, s, 0.0, -s, c)
}

/// Returns the DCM to rotate by the provided angle about the Y axis
pub fn r2(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Returns the DCM to rotate by the provided angle about the Z axis
pub fn r3(angle_rad: f64) -> Matrix3<f64> {
    let (s, c) = angle_rad.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}
