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

//! Crossing detection of a maneuver point.
//!
//! A maneuver may only fire once per approach of its maneuver point: it fires on the transition from
//! "the point is ahead" (inbound) to "the point is behind", and never on either steady state.

use crate::linalg::Vector3;
use crate::utils::signed_angle;

/// The one bit of memory of the crossing detector.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PredicateState {
    inbound: bool,
}

impl PredicateState {
    /// Whether the maneuver point was ahead of the spacecraft on the last evaluation
    pub fn is_inbound(&self) -> bool {
        self.inbound
    }

    /// Evaluates the crossing predicate and returns the new state along with whether the maneuver may fire.
    ///
    /// The angle from the position to the maneuver point is signed about the angular momentum `hvec`.
    /// An exact match between the position and the maneuver point fires immediately and leaves the state untouched.
    pub fn transition(
        self,
        position: &Vector3<f64>,
        point: &Vector3<f64>,
        hvec: &Vector3<f64>,
    ) -> (Self, bool) {
        if position == point {
            return (self, true);
        }
        let inbound = signed_angle(position, point, hvec) > 0.0;
        if inbound == self.inbound {
            (self, false)
        } else {
            (Self { inbound }, !inbound)
        }
    }
}
