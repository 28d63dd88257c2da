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

use crate::time::{Duration, Epoch};
use snafu::Snafu;

/// A trait allowing for something to have an epoch
pub trait TimeTagged {
    /// Retrieve the Epoch
    fn epoch(&self) -> Epoch;
    /// Set the Epoch
    fn set_epoch(&mut self, epoch: Epoch);

    /// Shift this epoch by a duration (can be negative)
    fn shift_by(&mut self, duration: Duration) {
        self.set_epoch(self.epoch() + duration);
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AstroError {
    #[snafu(display("frame {frame} has no gravitational parameter"))]
    NoGravitationalParameter { frame: Frame },
    #[snafu(display("{action} requires the same frame, got {frame1} and {frame2}"))]
    FrameMismatch {
        action: &'static str,
        frame1: Frame,
        frame2: Frame,
    },
    #[snafu(display("angular momentum is zero: position and velocity are parallel"))]
    ZeroAngularMomentum,
    #[snafu(display("math domain error: {msg}"))]
    MathDomain { msg: String },
    #[snafu(display("maximum iterations reached ({iter})"))]
    MaxIterReached { iter: usize },
    #[snafu(display("unknown celestial body `{name}`"))]
    UnknownBody { name: String },
    #[snafu(display("no ephemeris for {target} as seen from {observer}"))]
    EphemerisUnavailable { target: Bodies, observer: Bodies },
}

mod bodies;
pub use self::bodies::*;

mod frames;
pub use self::frames::*;

mod orbit;
pub use self::orbit::*;

mod ephemeris;
pub use self::ephemeris::*;

mod orientation;
pub use self::orientation::*;

mod propulsion;
pub use self::propulsion::*;

mod spacecraft;
pub use self::spacecraft::*;

/// From NIST special publication 330, 2008 edition, in meters per second squared
pub const STD_GRAVITY: f64 = 9.80665;
