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

use crate::cosmic::AstroError;
use snafu::prelude::*;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LambertError {
    #[snafu(display("time of flight must be strictly positive, got {tof_s} s"))]
    InvalidTimeOfFlight { tof_s: f64 },
    #[snafu(display("gravitational parameter must be strictly positive, got {mu_km3_s2} km^3/s^2"))]
    InvalidGravitationalParameter { mu_km3_s2: f64 },
    #[snafu(display("boundary positions are null or collinear: transfer plane is undefined"))]
    CollinearPositions,
    #[snafu(display("Lambert solver did not converge after {maxiter} iterations"))]
    NonConvergence { maxiter: usize },
    #[snafu(display("Lambert solver derivative vanished at x = {x}"))]
    SingularDerivative { x: f64 },
    #[snafu(display("Lambert boundary states are invalid: {source}"))]
    LambertAstro { source: AstroError },
}
