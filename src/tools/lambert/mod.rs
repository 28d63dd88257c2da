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

use crate::cosmic::{AstroError, Orbit};
use crate::errors::{
    InvalidGravitationalParameterSnafu, InvalidTimeOfFlightSnafu, LambertAstroSnafu, LambertError,
};
use crate::linalg::Vector3;
use snafu::{ensure, ResultExt};
use std::fmt;

mod izzo;

pub use izzo::{izzo, izzo_multi};

/// Absolute and relative tolerance on the universal variable for the direct transfer.
const ZERO_REV_TOLERANCE: f64 = 1e-5;
/// Absolute and relative tolerance on the universal variable for each multi-revolution branch.
const MULTI_REV_TOLERANCE: f64 = 1e-8;
/// Maximum number of iterations of any root-finder of the solver.
const MAX_ITERATIONS: usize = 35;

/// Sense of motion of the transfer arc with respect to the +Z axis of the frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TransferDirection {
    #[default]
    Prograde,
    Retrograde,
}

/// Branch of a multi-revolution solution: for a given number of revolutions, the time of flight equation
/// admits up to two roots, one on either side of the minimum time of flight.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Branch {
    Left,
    Right,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// Boundary states of a Lambert problem.
///
/// The departure and arrival velocities of these states are only used to compute the delta-v of each solution.
#[derive(Copy, Clone, Debug)]
pub struct LambertInput {
    pub initial_state: Orbit,
    pub final_state: Orbit,
}

impl LambertInput {
    /// Builds the input from two states, which must be in the same frame, with a gravitational parameter,
    /// and with the final epoch strictly after the initial one.
    pub fn from_states(initial_state: Orbit, final_state: Orbit) -> Result<Self, LambertError> {
        if final_state.frame != initial_state.frame {
            return Err(LambertError::LambertAstro {
                source: AstroError::FrameMismatch {
                    action: "Lambert solver",
                    frame1: initial_state.frame,
                    frame2: final_state.frame,
                },
            });
        }
        let mu_km3_s2 = initial_state.frame.mu_km3_s2().context(LambertAstroSnafu)?;
        ensure!(mu_km3_s2 > 0.0, InvalidGravitationalParameterSnafu { mu_km3_s2 });

        let tof_s = (final_state.epoch - initial_state.epoch).to_seconds();
        ensure!(tof_s > 0.0, InvalidTimeOfFlightSnafu { tof_s });

        Ok(Self {
            initial_state,
            final_state,
        })
    }

    /// Returns the gravitational parameter of this Lambert problem
    pub fn mu_km3_s2(&self) -> Result<f64, LambertError> {
        self.initial_state
            .frame
            .mu_km3_s2()
            .context(LambertAstroSnafu)
    }

    /// Returns the time of flight in seconds
    pub fn tof_s(&self) -> f64 {
        (self.final_state.epoch - self.initial_state.epoch).to_seconds()
    }
}

/// A single transfer arc connecting the two boundary positions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LambertSolution {
    /// Number of complete revolutions of the arc
    pub revolutions: u32,
    /// Branch of the solution, only set when `revolutions` is non zero
    pub branch: Option<Branch>,
    /// Departure velocity in km/s
    pub v1: Vector3<f64>,
    /// Arrival velocity in km/s
    pub v2: Vector3<f64>,
    /// Root of the time of flight equation in the universal variable
    pub x: f64,
    /// Iterations used by the root-finder
    pub iterations: usize,
    /// Velocity change at departure, from the initial velocity onto the transfer arc, in km/s
    pub delta_v1: Vector3<f64>,
    /// Velocity change at arrival, from the transfer arc onto the final velocity, in km/s
    pub delta_v2: Vector3<f64>,
}

impl LambertSolution {
    /// Total delta-v magnitude of both impulses
    pub fn total_delta_v_km_s(&self) -> f64 {
        self.delta_v1.norm() + self.delta_v2.norm()
    }
}

impl fmt::Display for LambertSolution {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.branch {
            Some(branch) => write!(f, "{} rev ({branch})", self.revolutions)?,
            None => write!(f, "{} rev", self.revolutions)?,
        }
        write!(
            f,
            "\tv1 = [{:.6}, {:.6}, {:.6}] km/s\tv2 = [{:.6}, {:.6}, {:.6}] km/s\ttotal dv = {:.6} km/s",
            self.v1.x,
            self.v1.y,
            self.v1.z,
            self.v2.x,
            self.v2.y,
            self.v2.z,
            self.total_delta_v_km_s()
        )
    }
}

/// All of the solutions found up to the requested number of revolutions.
#[derive(Clone, Debug, PartialEq)]
pub struct LambertResult {
    /// Maximum number of revolutions requested by the caller
    pub max_revolutions: u32,
    /// Direct transfer first, then the left and right branches of each feasible revolution count
    pub solutions: Vec<LambertSolution>,
}

impl LambertResult {
    /// The direct transfer, which always exists when the solver succeeds
    pub fn zero_revolution_solution(&self) -> Option<&LambertSolution> {
        self.solutions.iter().find(|sol| sol.revolutions == 0)
    }

    /// Returns the converged branches for exactly `revolutions` complete revolutions
    pub fn multi_revolution_solutions(&self, revolutions: u32) -> Vec<&LambertSolution> {
        if revolutions == 0 {
            return Vec::new();
        }
        self.solutions
            .iter()
            .filter(|sol| sol.revolutions == revolutions)
            .collect()
    }

    /// Returns the solution with the smallest total delta-v
    pub fn best(&self) -> Option<&LambertSolution> {
        self.solutions.iter().min_by(|a, b| {
            a.total_delta_v_km_s()
                .total_cmp(&b.total_delta_v_km_s())
        })
    }
}
