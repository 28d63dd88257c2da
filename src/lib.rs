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

/*! # mnvr-planner

Impulsive and attitude maneuver planning around Keplerian orbits, with a multi-revolution Lambert solver.

A [`md::ManeuverPlan`] stores maneuvers in an arena and chains them. The caller offers successive orbital states in
increasing epoch order, and each maneuver fires once per approach of its maneuver point.
*/

/// Provides the celestial bodies, frames, orbital states, and the propulsion and spacecraft models.
pub mod cosmic;

/// Utility functions shared by different modules, and which may be useful to engineers.
pub mod utils;

mod errors;
/// Functions which may fail will return an error, this library should never panic.
pub use self::errors::LambertError;

/// All the input/output needs for this library: YAML configuration and maneuver records.
pub mod io;

/// All of the mission design tools: maneuver plans, impulsive maneuvers and attitudes.
pub mod md;

/// Simple tools (e.g. Lambert solver)
pub mod tools;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
    pub use na::geometry::*;
}

/// Re-export some useful things
pub use self::cosmic::{Frame, Orbit, Spacecraft, TimeTagged};
