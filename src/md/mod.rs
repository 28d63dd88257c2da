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

use crate::cosmic::{AstroError, PropulsionError};
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

mod window;
pub use window::Window;

pub mod predicate;

mod target;
pub use target::{AttitudeTarget, OrbitalDirection};

mod triad;
pub use triad::{Triad, DEFAULT_MIN_SEPARATION_DEG};

mod impulsive;
pub use impulsive::{ImpulsiveManeuver, NodeCrossing};

mod attitude;
pub use attitude::AttitudeManeuver;

mod plan;
pub use plan::{Maneuver, ManeuverKind, ManeuverOutcome, ManeuverPlan};

/// Index of a maneuver in a [`ManeuverPlan`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ManeuverHandle(pub(crate) usize);

impl ManeuverHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ManeuverHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "maneuver #{}", self.0)
    }
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ManeuverError {
    #[snafu(display(
        "{what} vectors are too close to collinear: {angle_deg:.2} deg apart but at least {min_separation_deg:.2} deg required"
    ))]
    CollinearVectors {
        what: &'static str,
        angle_deg: f64,
        min_separation_deg: f64,
    },
    #[snafu(display("minimum separation must be within [0; 90[ deg, got {min_separation_deg} deg"))]
    InvalidSeparation { min_separation_deg: f64 },
    #[snafu(display("{which} body vector must not be zero"))]
    InvalidBodyVector { which: &'static str },
    #[snafu(display("angular momentum is zero when computing {action}: position and velocity are parallel"))]
    ZeroAngularMomentum { action: &'static str },
    #[snafu(display("current and target orbits do not intersect: apsidal alignment impossible"))]
    NoApsidalIntersection,
    #[snafu(display("maneuver point of {maneuver} is undefined: {msg}"))]
    ManeuverPointUndefined { maneuver: String, msg: String },
    #[snafu(display("{handle} is not part of this maneuver plan"))]
    UnknownHandle { handle: ManeuverHandle },
    #[snafu(display("maneuver requires an instrument named `{name}`"))]
    UnknownInstrument { name: String },
    #[snafu(display("maneuver target is invalid: {msg}"))]
    InvalidTarget { msg: String },
    #[snafu(display("propulsion failure: {source}"))]
    Propulsion { source: PropulsionError },
    #[snafu(display("{action} failed: {source}"))]
    ManeuverAstro {
        action: &'static str,
        source: AstroError,
    },
}

impl From<PropulsionError> for ManeuverError {
    fn from(source: PropulsionError) -> Self {
        Self::Propulsion { source }
    }
}

/// Maps an astro error onto a maneuver error, surfacing the degenerate geometry distinctly.
pub(crate) fn astro_err(action: &'static str) -> impl FnOnce(AstroError) -> ManeuverError {
    move |source| match source {
        AstroError::ZeroAngularMomentum => ManeuverError::ZeroAngularMomentum { action },
        source => ManeuverError::ManeuverAstro { action, source },
    }
}
