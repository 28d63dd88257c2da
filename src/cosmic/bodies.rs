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

use super::AstroError;
use serde_derive::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// Defines the celestial bodies which may be the center of a frame or the target of a pointing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Bodies {
    SSB,
    Sun,
    Mercury,
    Venus,
    EarthBarycenter,
    Earth,
    Luna,
    MarsBarycenter,
    JupiterBarycenter,
    SaturnBarycenter,
    UranusBarycenter,
    NeptuneBarycenter,
    PlutoBarycenter,
}

impl Bodies {
    /// Returns the gravitational parameter of this body in km^3/s^2 (DE440 values), if defined
    pub fn mu_km3_s2(&self) -> Option<f64> {
        match *self {
            Self::SSB => None,
            Self::Sun => Some(132_712_440_041.279_42),
            Self::Mercury => Some(22_031.868_551),
            Self::Venus => Some(324_858.592),
            Self::EarthBarycenter => Some(403_503.235_502),
            Self::Earth => Some(398_600.435_436),
            Self::Luna => Some(4_902.800_066),
            Self::MarsBarycenter => Some(42_828.375_816),
            Self::JupiterBarycenter => Some(126_712_764.100_000),
            Self::SaturnBarycenter => Some(37_940_584.841_800),
            Self::UranusBarycenter => Some(5_794_556.400_000),
            Self::NeptuneBarycenter => Some(6_836_527.100_580),
            Self::PlutoBarycenter => Some(975.500_000),
        }
    }

    /// Returns the mean equatorial radius in km, if defined
    pub fn equatorial_radius_km(&self) -> Option<f64> {
        match *self {
            Self::Sun => Some(695_700.0),
            Self::Mercury => Some(2_440.53),
            Self::Venus => Some(6_051.8),
            Self::Earth => Some(6_378.1366),
            Self::Luna => Some(1_737.4),
            _ => None,
        }
    }

    /// Returns the human name
    pub fn name(&self) -> &'static str {
        match *self {
            Self::SSB => "Solar System Barycenter",
            Self::Sun => "Sun",
            Self::Mercury => "Mercury",
            Self::Venus => "Venus",
            Self::EarthBarycenter => "Earth Moon Barycenter",
            Self::Earth => "Earth",
            Self::Luna => "Moon",
            Self::MarsBarycenter => "Mars Barycenter",
            Self::JupiterBarycenter => "Jupiter Barycenter",
            Self::SaturnBarycenter => "Saturn Barycenter",
            Self::UranusBarycenter => "Uranus Barycenter",
            Self::NeptuneBarycenter => "Neptune Barycenter",
            Self::PlutoBarycenter => "Pluto Barycenter",
        }
    }
}

impl fmt::Display for Bodies {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<&str> for Bodies {
    type Error = AstroError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name.to_lowercase().as_str() {
            "solar system barycenter" | "ssb" => Ok(Self::SSB),
            "sun" => Ok(Self::Sun),
            "mercury" => Ok(Self::Mercury),
            "venus" => Ok(Self::Venus),
            "earth moon barycenter" | "emb" => Ok(Self::EarthBarycenter),
            "earth" => Ok(Self::Earth),
            "moon" | "luna" => Ok(Self::Luna),
            "mars" | "mars barycenter" => Ok(Self::MarsBarycenter),
            "jupiter" | "jupiter barycenter" => Ok(Self::JupiterBarycenter),
            "saturn" | "saturn barycenter" => Ok(Self::SaturnBarycenter),
            "uranus" | "uranus barycenter" => Ok(Self::UranusBarycenter),
            "neptune" | "neptune barycenter" => Ok(Self::NeptuneBarycenter),
            "pluto" | "pluto barycenter" => Ok(Self::PlutoBarycenter),
            _ => Err(AstroError::UnknownBody {
                name: name.to_string(),
            }),
        }
    }
}
