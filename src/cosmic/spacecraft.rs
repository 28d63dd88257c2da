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

use super::propulsion::{UnknownEngineSnafu, UnknownTankSnafu};
use super::{Engine, FuelTank, PropulsionError};
use crate::linalg::{UnitQuaternion, Vector3};
use crate::md::ManeuverHandle;
use crate::time::Epoch;
use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

/// The body axes of the spacecraft frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Sequence, Serialize, Deserialize)]
pub enum BodyAxis {
    Front,
    Back,
    Right,
    Left,
    Up,
    Down,
}

impl BodyAxis {
    /// Unit vector of this axis in the spacecraft frame
    pub fn vector(&self) -> Vector3<f64> {
        match self {
            Self::Front => Vector3::y(),
            Self::Back => -Vector3::y(),
            Self::Right => Vector3::x(),
            Self::Left => -Vector3::x(),
            Self::Up => Vector3::z(),
            Self::Down => -Vector3::z(),
        }
    }
}

impl fmt::Display for BodyAxis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An instrument mounted on the spacecraft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    /// Boresight in the instrument frame
    pub boresight: Vector3<f64>,
    /// Rotation from the instrument frame to the spacecraft frame
    pub orientation: UnitQuaternion<f64>,
    /// Reference direction orthogonal to the boresight (e.g. the long side of a detector), in the instrument frame
    #[serde(default)]
    pub ref_vector: Option<Vector3<f64>>,
}

impl Instrument {
    pub fn new(name: &str, boresight: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            name: name.to_string(),
            boresight,
            orientation,
            ref_vector: None,
        }
    }

    pub fn with_ref_vector(mut self, ref_vector: Vector3<f64>) -> Self {
        self.ref_vector = Some(ref_vector);
        self
    }

    pub fn boresight_in_spacecraft_frame(&self) -> Vector3<f64> {
        self.orientation * self.boresight
    }

    pub fn ref_vector_in_spacecraft_frame(&self) -> Option<Vector3<f64>> {
        self.ref_vector.map(|v| self.orientation * v)
    }
}

/// The host of a maneuver plan: it holds the propulsion resources and the armed standby maneuver.
pub trait Vehicle {
    /// Dry mass plus all of the remaining propellant
    fn total_mass_kg(&self) -> f64;

    fn engine(&self, serial_number: &str) -> Result<&Engine, PropulsionError>;

    /// Ignites the requested engine for the provided ΔV magnitude (km/s) and returns the propellant burned in kg.
    fn ignite(&mut self, engine_serial: &str, delta_v_km_s: f64) -> Result<f64, PropulsionError>;

    fn instrument(&self, name: &str) -> Option<&Instrument>;

    /// Arms the maneuver to be tried next, at or after the provided epoch. `None` disarms.
    fn arm_standby_maneuver(&mut self, maneuver: Option<ManeuverHandle>, epoch: Epoch);

    /// Called once a maneuver has executed
    fn maneuver_executed(&mut self, maneuver: ManeuverHandle);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Spacecraft {
    pub name: String,
    pub dry_mass_kg: f64,
    pub max_operating_mass_kg: f64,
    pub fuel_tanks: Vec<FuelTank>,
    pub engines: Vec<Engine>,
    pub instruments: Vec<Instrument>,
    /// The maneuver armed by the last execution and the epoch from which it may fire
    pub standby_maneuver: Option<(ManeuverHandle, Epoch)>,
    pub executed_maneuvers: Vec<ManeuverHandle>,
}

impl Spacecraft {
    pub fn new(name: &str, dry_mass_kg: f64, max_operating_mass_kg: f64) -> Self {
        Self {
            name: name.to_string(),
            dry_mass_kg,
            max_operating_mass_kg,
            fuel_tanks: Vec::new(),
            engines: Vec::new(),
            instruments: Vec::new(),
            standby_maneuver: None,
            executed_maneuvers: Vec::new(),
        }
    }

    pub fn with_fuel_tank(mut self, tank: FuelTank) -> Self {
        self.fuel_tanks.push(tank);
        if self.total_mass_kg() > self.max_operating_mass_kg {
            warn!(
                "{}: total mass {:.3} kg exceeds the maximum operating mass of {:.3} kg",
                self.name,
                self.total_mass_kg(),
                self.max_operating_mass_kg
            );
        }
        self
    }

    /// Adds an engine, which must be fed by a tank already on board.
    pub fn with_engine(mut self, engine: Engine) -> Result<Self, PropulsionError> {
        ensure!(
            self.fuel_tank(&engine.fuel_tank).is_ok(),
            UnknownTankSnafu {
                serial_number: engine.fuel_tank.clone()
            }
        );
        self.engines.push(engine);
        Ok(self)
    }

    pub fn with_instrument(mut self, instrument: Instrument) -> Self {
        self.instruments.push(instrument);
        self
    }

    pub fn fuel_tank(&self, serial_number: &str) -> Result<&FuelTank, PropulsionError> {
        self.fuel_tanks
            .iter()
            .find(|tank| tank.serial_number == serial_number)
            .context(UnknownTankSnafu { serial_number })
    }

    pub fn fuel_mass_kg(&self) -> f64 {
        self.fuel_tanks.iter().map(|tank| tank.quantity_kg).sum()
    }

    /// Refills every tank to its initial quantity and forgets the maneuver history.
    pub fn refuel(&mut self) {
        for tank in &mut self.fuel_tanks {
            tank.refuel();
        }
        self.standby_maneuver = None;
        self.executed_maneuvers.clear();
    }
}

impl Vehicle for Spacecraft {
    fn total_mass_kg(&self) -> f64 {
        self.dry_mass_kg + self.fuel_mass_kg()
    }

    fn engine(&self, serial_number: &str) -> Result<&Engine, PropulsionError> {
        self.engines
            .iter()
            .find(|engine| engine.serial_number == serial_number)
            .context(UnknownEngineSnafu { serial_number })
    }

    fn ignite(&mut self, engine_serial: &str, delta_v_km_s: f64) -> Result<f64, PropulsionError> {
        let engine = self.engine(engine_serial)?;
        let fuel_kg = engine.fuel_burned_kg(delta_v_km_s, self.total_mass_kg());
        let tank_serial = engine.fuel_tank.clone();
        let tank = self
            .fuel_tanks
            .iter_mut()
            .find(|tank| tank.serial_number == tank_serial)
            .context(UnknownTankSnafu {
                serial_number: tank_serial.clone(),
            })?;
        tank.burn(fuel_kg)?;
        debug!(
            "{}: engine {engine_serial} burned {fuel_kg:.6} kg for {:.6} m/s",
            self.name,
            delta_v_km_s * 1e3
        );
        Ok(fuel_kg)
    }

    fn instrument(&self, name: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|instr| instr.name == name)
    }

    fn arm_standby_maneuver(&mut self, maneuver: Option<ManeuverHandle>, epoch: Epoch) {
        self.standby_maneuver = maneuver.map(|handle| (handle, epoch));
    }

    fn maneuver_executed(&mut self, maneuver: ManeuverHandle) {
        self.executed_maneuvers.push(maneuver);
    }
}

impl fmt::Display for Spacecraft {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {:.3} kg ({:.3} kg dry, {:.3} kg propellant), {} engine(s), {} instrument(s)",
            self.name,
            self.total_mass_kg(),
            self.dry_mass_kg,
            self.fuel_mass_kg(),
            self.engines.len(),
            self.instruments.len()
        )
    }
}
