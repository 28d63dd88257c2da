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

use super::STD_GRAVITY;
use serde_derive::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fmt;

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PropulsionError {
    #[snafu(display("insufficient propellant: {requested_kg:.3} kg requested but only {available_kg:.3} kg available"))]
    InsufficientPropellant { requested_kg: f64, available_kg: f64 },
    #[snafu(display("invalid fuel tank `{serial_number}`: {msg}"))]
    InvalidTank { serial_number: String, msg: String },
    #[snafu(display("invalid engine `{serial_number}`: {msg}"))]
    InvalidEngine { serial_number: String, msg: String },
    #[snafu(display("no engine with serial number `{serial_number}`"))]
    UnknownEngine { serial_number: String },
    #[snafu(display("no fuel tank with serial number `{serial_number}`"))]
    UnknownTank { serial_number: String },
}

/// A propellant reservoir.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FuelTank {
    pub name: String,
    pub model: String,
    pub serial_number: String,
    pub capacity_kg: f64,
    pub initial_quantity_kg: f64,
    pub quantity_kg: f64,
}

impl FuelTank {
    /// Builds a new fuel tank, ensuring that the capacity is positive and that the initial quantity is positive and fits in the tank.
    pub fn new(
        name: &str,
        model: &str,
        serial_number: &str,
        capacity_kg: f64,
        quantity_kg: f64,
    ) -> Result<Self, PropulsionError> {
        let invalid = |msg: &str| PropulsionError::InvalidTank {
            serial_number: serial_number.to_string(),
            msg: msg.to_string(),
        };
        if name.is_empty() || model.is_empty() || serial_number.is_empty() {
            return Err(invalid("name, model and serial number must not be empty"));
        }
        if capacity_kg <= 0.0 {
            return Err(invalid("capacity must be strictly positive"));
        }
        if quantity_kg <= 0.0 || quantity_kg > capacity_kg {
            return Err(invalid(
                "initial quantity must be strictly positive and at most the capacity",
            ));
        }
        Ok(Self {
            name: name.to_string(),
            model: model.to_string(),
            serial_number: serial_number.to_string(),
            capacity_kg,
            initial_quantity_kg: quantity_kg,
            quantity_kg,
        })
    }

    /// Removes the provided mass of propellant from this tank
    pub fn burn(&mut self, mass_kg: f64) -> Result<(), PropulsionError> {
        ensure!(
            mass_kg <= self.quantity_kg,
            InsufficientPropellantSnafu {
                requested_kg: mass_kg,
                available_kg: self.quantity_kg
            }
        );
        self.quantity_kg -= mass_kg;
        Ok(())
    }

    /// Refills the tank to its initial quantity
    pub fn refuel(&mut self) {
        self.quantity_kg = self.initial_quantity_kg;
    }
}

/// A chemical engine fed by a single fuel tank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub name: String,
    pub model: String,
    pub serial_number: String,
    /// Specific impulse in seconds
    pub isp_s: f64,
    /// Propellant mass flow in kg/s
    pub fuel_flow_kg_s: f64,
    /// Serial number of the fuel tank feeding this engine
    pub fuel_tank: String,
}

impl Engine {
    pub fn new(
        name: &str,
        model: &str,
        serial_number: &str,
        isp_s: f64,
        fuel_flow_kg_s: f64,
        fuel_tank: &str,
    ) -> Result<Self, PropulsionError> {
        let invalid = |msg: &str| PropulsionError::InvalidEngine {
            serial_number: serial_number.to_string(),
            msg: msg.to_string(),
        };
        if name.is_empty() || model.is_empty() || serial_number.is_empty() {
            return Err(invalid("name, model and serial number must not be empty"));
        }
        if isp_s <= 0.0 {
            return Err(invalid("ISP must be strictly positive"));
        }
        if fuel_flow_kg_s <= 0.0 {
            return Err(invalid("fuel flow must be strictly positive"));
        }
        Ok(Self {
            name: name.to_string(),
            model: model.to_string(),
            serial_number: serial_number.to_string(),
            isp_s,
            fuel_flow_kg_s,
            fuel_tank: fuel_tank.to_string(),
        })
    }

    /// Returns the exhaust velocity v_e in meters per second
    pub fn exhaust_velocity_m_s(&self) -> f64 {
        self.isp_s * STD_GRAVITY
    }

    /// Returns the thrust in Newtons
    #[allow(non_snake_case)]
    pub fn thrust_N(&self) -> f64 {
        self.fuel_flow_kg_s * self.exhaust_velocity_m_s()
    }

    /// Returns the propellant mass needed to change the velocity by `delta_v_km_s` (Tsiolkovsky).
    pub fn fuel_burned_kg(&self, delta_v_km_s: f64, initial_mass_kg: f64) -> f64 {
        initial_mass_kg * (1.0 - (-delta_v_km_s * 1e3 / self.exhaust_velocity_m_s()).exp())
    }

    /// Returns the time needed to burn the provided mass of propellant, in seconds
    pub fn burn_duration_s(&self, fuel_kg: f64) -> f64 {
        fuel_kg / self.fuel_flow_kg_s
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({} #{}): isp = {} s, flow = {} kg/s, thrust = {:.3} N",
            self.name,
            self.model,
            self.serial_number,
            self.isp_s,
            self.fuel_flow_kg_s,
            self.thrust_N()
        )
    }
}
