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

use crate::cosmic::{Engine, FuelTank, Instrument, PropulsionError, Spacecraft};
use crate::linalg::{UnitQuaternion, Vector3};
use crate::md::Maneuver;
use crate::time::{Duration, Epoch};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use snafu::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use typed_builder::TypedBuilder;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read configuration file: {source}"))]
    ReadError { source: std::io::Error },

    #[snafu(display("failed to parse YAML configuration: {source}"))]
    ParseError { source: serde_yaml::Error },

    #[snafu(display("invalid configuration: {msg}"))]
    InvalidConfig { msg: String },
}

impl PartialEq for ConfigError {
    /// No two configuration errors match
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

impl From<PropulsionError> for ConfigError {
    fn from(e: PropulsionError) -> Self {
        Self::InvalidConfig { msg: e.to_string() }
    }
}

pub trait ConfigRepr: Debug + Sized + Serialize + DeserializeOwned {
    /// Builds the configuration representation from the path to a yaml
    fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a sequence of "Selves" from the provided path to a yaml
    fn load_many<P>(path: P) -> Result<Vec<Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a map of names to "selves" from the provided path to a yaml
    fn load_named<P>(path: P) -> Result<BTreeMap<String, Self>, ConfigError>
    where
        P: AsRef<Path>,
    {
        let file = File::open(path).context(ReadSnafu)?;
        let reader = BufReader::new(file);

        serde_yaml::from_reader(reader).context(ParseSnafu)
    }

    /// Builds a sequence of "Selves" from the provided string of a yaml
    fn loads_many(data: &str) -> Result<Vec<Self>, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }

    /// Builds "Self" from the provided string of a yaml
    fn loads(data: &str) -> Result<Self, ConfigError> {
        debug!("Loading YAML:\n{data}");
        serde_yaml::from_str(data).context(ParseSnafu)
    }

    /// Serializes self into a yaml string
    fn dumps(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).context(ParseSnafu)
    }
}

/// Trait to specify that a structure can be configured from a file, through a serializable intermediate representation.
pub trait Configurable
where
    Self: Sized,
{
    /// The intermediate representation needed to create `Self` or to serialize Self.
    type IntermediateRepr: ConfigRepr;

    fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_config(Self::IntermediateRepr::load(path)?)
    }

    /// Creates a new instance of `self` from the configuration.
    fn from_config(cfg: Self::IntermediateRepr) -> Result<Self, ConfigError>
    where
        Self: Sized;

    /// Converts self into the intermediate representation which is serializable.
    fn to_config(&self) -> Result<Self::IntermediateRepr, ConfigError>;
}

pub(crate) fn epoch_to_str<S>(epoch: &Epoch, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{epoch}"))
}

/// A deserializer from Epoch string
pub(crate) fn epoch_from_str<'de, D>(deserializer: D) -> Result<Epoch, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Epoch::from_str(&s).map_err(serde::de::Error::custom)
}

pub(crate) fn duration_to_str<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format!("{duration}"))
}

/// A deserializer from Duration string
pub(crate) fn duration_from_str<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Duration::from_str(&s).map_err(serde::de::Error::custom)
}

/// Specification of a fuel tank, initially filled to `quantity_kg`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct FuelTankConfig {
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub model: String,
    #[builder(setter(into))]
    pub serial_number: String,
    pub capacity_kg: f64,
    pub quantity_kg: f64,
}

impl ConfigRepr for FuelTankConfig {}

impl TryFrom<&FuelTankConfig> for FuelTank {
    type Error = PropulsionError;

    fn try_from(cfg: &FuelTankConfig) -> Result<Self, Self::Error> {
        FuelTank::new(
            &cfg.name,
            &cfg.model,
            &cfg.serial_number,
            cfg.capacity_kg,
            cfg.quantity_kg,
        )
    }
}

impl From<&FuelTank> for FuelTankConfig {
    fn from(tank: &FuelTank) -> Self {
        Self {
            name: tank.name.clone(),
            model: tank.model.clone(),
            serial_number: tank.serial_number.clone(),
            capacity_kg: tank.capacity_kg,
            quantity_kg: tank.quantity_kg,
        }
    }
}

/// Specification of an engine, fed by the tank of serial number `fuel_tank`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct EngineConfig {
    #[builder(setter(into))]
    pub name: String,
    #[builder(setter(into))]
    pub model: String,
    #[builder(setter(into))]
    pub serial_number: String,
    pub isp_s: f64,
    pub fuel_flow_kg_s: f64,
    #[builder(setter(into))]
    pub fuel_tank: String,
}

impl ConfigRepr for EngineConfig {}

impl TryFrom<&EngineConfig> for Engine {
    type Error = PropulsionError;

    fn try_from(cfg: &EngineConfig) -> Result<Self, Self::Error> {
        Engine::new(
            &cfg.name,
            &cfg.model,
            &cfg.serial_number,
            cfg.isp_s,
            cfg.fuel_flow_kg_s,
            &cfg.fuel_tank,
        )
    }
}

impl From<&Engine> for EngineConfig {
    fn from(engine: &Engine) -> Self {
        Self {
            name: engine.name.clone(),
            model: engine.model.clone(),
            serial_number: engine.serial_number.clone(),
            isp_s: engine.isp_s,
            fuel_flow_kg_s: engine.fuel_flow_kg_s,
            fuel_tank: engine.fuel_tank.clone(),
        }
    }
}

/// Specification of an instrument: its boresight in the instrument frame, and the roll, pitch and yaw (in degrees)
/// of the instrument frame with respect to the spacecraft body frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct InstrumentConfig {
    #[builder(setter(into))]
    pub name: String,
    pub boresight: [f64; 3],
    #[serde(default)]
    #[builder(default)]
    pub roll_pitch_yaw_deg: [f64; 3],
    /// Reference vector in the instrument frame, needed to fully constrain an attitude from this instrument alone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub ref_vector: Option<[f64; 3]>,
}

impl ConfigRepr for InstrumentConfig {}

impl TryFrom<&InstrumentConfig> for Instrument {
    type Error = ConfigError;

    fn try_from(cfg: &InstrumentConfig) -> Result<Self, Self::Error> {
        let boresight = Vector3::from(cfg.boresight);
        ensure!(
            boresight.norm() > f64::EPSILON,
            InvalidConfigSnafu {
                msg: format!("boresight of instrument `{}` is a zero vector", cfg.name)
            }
        );
        let [roll, pitch, yaw] = cfg.roll_pitch_yaw_deg;
        let orientation = UnitQuaternion::from_euler_angles(
            roll.to_radians(),
            pitch.to_radians(),
            yaw.to_radians(),
        );
        let instrument = Instrument::new(&cfg.name, boresight, orientation);
        match cfg.ref_vector.map(Vector3::from) {
            Some(ref_vector) => {
                ensure!(
                    ref_vector.norm() > f64::EPSILON,
                    InvalidConfigSnafu {
                        msg: format!("reference vector of instrument `{}` is a zero vector", cfg.name)
                    }
                );
                Ok(instrument.with_ref_vector(ref_vector))
            }
            None => Ok(instrument),
        }
    }
}

impl From<&Instrument> for InstrumentConfig {
    fn from(instrument: &Instrument) -> Self {
        let (roll, pitch, yaw) = instrument.orientation.euler_angles();
        Self {
            name: instrument.name.clone(),
            boresight: instrument.boresight.into(),
            roll_pitch_yaw_deg: [roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees()],
            ref_vector: instrument.ref_vector.map(Into::into),
        }
    }
}

/// Configuration of a spacecraft and of its propulsion and instruments.
///
/// ```yaml
/// name: demo
/// dry_mass_kg: 1000.0
/// max_operating_mass_kg: 3000.0
/// fuel_tanks:
///   - name: tank
///     model: model
///     serial_number: tank-1
///     capacity_kg: 2000.0
///     quantity_kg: 1900.0
/// engines:
///   - name: main
///     model: model
///     serial_number: eng-1
///     isp_s: 450.0
///     fuel_flow_kg_s: 50.0
///     fuel_tank: tank-1
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[builder(doc)]
pub struct SpacecraftConfig {
    #[builder(setter(into))]
    pub name: String,
    pub dry_mass_kg: f64,
    pub max_operating_mass_kg: f64,
    #[serde(default)]
    #[builder(default)]
    pub fuel_tanks: Vec<FuelTankConfig>,
    #[serde(default)]
    #[builder(default)]
    pub engines: Vec<EngineConfig>,
    #[serde(default)]
    #[builder(default)]
    pub instruments: Vec<InstrumentConfig>,
}

impl ConfigRepr for SpacecraftConfig {}

impl Configurable for Spacecraft {
    type IntermediateRepr = SpacecraftConfig;

    fn from_config(cfg: Self::IntermediateRepr) -> Result<Self, ConfigError> {
        ensure!(
            cfg.dry_mass_kg > 0.0,
            InvalidConfigSnafu {
                msg: format!("dry mass of `{}` must be strictly positive", cfg.name)
            }
        );
        ensure!(
            cfg.max_operating_mass_kg >= cfg.dry_mass_kg,
            InvalidConfigSnafu {
                msg: format!(
                    "maximum operating mass of `{}` is less than its dry mass",
                    cfg.name
                )
            }
        );

        let mut sc = Spacecraft::new(&cfg.name, cfg.dry_mass_kg, cfg.max_operating_mass_kg);
        for tank in &cfg.fuel_tanks {
            ensure!(
                sc.fuel_tank(&tank.serial_number).is_err(),
                InvalidConfigSnafu {
                    msg: format!("duplicate fuel tank serial number `{}`", tank.serial_number)
                }
            );
            sc = sc.with_fuel_tank(tank.try_into()?);
        }
        for engine in &cfg.engines {
            ensure!(
                !sc.engines
                    .iter()
                    .any(|e| e.serial_number == engine.serial_number),
                InvalidConfigSnafu {
                    msg: format!("duplicate engine serial number `{}`", engine.serial_number)
                }
            );
            sc = sc.with_engine(engine.try_into()?)?;
        }
        for instrument in &cfg.instruments {
            sc = sc.with_instrument(instrument.try_into()?);
        }

        Ok(sc)
    }

    fn to_config(&self) -> Result<Self::IntermediateRepr, ConfigError> {
        Ok(SpacecraftConfig {
            name: self.name.clone(),
            dry_mass_kg: self.dry_mass_kg,
            max_operating_mass_kg: self.max_operating_mass_kg,
            fuel_tanks: self.fuel_tanks.iter().map(FuelTankConfig::from).collect(),
            engines: self.engines.iter().map(EngineConfig::from).collect(),
            instruments: self
                .instruments
                .iter()
                .map(InstrumentConfig::from)
                .collect(),
        })
    }
}

/// Record of an executed maneuver, as exchanged with operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManeuverRecord {
    /// Description of the maneuver
    pub maneuver: String,
    /// Epoch at which the maneuver fired
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub epoch: Epoch,
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub thrust_start: Epoch,
    #[serde(
        serialize_with = "duration_to_str",
        deserialize_with = "duration_from_str"
    )]
    pub thrust_duration: Duration,
    /// Delta-v components in the maneuver frame, in km/s
    pub delta_v_km_s: [f64; 3],
    pub fuel_burned_kg: f64,
    /// Serial number of the engine
    pub engine: String,
}

impl ManeuverRecord {
    /// Builds the record of an executed maneuver. Attitude maneuvers are recorded with a zero delta-v.
    pub fn from_maneuver(mnvr: &Maneuver) -> Result<Self, ConfigError> {
        let (Some(epoch), Some(thrust)) = (mnvr.executed_epoch, mnvr.thrust_window) else {
            return Err(ConfigError::InvalidConfig {
                msg: format!("cannot record {}: it has not been executed", mnvr.kind),
            });
        };

        Ok(Self {
            maneuver: format!("{}", mnvr.kind),
            epoch,
            thrust_start: thrust.start,
            thrust_duration: thrust.duration(),
            delta_v_km_s: mnvr.delta_v_km_s.unwrap_or_else(Vector3::zeros).into(),
            fuel_burned_kg: mnvr.fuel_burned_kg,
            engine: mnvr.engine.clone(),
        })
    }

    /// Norm of the delta-v in km/s
    pub fn delta_v_norm_km_s(&self) -> f64 {
        Vector3::from(self.delta_v_km_s).norm()
    }
}

impl ConfigRepr for ManeuverRecord {}
