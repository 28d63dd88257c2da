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

use super::predicate::PredicateState;
use super::{
    astro_err, AttitudeManeuver, ImpulsiveManeuver, ManeuverError, ManeuverHandle, Window,
};
use crate::cosmic::{AstroError, BodyAxis, Ephemeris, Frame, Orbit, Orientation, Vehicle};
use crate::linalg::{UnitQuaternion, Vector3};
use crate::time::{Duration, Epoch};
use crate::utils::rotation_between;
use std::fmt;
use std::sync::Arc;

/// Fraction of the thrust duration which precedes the nominal maneuver epoch
pub const THRUST_LEAD_FRACTION: f64 = 0.666;

#[derive(Clone, Debug, PartialEq)]
pub enum ManeuverKind {
    Impulsive(ImpulsiveManeuver),
    Attitude(AttitudeManeuver),
}

impl fmt::Display for ManeuverKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Impulsive(mnvr) => write!(f, "{mnvr}"),
            Self::Attitude(mnvr) => write!(f, "{mnvr}"),
        }
    }
}

/// A maneuver of a plan: its static configuration and what its last execution computed.
#[derive(Clone, Debug, PartialEq)]
pub struct Maneuver {
    /// Frame of the central body of this maneuver, in which its geometry is evaluated
    pub frame: Frame,
    /// The maneuver may not fire before this epoch
    pub min_epoch: Epoch,
    /// How long the attitude is held after the maneuver starts
    pub hold: Duration,
    /// Serial number of the engine used by this maneuver
    pub engine: String,
    pub kind: ManeuverKind,
    pub next: Option<ManeuverHandle>,
    /// Epoch of the state at which the maneuver fired
    pub executed_epoch: Option<Epoch>,
    pub thrust_window: Option<Window>,
    pub maneuver_window: Option<Window>,
    pub fuel_burned_kg: f64,
    /// ΔV of the last execution, in km/s in the maneuver frame
    pub delta_v_km_s: Option<Vector3<f64>>,
    pub orientation: Option<Orientation>,
    configured_hold: Duration,
    predicate: PredicateState,
}

impl Maneuver {
    fn new(frame: Frame, min_epoch: Epoch, hold: Duration, engine: &str, kind: ManeuverKind) -> Self {
        Self {
            frame,
            min_epoch,
            hold,
            engine: engine.to_string(),
            kind,
            next: None,
            executed_epoch: None,
            thrust_window: None,
            maneuver_window: None,
            fuel_burned_kg: 0.0,
            delta_v_km_s: None,
            orientation: None,
            configured_hold: hold,
            predicate: PredicateState::default(),
        }
    }

    /// Builds an impulsive maneuver about the center of `frame`.
    ///
    /// The target orbit of the maneuver, if any, must be expressed in that same frame.
    pub fn impulsive(
        frame: Frame,
        min_epoch: Epoch,
        hold: Duration,
        engine: &str,
        mnvr: ImpulsiveManeuver,
    ) -> Result<Self, ManeuverError> {
        frame
            .mu_km3_s2()
            .map_err(astro_err("impulsive maneuver frame"))?;
        if let Some(target) = mnvr.target() {
            if target.frame != frame {
                return Err(ManeuverError::ManeuverAstro {
                    action: "impulsive maneuver target",
                    source: AstroError::FrameMismatch {
                        action: "impulsive maneuver target",
                        frame1: frame,
                        frame2: target.frame,
                    },
                });
            }
        }
        Ok(Self::new(
            frame,
            min_epoch,
            hold,
            engine,
            ManeuverKind::Impulsive(mnvr),
        ))
    }

    /// Builds an impulsive maneuver around the frame of its target orbit.
    pub fn impulsive_toward(
        min_epoch: Epoch,
        hold: Duration,
        engine: &str,
        mnvr: ImpulsiveManeuver,
    ) -> Result<Self, ManeuverError> {
        let frame = mnvr
            .target()
            .map(|target| target.frame)
            .ok_or_else(|| ManeuverError::InvalidTarget {
                msg: format!("{mnvr} has no target orbit"),
            })?;
        Self::impulsive(frame, min_epoch, hold, engine, mnvr)
    }

    pub fn attitude(
        frame: Frame,
        min_epoch: Epoch,
        hold: Duration,
        engine: &str,
        mnvr: AttitudeManeuver,
    ) -> Self {
        Self::new(frame, min_epoch, hold, engine, ManeuverKind::Attitude(mnvr))
    }

    /// Whether this maneuver has executed since the last reset
    pub fn is_executed(&self) -> bool {
        self.maneuver_window.is_some()
    }

    /// Crossing detector state, as of the last evaluation
    pub fn predicate(&self) -> PredicateState {
        self.predicate
    }

    fn reset(&mut self) {
        self.predicate = PredicateState::default();
        self.executed_epoch = None;
        self.thrust_window = None;
        self.maneuver_window = None;
        self.fuel_burned_kg = 0.0;
        self.delta_v_km_s = None;
        self.orientation = None;
        self.hold = self.configured_hold;
        if let ManeuverKind::Impulsive(mnvr) = &mut self.kind {
            mnvr.reset();
        }
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} about {} (engine {})", self.kind, self.frame, self.engine)?;
        if let Some(window) = self.maneuver_window {
            write!(f, " executed in {window}")?;
        }
        Ok(())
    }
}

/// What an execution produces: the state after the maneuver and the attitude of the vehicle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ManeuverOutcome {
    pub state: Orbit,
    /// ΔV applied in the frame of the state, None for attitude maneuvers
    pub delta_v_km_s: Option<Vector3<f64>>,
    pub orientation: Orientation,
}

/// An arena of maneuvers, chained through their `next` handle.
///
/// The caller drives a chain by offering successive states in increasing epoch order: `can_execute` tells whether
/// the maneuver point was just passed and `try_execute` performs the maneuver and arms its successor.
#[derive(Clone, Debug)]
pub struct ManeuverPlan {
    maneuvers: Vec<Maneuver>,
    ephem: Arc<dyn Ephemeris>,
}

impl ManeuverPlan {
    pub fn new(ephem: Arc<dyn Ephemeris>) -> Self {
        Self {
            maneuvers: Vec::new(),
            ephem,
        }
    }

    pub fn add(&mut self, maneuver: Maneuver) -> ManeuverHandle {
        self.maneuvers.push(maneuver);
        ManeuverHandle(self.maneuvers.len() - 1)
    }

    /// Sets the successor of `handle` and returns that successor, allowing chains to be built fluently.
    pub fn set_next(
        &mut self,
        handle: ManeuverHandle,
        next: ManeuverHandle,
    ) -> Result<ManeuverHandle, ManeuverError> {
        self.get(next)?;
        self.get_mut(handle)?.next = Some(next);
        Ok(next)
    }

    pub fn get(&self, handle: ManeuverHandle) -> Result<&Maneuver, ManeuverError> {
        self.maneuvers
            .get(handle.0)
            .ok_or(ManeuverError::UnknownHandle { handle })
    }

    fn get_mut(&mut self, handle: ManeuverHandle) -> Result<&mut Maneuver, ManeuverError> {
        self.maneuvers
            .get_mut(handle.0)
            .ok_or(ManeuverError::UnknownHandle { handle })
    }

    pub fn len(&self) -> usize {
        self.maneuvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maneuvers.is_empty()
    }

    /// Returns the handles of the chain starting at `head`, stopping if the chain loops back.
    pub fn chain(&self, head: ManeuverHandle) -> Result<Vec<ManeuverHandle>, ManeuverError> {
        let mut handles = Vec::new();
        let mut cur = Some(head);
        while let Some(handle) = cur {
            if handles.contains(&handle) {
                warn!("maneuver chain loops back to {handle}");
                break;
            }
            cur = self.get(handle)?.next;
            handles.push(handle);
        }
        Ok(handles)
    }

    /// Returns whether the maneuver may fire at the provided state.
    ///
    /// This is the only place where the crossing detector of the maneuver advances.
    pub fn can_execute(
        &mut self,
        handle: ManeuverHandle,
        state: &Orbit,
    ) -> Result<bool, ManeuverError> {
        let mnvr = self
            .maneuvers
            .get_mut(handle.0)
            .ok_or(ManeuverError::UnknownHandle { handle })?;
        let local = self
            .ephem
            .transform_to(state, mnvr.frame)
            .map_err(astro_err("transformation into the maneuver frame"))?;
        if local.epoch < mnvr.min_epoch {
            return Ok(false);
        }
        let point = match &mut mnvr.kind {
            ManeuverKind::Impulsive(imp) => {
                if let Some(decision) = imp.precondition(&local)? {
                    return Ok(decision);
                }
                imp.maneuver_point(&local)?
            }
            // Attitudes apply wherever the spacecraft is
            ManeuverKind::Attitude(_) => local.radius(),
        };
        let (predicate, fire) = mnvr
            .predicate
            .transition(&local.radius(), &point, &local.hvec());
        mnvr.predicate = predicate;
        Ok(fire)
    }

    /// Executes the maneuver at the provided state, on the provided vehicle, and arms the next maneuver of the chain.
    pub fn try_execute<V: Vehicle + ?Sized>(
        &mut self,
        handle: ManeuverHandle,
        state: &Orbit,
        vehicle: &mut V,
    ) -> Result<ManeuverOutcome, ManeuverError> {
        let ephem = self.ephem.clone();
        let mnvr = self.get_mut(handle)?;
        let local = ephem
            .transform_to(state, mnvr.frame)
            .map_err(astro_err("transformation into the maneuver frame"))?;
        let to_state = ephem
            .rotate(state.epoch, mnvr.frame, state.frame)
            .map_err(astro_err("rotation into the state frame"))?;

        let (outcome, window) = match &mnvr.kind {
            ManeuverKind::Impulsive(imp) => {
                let (delta_v, new_hold) = imp.delta_v(&local)?;
                let fuel_kg = vehicle.ignite(&mnvr.engine, delta_v.norm())?;
                if let Some(hold) = new_hold {
                    mnvr.hold = hold;
                }
                let thrust_s = vehicle.engine(&mnvr.engine)?.burn_duration_s(fuel_kg);
                let thrust_duration = Duration::from_seconds(thrust_s);
                let thrust_window = Window::new(
                    state.epoch - thrust_duration * THRUST_LEAD_FRACTION,
                    thrust_duration,
                );
                let window = Window::new(thrust_window.start, mnvr.hold).merge(&thrust_window);
                mnvr.thrust_window = Some(thrust_window);
                mnvr.fuel_burned_kg = fuel_kg;
                mnvr.delta_v_km_s = Some(delta_v);

                let delta_v_state = to_state.rotate_vector(&delta_v);
                let q = rotation_between(&BodyAxis::Front.vector(), &delta_v_state)
                    .unwrap_or_else(UnitQuaternion::identity);
                let outcome = ManeuverOutcome {
                    state: state.with_dv_km_s(delta_v_state),
                    delta_v_km_s: Some(delta_v_state),
                    orientation: Orientation::new(q, state.epoch, state.frame),
                };
                (outcome, window)
            }
            ManeuverKind::Attitude(att) => {
                let q_local = att.attitude(&local, &*vehicle, ephem.as_ref())?;
                mnvr.thrust_window = Some(Window::new(state.epoch, Duration::ZERO));
                mnvr.fuel_burned_kg = 0.0;
                let outcome = ManeuverOutcome {
                    state: *state,
                    delta_v_km_s: None,
                    orientation: Orientation::new(to_state.q * q_local, state.epoch, state.frame),
                };
                (outcome, Window::new(state.epoch, mnvr.hold))
            }
        };
        mnvr.executed_epoch = Some(state.epoch);
        mnvr.maneuver_window = Some(window);
        mnvr.orientation = Some(outcome.orientation);

        info!(
            "{handle} executed at {}: {} ({:.6} kg of propellant, window {window})",
            state.epoch, mnvr.kind, mnvr.fuel_burned_kg
        );
        vehicle.arm_standby_maneuver(mnvr.next, window.end);
        vehicle.maneuver_executed(handle);
        Ok(outcome)
    }

    /// Clears everything computed by the executions of `head` and of its successors.
    pub fn reset(&mut self, head: ManeuverHandle) -> Result<(), ManeuverError> {
        for handle in self.chain(head)? {
            self.get_mut(handle)?.reset();
        }
        Ok(())
    }
}
