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

use super::{AstroError, Bodies, Frame, FrameOrientation, Orbit, Orientation, EARTH_ECLIPJ2000};
use crate::linalg::Vector3;
use crate::time::Epoch;
use std::fmt;

/// An ephemeris provides the relative states of celestial bodies and the rotations between frame orientations.
pub trait Ephemeris: Send + Sync + fmt::Debug {
    /// Returns the state of the center of `target` relative to the center of the `observer` frame,
    /// expressed in the orientation of the `observer` frame.
    fn translate(&self, target: Bodies, epoch: Epoch, observer: Frame) -> Result<Orbit, AstroError>;

    /// Returns the orientation which rotates vectors expressed in `from` into `to`.
    fn rotate(&self, epoch: Epoch, from: Frame, to: Frame) -> Result<Orientation, AstroError> {
        Ok(Orientation::from_dcm(
            from.orientation.dcm_to(to.orientation),
            epoch,
            to,
        ))
    }

    /// Transforms the provided state into another frame, changing both the center and the orientation as needed.
    fn transform_to(&self, state: &Orbit, frame: Frame) -> Result<Orbit, AstroError> {
        if state.frame.ephem_origin_match(frame) && state.frame.orient_origin_match(frame) {
            let mut local = *state;
            local.frame = frame;
            return Ok(local);
        }
        let rotation = self.rotate(state.epoch, state.frame, frame)?;
        let mut radius = rotation.q * state.radius();
        let mut velocity = rotation.q * state.velocity();
        if !state.frame.ephem_origin_match(frame) {
            let offset = self.translate(state.frame.center, state.epoch, frame)?;
            radius += offset.radius();
            velocity += offset.velocity();
        }
        Ok(Orbit::from_vectors(&radius, &velocity, state.epoch, frame))
    }
}

/// An ephemeris which only supports a single center: any change of center is an error.
#[derive(Copy, Clone, Debug, Default)]
pub struct LocalOnly;

impl Ephemeris for LocalOnly {
    fn translate(&self, target: Bodies, epoch: Epoch, observer: Frame) -> Result<Orbit, AstroError> {
        if target == observer.center {
            Ok(Orbit::from_vectors(
                &Vector3::zeros(),
                &Vector3::zeros(),
                epoch,
                observer,
            ))
        } else {
            Err(AstroError::EphemerisUnavailable {
                target,
                observer: observer.center,
            })
        }
    }
}

/// An ephemeris where each body follows a two body orbit about its parent body.
///
/// Each orbit is defined relative to the center of its frame, which is the parent of that body.
#[derive(Clone, Debug, Default)]
pub struct KeplerianEphemeris {
    orbits: Vec<(Bodies, Orbit)>,
}

impl KeplerianEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the orbit of the provided body about the center of the frame of that orbit.
    pub fn with_body(mut self, body: Bodies, orbit: Orbit) -> Self {
        self.orbits.retain(|(known, _)| *known != body);
        self.orbits.push((body, orbit));
        self
    }

    /// Builds the Sun, Earth and Moon system from mean elements at J2000, with the Earth about the Sun and the Moon about the Earth.
    pub fn earth_moon_sun() -> Result<Self, AstroError> {
        let epoch = Epoch::from_gregorian_tai_at_noon(2000, 1, 1);
        let sun_eclip = Frame::new(Bodies::Sun, FrameOrientation::EclipticJ2000);
        let earth = Orbit::keplerian_mean_anomaly(
            149_598_023.0,
            0.016_708_6,
            0.0,
            0.0,
            102.947_19,
            357.517_16,
            epoch,
            sun_eclip,
        )?;
        let moon = Orbit::keplerian_mean_anomaly(
            384_399.0, 0.054_9, 5.145, 125.08, 318.15, 135.27, epoch, EARTH_ECLIPJ2000,
        )?;
        Ok(Self::new()
            .with_body(Bodies::Earth, earth)
            .with_body(Bodies::Luna, moon))
    }

    /// Returns the state of the body relative to the root of its chain of parents, in J2000 orientation.
    fn state_wrt_root(
        &self,
        body: Bodies,
        epoch: Epoch,
    ) -> Result<(Bodies, Vector3<f64>, Vector3<f64>), AstroError> {
        let mut radius = Vector3::zeros();
        let mut velocity = Vector3::zeros();
        let mut current = body;
        // Each step climbs one parent, a longer chain would be a cycle
        for _ in 0..=self.orbits.len() {
            match self.orbits.iter().find(|(known, _)| *known == current) {
                Some((_, orbit)) => {
                    let at_epoch = orbit.at_epoch(epoch)?;
                    let dcm = orbit.frame.orientation.dcm_to(FrameOrientation::J2000);
                    radius += dcm * at_epoch.radius();
                    velocity += dcm * at_epoch.velocity();
                    current = orbit.frame.center;
                }
                None => return Ok((current, radius, velocity)),
            }
        }
        Err(AstroError::EphemerisUnavailable {
            target: body,
            observer: current,
        })
    }
}

impl Ephemeris for KeplerianEphemeris {
    fn translate(&self, target: Bodies, epoch: Epoch, observer: Frame) -> Result<Orbit, AstroError> {
        let (target_root, target_r, target_v) = self.state_wrt_root(target, epoch)?;
        let (observer_root, observer_r, observer_v) = self.state_wrt_root(observer.center, epoch)?;
        if target_root != observer_root {
            return Err(AstroError::EphemerisUnavailable {
                target,
                observer: observer.center,
            });
        }
        let dcm = FrameOrientation::J2000.dcm_to(observer.orientation);
        Ok(Orbit::from_vectors(
            &(dcm * (target_r - observer_r)),
            &(dcm * (target_v - observer_v)),
            epoch,
            observer,
        ))
    }
}
