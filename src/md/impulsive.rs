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

use super::{astro_err, ManeuverError};
use crate::cosmic::Orbit;
use crate::linalg::Vector3;
use crate::time::Duration;
use crate::utils::{angle_difference, rotate_about, signed_angle};
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;

/// The combined maneuver only fires when the line of apsides is this close to the line of nodes (absolute cosine).
pub const COMBINED_APSIDES_NODES_MIN_COS: f64 = 0.9;
/// Fraction of the phasing transfer time used as the hold of the phasing maneuver
pub const PHASING_HOLD_FRACTION: f64 = 0.9;

/// Which node of the line of intersection between two orbital planes a plane alignment fires at
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCrossing {
    Ascending,
    Descending,
}

/// The catalog of impulsive maneuvers.
#[derive(Clone, Debug, PartialEq)]
pub enum ImpulsiveManeuver {
    /// Changes the apoapsis radius by burning at periapsis
    ApogeeHeight { target_apoapsis_km: f64 },
    /// Changes the periapsis radius by burning at apoapsis
    PerigeeHeight { target_periapsis_km: f64 },
    /// Changes the periapsis radius and the inclination in a single burn at apoapsis
    Combined {
        target_periapsis_km: f64,
        target_inc_deg: f64,
    },
    /// Catches up with (or waits for) the target on the same orbit, over a number of revolutions of a transfer orbit
    Phasing { target: Orbit, revolutions: u32 },
    /// Rotates the orbital plane onto the plane of the target
    PlaneAlignment {
        target: Orbit,
        /// Node detected on the first evaluation of the maneuver point
        node: Option<NodeCrossing>,
    },
    /// Rotates the line of apsides onto that of the target, at an intersection of both orbits
    ApsidalAlignment { target: Orbit },
}

impl ImpulsiveManeuver {
    pub fn apogee_height(target_apoapsis_km: f64) -> Self {
        Self::ApogeeHeight { target_apoapsis_km }
    }

    pub fn perigee_height(target_periapsis_km: f64) -> Self {
        Self::PerigeeHeight {
            target_periapsis_km,
        }
    }

    pub fn combined(target_periapsis_km: f64, target_inc_deg: f64) -> Self {
        Self::Combined {
            target_periapsis_km,
            target_inc_deg,
        }
    }

    pub fn phasing(target: Orbit, revolutions: u32) -> Self {
        Self::Phasing {
            target,
            revolutions,
        }
    }

    pub fn plane_alignment(target: Orbit) -> Self {
        Self::PlaneAlignment { target, node: None }
    }

    pub fn apsidal_alignment(target: Orbit) -> Self {
        Self::ApsidalAlignment { target }
    }

    /// Returns the target orbit, if this maneuver has one
    pub fn target(&self) -> Option<&Orbit> {
        match self {
            Self::Phasing { target, .. }
            | Self::PlaneAlignment { target, .. }
            | Self::ApsidalAlignment { target } => Some(target),
            _ => None,
        }
    }

    /// Decides whether the maneuver may fire without looking at the maneuver point.
    ///
    /// Returns `Some(false)` when the combined maneuver is not on the line of nodes, and `Some(true)` when
    /// the phasing maneuver is on a circular orbit (any point is a periapsis).
    pub(crate) fn precondition(&self, local: &Orbit) -> Result<Option<bool>, ManeuverError> {
        match self {
            Self::Combined { .. } => {
                let an = local
                    .ascending_node_vector()
                    .map_err(astro_err("ascending node"))?;
                let apo = local.apoapsis_vector().map_err(astro_err("apoapsis"))?;
                if an.dot(&apo.normalize()).abs() < COMBINED_APSIDES_NODES_MIN_COS {
                    Ok(Some(false))
                } else {
                    Ok(None)
                }
            }
            Self::Phasing { .. } => {
                if local.is_circular().map_err(astro_err("eccentricity"))? {
                    Ok(Some(true))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    /// Returns the position at which this maneuver fires.
    ///
    /// The plane alignment remembers the node it detected first.
    pub(crate) fn maneuver_point(&mut self, local: &Orbit) -> Result<Vector3<f64>, ManeuverError> {
        match self {
            Self::ApogeeHeight { .. } | Self::Phasing { .. } => {
                local.periapsis_vector().map_err(astro_err("periapsis"))
            }
            Self::PerigeeHeight { .. } | Self::Combined { .. } => {
                local.apoapsis_vector().map_err(astro_err("apoapsis"))
            }
            Self::PlaneAlignment { target, node } => {
                let an = line_of_nodes(local, target)?;
                match node {
                    Some(NodeCrossing::Ascending) => Ok(an),
                    Some(NodeCrossing::Descending) => Ok(-an),
                    None => {
                        if signed_angle(&local.radius(), &an, &local.hvec()) > 0.0 {
                            *node = Some(NodeCrossing::Ascending);
                            Ok(an)
                        } else {
                            *node = Some(NodeCrossing::Descending);
                            Ok(-an)
                        }
                    }
                }
            }
            Self::ApsidalAlignment { target } => {
                let (ta_rad, _) = apsidal_intersection(local, target)?;
                Ok(local
                    .at_true_anomaly(ta_rad)
                    .map_err(astro_err("apsidal intersection point"))?
                    .radius())
            }
        }
    }

    /// Computes the ΔV in km/s to apply at the provided state, and the new hold of the maneuver if it changes.
    pub(crate) fn delta_v(
        &self,
        local: &Orbit,
    ) -> Result<(Vector3<f64>, Option<Duration>), ManeuverError> {
        let mu = local
            .frame
            .mu_km3_s2()
            .map_err(astro_err("gravitational parameter"))?;
        match self {
            Self::ApogeeHeight { target_apoapsis_km } => {
                let rp = local.periapsis_km().map_err(astro_err("periapsis"))?;
                let vf = vis_viva(mu, rp, (rp + target_apoapsis_km) / 2.0);
                Ok((local.v_hat() * (vf - local.vmag_km_s()), None))
            }
            Self::PerigeeHeight {
                target_periapsis_km,
            } => {
                let ra = local.apoapsis_km().map_err(astro_err("apoapsis"))?;
                let vf = vis_viva(mu, ra, (ra + target_periapsis_km) / 2.0);
                Ok((local.v_hat() * (vf - local.vmag_km_s()), None))
            }
            Self::Combined {
                target_periapsis_km,
                target_inc_deg,
            } => {
                let ra = local.apoapsis_km().map_err(astro_err("apoapsis"))?;
                let mut aop_deg = local.aop_deg().map_err(astro_err("argument of periapsis"))?;
                let (rp, ecc, ta_deg) = if *target_periapsis_km > ra {
                    // The current apoapsis becomes the new periapsis
                    aop_deg += 180.0;
                    (ra, 1.0 - 2.0 / (target_periapsis_km / ra + 1.0), 0.0)
                } else {
                    (
                        *target_periapsis_km,
                        1.0 - 2.0 / (ra / target_periapsis_km + 1.0),
                        180.0,
                    )
                };
                let raan_deg = local.raan_deg().map_err(astro_err("RAAN"))?;
                let target = Orbit::keplerian(
                    rp / (1.0 - ecc),
                    ecc,
                    *target_inc_deg,
                    raan_deg,
                    aop_deg,
                    ta_deg,
                    local.epoch,
                    local.frame,
                )
                .map_err(astro_err("combined maneuver target orbit"))?;
                Ok((target.velocity() - local.velocity(), None))
            }
            Self::Phasing {
                target,
                revolutions,
            } => {
                let (dv, transfer_period_s) = phasing(local, target, *revolutions)?;
                let hold = Duration::from_seconds(
                    transfer_period_s * f64::from(*revolutions) * PHASING_HOLD_FRACTION,
                );
                Ok((local.v_hat() * dv, Some(hold)))
            }
            Self::PlaneAlignment { target, node } => {
                let node = node.ok_or_else(|| ManeuverError::ManeuverPointUndefined {
                    maneuver: self.to_string(),
                    msg: "no node detected yet".to_string(),
                })?;
                let pos = local.radius();
                let vel = local.velocity();
                let projected = vel - pos * (vel.dot(&pos) / pos.dot(&pos));
                let inc = local
                    .inc_deg()
                    .map_err(astro_err("inclination"))?
                    .to_radians();
                let target_inc = target
                    .inc_deg()
                    .map_err(astro_err("target inclination"))?
                    .to_radians();
                let raan = local.raan_deg().map_err(astro_err("RAAN"))?.to_radians();
                let target_raan = target
                    .raan_deg()
                    .map_err(astro_err("target RAAN"))?
                    .to_radians();
                // Spherical law of cosines
                let rel_inc = (inc.cos() * target_inc.cos()
                    + inc.sin() * target_inc.sin() * (target_raan - raan).cos())
                .clamp(-1.0, 1.0)
                .acos();
                let mut angle = FRAC_PI_2 + rel_inc * 0.5;
                if node == NodeCrossing::Ascending {
                    angle = -angle;
                }
                let dv_mag = 2.0 * projected.norm() * (rel_inc * 0.5).sin();
                Ok((
                    rotate_about(&projected.normalize(), &pos, angle) * dv_mag,
                    None,
                ))
            }
            Self::ApsidalAlignment { target } => {
                let (ta_rad, theta) = apsidal_intersection(local, target)?;
                let at_target = target
                    .at_true_anomaly(ta_rad - theta)
                    .map_err(astro_err("target state at intersection"))?;
                Ok((at_target.velocity() - local.velocity(), None))
            }
        }
    }

    /// Forgets everything learned during execution
    pub(crate) fn reset(&mut self) {
        if let Self::PlaneAlignment { node, .. } = self {
            *node = None;
        }
    }
}

impl fmt::Display for ImpulsiveManeuver {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ApogeeHeight { target_apoapsis_km } => {
                write!(f, "apogee height change to {target_apoapsis_km} km")
            }
            Self::PerigeeHeight {
                target_periapsis_km,
            } => write!(f, "perigee height change to {target_periapsis_km} km"),
            Self::Combined {
                target_periapsis_km,
                target_inc_deg,
            } => write!(
                f,
                "combined change to perigee {target_periapsis_km} km and inclination {target_inc_deg} deg"
            ),
            Self::Phasing { revolutions, .. } => write!(f, "phasing over {revolutions} revolution(s)"),
            Self::PlaneAlignment { .. } => write!(f, "plane alignment"),
            Self::ApsidalAlignment { .. } => write!(f, "apsidal alignment"),
        }
    }
}

/// Speed at radius `r_km` on an orbit of semi-major axis `sma_km`
fn vis_viva(mu: f64, r_km: f64, sma_km: f64) -> f64 {
    (mu * (2.0 / r_km - 1.0 / sma_km)).sqrt()
}

/// Unit vector along the ascending node of the current plane on the target plane
fn line_of_nodes(local: &Orbit, target: &Orbit) -> Result<Vector3<f64>, ManeuverError> {
    let an = target.hvec().cross(&local.hvec());
    if an.norm() < f64::EPSILON {
        return Err(ManeuverError::ManeuverPointUndefined {
            maneuver: "plane alignment".to_string(),
            msg: "current and target orbits are coplanar".to_string(),
        });
    }
    Ok(an.normalize())
}

/// Returns the ΔV magnitude (signed along the velocity) and the period of the transfer orbit in seconds.
fn phasing(local: &Orbit, target: &Orbit, revolutions: u32) -> Result<(f64, f64), ManeuverError> {
    if revolutions == 0 {
        return Err(ManeuverError::InvalidTarget {
            msg: "phasing requires at least one revolution".to_string(),
        });
    }
    let mu = local
        .frame
        .mu_km3_s2()
        .map_err(astro_err("gravitational parameter"))?;
    let target_now = target
        .at_epoch(local.epoch)
        .map_err(astro_err("target propagation"))?;
    let delta_ta = (target_now.tlong_deg().map_err(astro_err("target true longitude"))?
        - local.tlong_deg().map_err(astro_err("true longitude"))?)
    .to_radians();
    let ecc = local.ecc().map_err(astro_err("eccentricity"))?;
    let ea = 2.0 * (((1.0 - ecc) / (1.0 + ecc)).sqrt() * (delta_ta * 0.5).tan()).atan();
    let period_s = local.period().map_err(astro_err("period"))?.to_seconds();
    let phase_s = period_s / TAU * (ea - ecc * ea.sin());
    let transfer_period_s = period_s - phase_s / f64::from(revolutions);
    let transfer_sma = (mu.sqrt() * transfer_period_s / TAU).powf(2.0 / 3.0);
    let rp = local.periapsis_km().map_err(astro_err("periapsis"))?;
    let ra = 2.0 * transfer_sma - rp;
    let transfer_h = (2.0 * mu).sqrt() * (ra * rp / (ra + rp)).sqrt();
    debug!(
        "phasing: delta true longitude {:.6} deg, transfer period {transfer_period_s:.3} s, transfer apoapsis {ra:.3} km",
        delta_ta.to_degrees()
    );
    Ok(((transfer_h - local.hmag_km2_s()) / rp, transfer_period_s))
}

/// Returns the true anomaly on the current orbit of the intersection with the target orbit closest to the
/// spacecraft, and the angle from the current periapsis to the target periapsis, both in radians.
fn apsidal_intersection(local: &Orbit, target: &Orbit) -> Result<(f64, f64), ManeuverError> {
    let hvec = local.hvec();
    let mut theta = signed_angle(
        &local.periapsis_vector().map_err(astro_err("periapsis"))?,
        &target
            .periapsis_vector()
            .map_err(astro_err("target periapsis"))?,
        &hvec,
    );
    if theta < 0.0 {
        theta += TAU;
    }
    let h1 = hvec.norm_squared();
    let h2 = target.hvec().norm_squared();
    let ecc = local.ecc().map_err(astro_err("eccentricity"))?;
    let target_ecc = target.ecc().map_err(astro_err("target eccentricity"))?;

    // Solves A cos(ta) + B sin(ta) = C
    let a = h2 * ecc - h1 * target_ecc * theta.cos();
    let b = -h1 * target_ecc * theta.sin();
    let c = h1 - h2;
    let alpha = (b / a).atan();
    let beta = (c / a * alpha.cos()).acos();
    if beta.is_nan() || alpha.is_nan() {
        return Err(ManeuverError::NoApsidalIntersection);
    }
    let wrap = |angle: f64| if angle < 0.0 { angle + TAU } else { angle };
    let p = wrap(alpha + beta);
    let q = wrap(alpha - beta);

    let ta = local
        .ta_deg()
        .map_err(astro_err("true anomaly"))?
        .to_radians();
    if angle_difference(ta, p) <= angle_difference(ta, q) {
        Ok((p, theta))
    } else {
        Ok((q, theta))
    }
}
