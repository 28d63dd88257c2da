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

use super::{AstroError, Frame, TimeTagged};
use crate::io::{epoch_from_str, epoch_to_str};
use crate::linalg::Vector3;
use crate::time::{Duration, Epoch, Unit};
use crate::utils::{between_0_360, between_pm_180, signed_angle};
use serde_derive::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::f64::EPSILON;
use std::fmt;

/// If an orbit has an eccentricity below the following value, its apsides are undefined and the
/// perifocal basis falls back onto the line of nodes.
pub const ECC_EPSILON: f64 = 1e-11;
pub const MA_EPSILON: f64 = 1e-16;
/// Maneuver planning considers an orbit circular below this eccentricity
pub const CIRCULAR_ECC: f64 = 1e-3;
/// Below this norm (km^2/s), the angular momentum is considered zero
pub const ANGULAR_MOMENTUM_EPSILON: f64 = 1e-10;

/// Orbit defines an orbital state
///
/// Unless noted otherwise, algorithms are from GMAT 2016a [StateConversionUtil.cpp](https://github.com/ChristopherRabotin/GMAT/blob/37201a6290e7f7b941bc98ee973a527a5857104b/src/base/util/StateConversionUtil.cpp).
/// Regardless of the constructor used, this struct stores all the state information in Cartesian coordinates
/// as these are always non singular. The position and velocity are relative to the center of the frame.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Orbit {
    /// in km
    pub x_km: f64,
    /// in km
    pub y_km: f64,
    /// in km
    pub z_km: f64,
    /// in km/s
    pub vx_km_s: f64,
    /// in km/s
    pub vy_km_s: f64,
    /// in km/s
    pub vz_km_s: f64,
    #[serde(serialize_with = "epoch_to_str", deserialize_with = "epoch_from_str")]
    pub epoch: Epoch,
    /// Frame contains everything we need to compute state information
    pub frame: Frame,
}

impl Orbit {
    /// Creates a new Orbit in the provided frame at the provided Epoch.
    ///
    /// **Units:** km, km, km, km/s, km/s, km/s
    #[allow(clippy::too_many_arguments)]
    pub fn cartesian(
        x_km: f64,
        y_km: f64,
        z_km: f64,
        vx_km_s: f64,
        vy_km_s: f64,
        vz_km_s: f64,
        epoch: Epoch,
        frame: Frame,
    ) -> Self {
        Self {
            x_km,
            y_km,
            z_km,
            vx_km_s,
            vy_km_s,
            vz_km_s,
            epoch,
            frame,
        }
    }

    /// Creates a new Orbit from the position (km) and velocity (km/s) vectors
    pub fn from_vectors(
        radius_km: &Vector3<f64>,
        velocity_km_s: &Vector3<f64>,
        epoch: Epoch,
        frame: Frame,
    ) -> Self {
        Self::cartesian(
            radius_km.x,
            radius_km.y,
            radius_km.z,
            velocity_km_s.x,
            velocity_km_s.y,
            velocity_km_s.z,
            epoch,
            frame,
        )
    }

    /// Creates a new Orbit around the center of the provided frame from the Keplerian orbital elements.
    ///
    /// **Units:** km, none, degrees, degrees, degrees, degrees
    ///
    /// NOTE: The state is defined in Cartesian coordinates as they are non-singular. This causes rounding
    /// errors when creating a state from its Keplerian orbital elements (cf. the state tests).
    /// One should expect these errors to be on the order of 1e-12.
    #[allow(clippy::too_many_arguments)]
    pub fn keplerian(
        sma_km: f64,
        ecc: f64,
        inc_deg: f64,
        raan_deg: f64,
        aop_deg: f64,
        ta_deg: f64,
        epoch: Epoch,
        frame: Frame,
    ) -> Result<Self, AstroError> {
        let gm = frame.mu_km3_s2()?;
        if gm.abs() < EPSILON {
            warn!("GM is near zero ({gm}): expect math errors in Keplerian to Cartesian conversion");
        }
        // Algorithm from GMAT's StateConversionUtil::KeplerianToCartesian
        let ecc = if ecc < 0.0 {
            warn!("eccentricity cannot be negative: sign of eccentricity changed");
            ecc * -1.0
        } else {
            ecc
        };
        let sma = if ecc > 1.0 && sma_km > 0.0 {
            warn!("eccentricity > 1 (hyperbolic) BUT SMA > 0 (elliptical): sign of SMA changed");
            sma_km * -1.0
        } else if ecc < 1.0 && sma_km < 0.0 {
            warn!("eccentricity < 1 (elliptical) BUT SMA < 0 (hyperbolic): sign of SMA changed");
            sma_km * -1.0
        } else {
            sma_km
        };
        if (sma * (1.0 - ecc)).abs() < 1e-3 {
            warn!("radius of periapsis is less than one meter");
        }
        if (1.0 - ecc).abs() < EPSILON {
            return Err(AstroError::MathDomain {
                msg: "parabolic orbits have ill-defined Keplerian orbital elements".to_string(),
            });
        }
        if ecc > 1.0 {
            let ta = between_pm_180(ta_deg).abs();
            if ta > (PI - (1.0 / ecc).acos()).to_degrees() {
                return Err(AstroError::MathDomain {
                    msg: format!(
                        "true anomaly value ({ta_deg}) physically impossible for a hyperbolic orbit"
                    ),
                });
            }
        }
        if (1.0 + ecc * ta_deg.to_radians().cos()).is_infinite() {
            return Err(AstroError::MathDomain {
                msg: "radius of orbit is infinite".to_string(),
            });
        }
        // The conversion algorithm itself comes from GMAT's StateConversionUtil::ComputeKeplToCart
        let inc = inc_deg.to_radians();
        let raan = raan_deg.to_radians();
        let aop = aop_deg.to_radians();
        let ta = ta_deg.to_radians();
        let p = sma * (1.0 - ecc.powi(2));
        if p.abs() < EPSILON {
            return Err(AstroError::MathDomain {
                msg: "semilatus rectum ~= 0.0: parabolic orbit".to_string(),
            });
        }
        let radius = p / (1.0 + ecc * ta.cos());
        let (sin_aop_ta, cos_aop_ta) = (aop + ta).sin_cos();
        let (sin_inc, cos_inc) = inc.sin_cos();
        let (sin_raan, cos_raan) = raan.sin_cos();
        let (sin_aop, cos_aop) = aop.sin_cos();
        let x = radius * (cos_aop_ta * cos_raan - cos_inc * sin_aop_ta * sin_raan);
        let y = radius * (cos_aop_ta * sin_raan + cos_inc * sin_aop_ta * cos_raan);
        let z = radius * sin_aop_ta * sin_inc;
        let sqrt_gm_p = (gm / p).sqrt();
        let cos_ta_ecc = ta.cos() + ecc;
        let sin_ta = ta.sin();

        let vx = sqrt_gm_p * cos_ta_ecc * (-sin_aop * cos_raan - cos_inc * sin_raan * cos_aop)
            - sqrt_gm_p * sin_ta * (cos_aop * cos_raan - cos_inc * sin_raan * sin_aop);
        let vy = sqrt_gm_p * cos_ta_ecc * (-sin_aop * sin_raan + cos_inc * cos_raan * cos_aop)
            - sqrt_gm_p * sin_ta * (cos_aop * sin_raan + cos_inc * cos_raan * sin_aop);
        let vz = sqrt_gm_p * (cos_ta_ecc * sin_inc * cos_aop - sin_ta * sin_inc * sin_aop);

        Ok(Self::cartesian(x, y, z, vx, vy, vz, epoch, frame))
    }

    /// Initializes a new orbit from the Keplerian orbital elements using the mean anomaly instead of the true anomaly.
    #[allow(clippy::too_many_arguments)]
    pub fn keplerian_mean_anomaly(
        sma_km: f64,
        ecc: f64,
        inc_deg: f64,
        raan_deg: f64,
        aop_deg: f64,
        ma_deg: f64,
        epoch: Epoch,
        frame: Frame,
    ) -> Result<Self, AstroError> {
        // Start by computing the true anomaly
        let ta_rad = compute_mean_to_true_anomaly(ma_deg.to_radians(), ecc, MA_EPSILON)?;

        Self::keplerian(
            sma_km,
            ecc,
            inc_deg,
            raan_deg,
            aop_deg,
            ta_rad.to_degrees(),
            epoch,
            frame,
        )
    }

    /// Returns the radius vector of this Orbit in [km, km, km]
    pub fn radius(&self) -> Vector3<f64> {
        Vector3::new(self.x_km, self.y_km, self.z_km)
    }

    /// Returns the velocity vector of this Orbit in [km/s, km/s, km/s]
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.vx_km_s, self.vy_km_s, self.vz_km_s)
    }

    /// Returns the unit vector in the direction of the state radius
    pub fn r_hat(&self) -> Vector3<f64> {
        self.radius() / self.rmag_km()
    }

    /// Returns the unit vector in the direction of the state velocity
    pub fn v_hat(&self) -> Vector3<f64> {
        self.velocity() / self.vmag_km_s()
    }

    /// Returns the magnitude of the radius vector in km
    pub fn rmag_km(&self) -> f64 {
        (self.x_km.powi(2) + self.y_km.powi(2) + self.z_km.powi(2)).sqrt()
    }

    /// Returns the magnitude of the velocity vector in km/s
    pub fn vmag_km_s(&self) -> f64 {
        (self.vx_km_s.powi(2) + self.vy_km_s.powi(2) + self.vz_km_s.powi(2)).sqrt()
    }

    /// Returns the orbital momentum vector
    pub fn hvec(&self) -> Vector3<f64> {
        self.radius().cross(&self.velocity())
    }

    /// Returns the norm of the orbital momentum
    pub fn hmag_km2_s(&self) -> f64 {
        self.hvec().norm()
    }

    /// Returns the direction of the orbital momentum, or an error if the position and velocity are parallel
    pub fn h_hat(&self) -> Result<Vector3<f64>, AstroError> {
        let h = self.hvec();
        if h.norm() < ANGULAR_MOMENTUM_EPSILON {
            Err(AstroError::ZeroAngularMomentum)
        } else {
            Ok(h / h.norm())
        }
    }

    /// Returns the eccentricity vector (no unit)
    pub fn evec(&self) -> Result<Vector3<f64>, AstroError> {
        let mu = self.frame.mu_km3_s2()?;
        let r = self.radius();
        let v = self.velocity();
        Ok(((v.norm_squared() - mu / r.norm()) * r - (r.dot(&v)) * v) / mu)
    }

    /// Returns the specific mechanical energy in km^2/s^2
    pub fn energy_km2_s2(&self) -> Result<f64, AstroError> {
        Ok(self.vmag_km_s().powi(2) / 2.0 - self.frame.mu_km3_s2()? / self.rmag_km())
    }

    /// Returns the semi-major axis in km
    pub fn sma_km(&self) -> Result<f64, AstroError> {
        Ok(-self.frame.mu_km3_s2()? / (2.0 * self.energy_km2_s2()?))
    }

    /// Returns the period of this orbit, only defined for closed orbits
    pub fn period(&self) -> Result<Duration, AstroError> {
        let sma = self.sma_km()?;
        if sma <= 0.0 {
            return Err(AstroError::MathDomain {
                msg: format!("orbital period undefined for open orbit (SMA = {sma} km)"),
            });
        }
        Ok(TAU * (sma.powi(3) / self.frame.mu_km3_s2()?).sqrt() * Unit::Second)
    }

    /// Returns the eccentricity (no unit)
    pub fn ecc(&self) -> Result<f64, AstroError> {
        Ok(self.evec()?.norm())
    }

    /// Returns whether this orbit is considered circular for maneuver planning
    pub fn is_circular(&self) -> Result<bool, AstroError> {
        Ok(self.ecc()? < CIRCULAR_ECC)
    }

    /// Returns the inclination in degrees
    pub fn inc_deg(&self) -> Result<f64, AstroError> {
        let h_hat = self.h_hat()?;
        Ok(h_hat.z.clamp(-1.0, 1.0).acos().to_degrees())
    }

    /// Returns the right ascension of the ascending node in degrees, zero for equatorial orbits
    pub fn raan_deg(&self) -> Result<f64, AstroError> {
        let n = Vector3::z().cross(&self.h_hat()?);
        if n.norm() < EPSILON {
            return Ok(0.0);
        }
        let raan = (n.x / n.norm()).clamp(-1.0, 1.0).acos();
        if n.y < 0.0 {
            Ok((TAU - raan).to_degrees())
        } else {
            Ok(raan.to_degrees())
        }
    }

    /// Returns the argument of periapsis in degrees.
    ///
    /// For equatorial orbits, this is the longitude of periapsis. It is zero for circular orbits.
    pub fn aop_deg(&self) -> Result<f64, AstroError> {
        let evec = self.evec()?;
        let ecc = evec.norm();
        if ecc < ECC_EPSILON {
            return Ok(0.0);
        }
        let h_hat = self.h_hat()?;
        let n = Vector3::z().cross(&h_hat);
        if n.norm() < EPSILON {
            // Retrograde equatorial orbits measure the longitude clockwise
            let lon = evec.y.atan2(evec.x).to_degrees();
            return Ok(between_0_360(if h_hat.z < 0.0 { -lon } else { lon }));
        }
        let aop = (n.dot(&evec) / (n.norm() * ecc)).clamp(-1.0, 1.0).acos();
        if evec.z < 0.0 {
            Ok((TAU - aop).to_degrees())
        } else {
            Ok(aop.to_degrees())
        }
    }

    /// Returns the true anomaly in degrees between 0 and 360.0
    ///
    /// For circular orbits, the true anomaly is measured from the ascending node, or from the X axis if the orbit is also equatorial.
    /// This makes the sum of the RAAN, AOP and TA a well defined true longitude for all closed orbits.
    pub fn ta_deg(&self) -> Result<f64, AstroError> {
        let ecc = self.ecc()?;
        if ecc < ECC_EPSILON {
            let (p_hat, _) = self.perifocal_basis()?;
            return Ok(between_0_360(
                signed_angle(&p_hat, &self.radius(), &self.hvec()).to_degrees(),
            ));
        }
        let cos_nu = self.evec()?.dot(&self.radius()) / (ecc * self.rmag_km());
        let ta = cos_nu.clamp(-1.0, 1.0).acos();
        if self.radius().dot(&self.velocity()) < 0.0 {
            Ok((TAU - ta).to_degrees())
        } else {
            Ok(ta.to_degrees())
        }
    }

    /// Returns the true longitude in degrees
    pub fn tlong_deg(&self) -> Result<f64, AstroError> {
        Ok(between_0_360(
            self.aop_deg()? + self.raan_deg()? + self.ta_deg()?,
        ))
    }

    /// Returns the radius of periapsis (or perigee around Earth), in kilometers.
    pub fn periapsis_km(&self) -> Result<f64, AstroError> {
        Ok(self.sma_km()? * (1.0 - self.ecc()?))
    }

    /// Returns the radius of apoapsis (or apogee around Earth), in kilometers.
    pub fn apoapsis_km(&self) -> Result<f64, AstroError> {
        Ok(self.sma_km()? * (1.0 + self.ecc()?))
    }

    /// Returns the semi parameter (or semilatus rectum)
    pub fn semi_parameter_km(&self) -> Result<f64, AstroError> {
        Ok(self.hmag_km2_s().powi(2) / self.frame.mu_km3_s2()?)
    }

    /// Returns the eccentric anomaly in degrees
    ///
    /// This is a conversion from GMAT's StateConversionUtil::TrueToEccentricAnomaly
    pub fn ea_deg(&self) -> Result<f64, AstroError> {
        let ecc = self.ecc()?;
        let (sin_ta, cos_ta) = self.ta_deg()?.to_radians().sin_cos();
        let ecc_cos_ta = ecc * cos_ta;
        let sin_ea = ((1.0 - ecc.powi(2)).sqrt() * sin_ta) / (1.0 + ecc_cos_ta);
        let cos_ea = (ecc + cos_ta) / (1.0 + ecc_cos_ta);
        Ok(sin_ea.atan2(cos_ea).to_degrees())
    }

    /// Returns the mean anomaly in degrees
    ///
    /// This is a conversion from GMAT's StateConversionUtil::TrueToMeanAnomaly
    pub fn ma_deg(&self) -> Result<f64, AstroError> {
        let ecc = self.ecc()?;
        if ecc < 1.0 {
            let ea_rad = self.ea_deg()?.to_radians();
            Ok(between_0_360((ea_rad - ecc * ea_rad.sin()).to_degrees()))
        } else if ecc > 1.0 {
            let ta_rad = self.ta_deg()?.to_radians();
            // From GMAT's TrueToHyperbolicAnomaly
            let sinh_h = (ta_rad.sin() * (ecc.powi(2) - 1.0).sqrt()) / (1.0 + ecc * ta_rad.cos());
            let h = sinh_h.asinh();
            Ok((ecc * h.sinh() - h).to_degrees())
        } else {
            Err(AstroError::MathDomain {
                msg: "parabolic orbit: mean anomaly undefined".to_string(),
            })
        }
    }

    /// Returns the perifocal unit vectors (P, Q): P points to the periapsis and Q is ninety degrees ahead in the orbit plane.
    ///
    /// For circular orbits, P is the ascending node direction, or the X axis if the orbit is also equatorial.
    pub fn perifocal_basis(&self) -> Result<(Vector3<f64>, Vector3<f64>), AstroError> {
        let h_hat = self.h_hat()?;
        let evec = self.evec()?;
        let p_hat = if evec.norm() >= ECC_EPSILON {
            evec / evec.norm()
        } else {
            let n = Vector3::z().cross(&h_hat);
            if n.norm() < EPSILON {
                Vector3::x()
            } else {
                n / n.norm()
            }
        };
        Ok((p_hat, h_hat.cross(&p_hat)))
    }

    /// Returns the position vector of the periapsis, in km
    pub fn periapsis_vector(&self) -> Result<Vector3<f64>, AstroError> {
        let (p_hat, _) = self.perifocal_basis()?;
        Ok(p_hat * self.periapsis_km()?)
    }

    /// Returns the position vector of the apoapsis, in km
    pub fn apoapsis_vector(&self) -> Result<Vector3<f64>, AstroError> {
        let (p_hat, _) = self.perifocal_basis()?;
        Ok(-p_hat * self.apoapsis_km()?)
    }

    /// Returns the unit vector pointing to the ascending node, i.e. the X axis for equatorial orbits
    pub fn ascending_node_vector(&self) -> Result<Vector3<f64>, AstroError> {
        let n = Vector3::z().cross(&self.h_hat()?);
        if n.norm() < EPSILON {
            Ok(Vector3::x())
        } else {
            Ok(n / n.norm())
        }
    }

    /// Returns the unit vector pointing to the descending node
    pub fn descending_node_vector(&self) -> Result<Vector3<f64>, AstroError> {
        Ok(-self.ascending_node_vector()?)
    }

    /// Returns the state on this same orbit at the provided true anomaly, in radians.
    ///
    /// The epoch of the returned state is unchanged: only the geometry of the conic is used.
    pub fn at_true_anomaly(&self, ta_rad: f64) -> Result<Self, AstroError> {
        let mu = self.frame.mu_km3_s2()?;
        let p = self.semi_parameter_km()?;
        let ecc = self.ecc()?;
        let (p_hat, q_hat) = self.perifocal_basis()?;
        let (sin_ta, cos_ta) = ta_rad.sin_cos();
        let denom = 1.0 + ecc * cos_ta;
        if denom <= 0.0 {
            return Err(AstroError::MathDomain {
                msg: format!(
                    "true anomaly {} deg is not reachable on this orbit (ecc = {ecc})",
                    ta_rad.to_degrees()
                ),
            });
        }
        let rmag = p / denom;
        let radius = rmag * (cos_ta * p_hat + sin_ta * q_hat);
        let velocity = (mu / p).sqrt() * (-sin_ta * p_hat + (ecc + cos_ta) * q_hat);
        Ok(Self::from_vectors(&radius, &velocity, self.epoch, self.frame))
    }

    /// Returns this orbit propagated to the provided epoch using two body dynamics.
    ///
    /// Uses the universal variable formulation with Stumpff functions, valid for all conics.
    pub fn at_epoch(&self, new_epoch: Epoch) -> Result<Self, AstroError> {
        let dt = (new_epoch - self.epoch).to_seconds();
        if dt.abs() < EPSILON {
            return Ok(*self);
        }
        let mu = self.frame.mu_km3_s2()?;
        let sqrt_mu = mu.sqrt();
        let r0 = self.radius();
        let v0 = self.velocity();
        let r0_mag = r0.norm();
        let rdotv = r0.dot(&v0);
        // alpha is the inverse of the SMA
        let alpha = -2.0 * self.energy_km2_s2()? / mu;

        let mut chi = if alpha > 1e-12 {
            sqrt_mu * dt * alpha
        } else if alpha < -1e-12 {
            let a = 1.0 / alpha;
            let sign_dt = dt.signum();
            sign_dt
                * (-a).sqrt()
                * ((-2.0 * mu * alpha * dt * dt)
                    / (rdotv + sign_dt * (-mu * a).sqrt() * (1.0 - r0_mag * alpha)))
                    .ln()
        } else {
            sqrt_mu * dt / r0_mag
        };

        let tol = 1e-12 * dt.abs().max(1.0);
        let mut converged = false;
        for _ in 0..MAX_KEPLER_ITER {
            let chi2 = chi * chi;
            let psi = alpha * chi2;
            let (c2, c3) = stumpff_c2c3(psi);
            let r = chi2 * c2 + rdotv / sqrt_mu * chi * (1.0 - psi * c3) + r0_mag * (1.0 - psi * c2);
            let f_val = r0_mag * chi * (1.0 - psi * c3) + rdotv / sqrt_mu * chi2 * c2
                + chi2 * chi * c3
                - sqrt_mu * dt;
            let delta = f_val / r;
            chi -= delta;
            if delta.abs() < tol {
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(AstroError::MaxIterReached {
                iter: MAX_KEPLER_ITER,
            });
        }

        let chi2 = chi * chi;
        let psi = alpha * chi2;
        let (c2, c3) = stumpff_c2c3(psi);
        let r_mag = chi2 * c2 + rdotv / sqrt_mu * chi * (1.0 - psi * c3) + r0_mag * (1.0 - psi * c2);

        // Lagrange coefficients
        let f = 1.0 - chi2 / r0_mag * c2;
        let g = dt - chi2 * chi / sqrt_mu * c3;
        let g_dot = 1.0 - chi2 / r_mag * c2;
        let f_dot = sqrt_mu / (r_mag * r0_mag) * chi * (psi * c3 - 1.0);

        Ok(Self::from_vectors(
            &(f * r0 + g * v0),
            &(f_dot * r0 + g_dot * v0),
            new_epoch,
            self.frame,
        ))
    }

    /// Apply the provided delta-v (in km/s)
    pub fn apply_dv_km_s(&mut self, dv_km_s: Vector3<f64>) {
        self.vx_km_s += dv_km_s.x;
        self.vy_km_s += dv_km_s.y;
        self.vz_km_s += dv_km_s.z;
    }

    /// Copies this orbit after applying the provided delta-v (in km/s)
    pub fn with_dv_km_s(mut self, dv_km_s: Vector3<f64>) -> Self {
        self.apply_dv_km_s(dv_km_s);
        self
    }

    /// Returns whether this orbit and another are equal within the specified radial and velocity absolute tolerances
    pub fn eq_within(&self, other: &Self, radial_tol: f64, velocity_tol: f64) -> bool {
        self.epoch == other.epoch
            && (self.x_km - other.x_km).abs() < radial_tol
            && (self.y_km - other.y_km).abs() < radial_tol
            && (self.z_km - other.z_km).abs() < radial_tol
            && (self.vx_km_s - other.vx_km_s).abs() < velocity_tol
            && (self.vy_km_s - other.vy_km_s).abs() < velocity_tol
            && (self.vz_km_s - other.vz_km_s).abs() < velocity_tol
            && self.frame == other.frame
    }

    fn keplerian_elements(&self) -> Result<[f64; 6], AstroError> {
        Ok([
            self.sma_km()?,
            self.ecc()?,
            self.inc_deg()?,
            self.raan_deg()?,
            self.aop_deg()?,
            self.ta_deg()?,
        ])
    }
}

const MAX_KEPLER_ITER: usize = 50;

/// Stumpff functions c2(psi) and c3(psi).
fn stumpff_c2c3(psi: f64) -> (f64, f64) {
    if psi > 1e-6 {
        let sqrt_psi = psi.sqrt();
        (
            (1.0 - sqrt_psi.cos()) / psi,
            (sqrt_psi - sqrt_psi.sin()) / (psi * sqrt_psi),
        )
    } else if psi < -1e-6 {
        let sqrt_neg_psi = (-psi).sqrt();
        (
            (1.0 - sqrt_neg_psi.cosh()) / psi,
            (sqrt_neg_psi.sinh() - sqrt_neg_psi) / ((-psi) * sqrt_neg_psi),
        )
    } else {
        // Series expansion near psi = 0
        (
            1.0 / 2.0 - psi / 24.0 + psi * psi / 720.0,
            1.0 / 6.0 - psi / 120.0 + psi * psi / 5040.0,
        )
    }
}

impl TimeTagged for Orbit {
    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch
    }
}

impl PartialEq for Orbit {
    /// Two states are equal if their position are equal within one centimeter and their velocities within one centimeter per second.
    fn eq(&self, other: &Orbit) -> bool {
        let radial_tol = 1e-5; // centimeter
        let velocity_tol = 1e-5; // centimeter per second
        self.eq_within(other, radial_tol, velocity_tol)
    }
}

impl fmt::Display for Orbit {
    // Prints as Cartesian in floating point with units
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let decimals = f.precision().unwrap_or(6);
        write!(
            f,
            "[{}] {}\tposition = [{:.*}, {:.*}, {:.*}] km\tvelocity = [{:.*}, {:.*}, {:.*}] km/s",
            self.frame,
            self.epoch,
            decimals,
            self.x_km,
            decimals,
            self.y_km,
            decimals,
            self.z_km,
            decimals,
            self.vx_km_s,
            decimals,
            self.vy_km_s,
            decimals,
            self.vz_km_s
        )
    }
}

impl fmt::LowerHex for Orbit {
    // Prints the Keplerian orbital elements in floating point with units
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let decimals = f.precision().unwrap_or(6);
        match self.keplerian_elements() {
            Ok([sma, ecc, inc, raan, aop, ta]) => write!(
                f,
                "[{}] {}\tsma = {:.*} km\tecc = {:.*}\tinc = {:.*} deg\traan = {:.*} deg\taop = {:.*} deg\tta = {:.*} deg",
                self.frame, self.epoch, decimals, sma, decimals, ecc, decimals, inc, decimals, raan, decimals, aop, decimals, ta
            ),
            Err(e) => write!(f, "[{}] {}\t{e}", self.frame, self.epoch),
        }
    }
}

/// Computes the true anomaly from the given mean anomaly for an orbit.
///
/// The computation process varies depending on whether the orbit is elliptical (eccentricity less than or equal to 1)
/// or hyperbolic (eccentricity greater than 1). In each case, the method uses an iterative algorithm to find a
/// sufficiently accurate approximation of the true anomaly.
///
/// # Arguments
///
/// * `ma_radians` - The mean anomaly in radians.
/// * `ecc` - The eccentricity of the orbit.
/// * `tol` - The tolerance for the iterative solver.
///
/// # Remarks
///
/// This function uses GTDS MathSpec Equations 3-180, 3-181, and 3-186 for the iterative computation process.
pub fn compute_mean_to_true_anomaly(ma_radians: f64, ecc: f64, tol: f64) -> Result<f64, AstroError> {
    let rm = ma_radians;
    if ecc <= 1.0 {
        // Elliptical orbit
        let mut e2 = rm + ecc * rm.sin(); // GTDS MathSpec Equation 3-182

        let mut iter = 0;

        loop {
            iter += 1;
            if iter > 1000 {
                return Err(AstroError::MaxIterReached { iter });
            }

            // GTDS MathSpec Equation 3-180
            let normalized_anomaly = 1.0 - ecc * e2.cos();

            if normalized_anomaly.abs() < MA_EPSILON {
                return Err(AstroError::MathDomain {
                    msg: format!("normalizer too small {normalized_anomaly}"),
                });
            }

            // GTDS MathSpec Equation 3-181
            let e1 = e2 - (e2 - ecc * e2.sin() - rm) / normalized_anomaly;

            if (e2 - e1).abs() < tol {
                break;
            }

            e2 = e1;
        }

        let mut e = e2;

        if e < 0.0 {
            e += TAU;
        }

        let c = (e - PI).abs();

        let mut ta = if c >= 1.0e-08 {
            let normalized_anomaly = 1.0 - ecc;

            if (normalized_anomaly).abs() < MA_EPSILON {
                return Err(AstroError::MathDomain {
                    msg: format!("normalized anomaly too small {normalized_anomaly}"),
                });
            }

            let eccentricity_ratio = (1.0 + ecc) / normalized_anomaly; // temp2 = (1+ecc)/(1-ecc)

            if eccentricity_ratio < 0.0 {
                return Err(AstroError::MathDomain {
                    msg: format!("eccentric ratio too small {eccentricity_ratio}"),
                });
            }

            let f = eccentricity_ratio.sqrt();
            let g = (e / 2.0).tan();
            // tan(TA/2) = Sqrt[(1+ecc)/(1-ecc)] * tan(E/2)
            2.0 * (f * g).atan()
        } else {
            e
        };

        if ta < 0.0 {
            ta += TAU;
        }
        Ok(ta)
    } else {
        // Hyperbolic orbit: the anomaly is not an angle, so no modulo is applied.
        let mut f2: f64 = 0.0;
        let mut iter = 0;

        loop {
            iter += 1;
            if iter > 1000 {
                return Err(AstroError::MaxIterReached { iter });
            }

            let normalizer = ecc * f2.cosh() - 1.0;

            if normalizer.abs() < MA_EPSILON {
                return Err(AstroError::MathDomain {
                    msg: format!("normalizer too small {normalizer}"),
                });
            }

            let f1 = f2 - (ecc * f2.sinh() - f2 - rm) / normalizer; // GTDS MathSpec Equation 3-186
            if (f2 - f1).abs() < tol {
                break;
            }
            f2 = f1;
        }

        let f = f2;
        let normalized_anomaly = ecc - 1.0;

        if normalized_anomaly.abs() < MA_EPSILON {
            return Err(AstroError::MathDomain {
                msg: format!("eccentric ratio too small {normalized_anomaly}"),
            });
        }

        let eccentricity_ratio = (ecc + 1.0) / normalized_anomaly; // temp2 = (ecc+1)/(ecc-1)

        if eccentricity_ratio < 0.0 {
            return Err(AstroError::MathDomain {
                msg: format!("eccentric ratio too small {eccentricity_ratio}"),
            });
        }

        let e = eccentricity_ratio.sqrt();
        let g = (f / 2.0).tanh();
        let mut ta = 2.0 * (e * g).atan();

        if ta < 0.0 {
            ta += TAU;
        }
        Ok(ta)
    }
}
