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

use core::f64::consts::PI;

use snafu::ensure;

use super::{
    Branch, LambertInput, LambertResult, LambertSolution, TransferDirection, MAX_ITERATIONS,
    MULTI_REV_TOLERANCE, ZERO_REV_TOLERANCE,
};
use crate::errors::{
    CollinearPositionsSnafu, InvalidGravitationalParameterSnafu, InvalidTimeOfFlightSnafu,
    LambertError, NonConvergenceSnafu, SingularDerivativeSnafu,
};
use crate::linalg::Vector3;

/// Solve the Lambert boundary problem using Izzo's method, for up to `max_revolutions` complete revolutions.
///
/// This is an implementation of D. Izzo's method for solving Lambert's problem, as described in "Revisiting Lambert’s problem",
/// following the structure of jorgepiloto's [lamberthub](https://github.com/jorgepiloto/lamberthub/blob/main/src/lamberthub/universal_solvers/izzo.py)
/// which is released under the GPL v3 license, compatible with this crate's AGPL v3 license.
///
/// The delta-v of each solution are computed with respect to the velocities of the input states.
///
/// # Errors
/// + The boundary positions are null or collinear, which leaves the transfer plane undefined;
/// + The direct transfer does not converge: the multi-revolution branches are only attempted once the direct transfer is known.
///
/// A multi-revolution branch which does not converge is skipped, and revolution counts beyond those allowed by the time of flight are dropped.
pub fn izzo_multi(
    input: &LambertInput,
    direction: TransferDirection,
    max_revolutions: u32,
) -> Result<LambertResult, LambertError> {
    solve(
        input.initial_state.radius(),
        input.final_state.radius(),
        input.tof_s(),
        input.mu_km3_s2()?,
        direction,
        max_revolutions,
        input.initial_state.velocity(),
        input.final_state.velocity(),
    )
}

/// Solve the direct (zero revolution) transfer between two positions using Izzo's method.
///
/// Without boundary velocities, `delta_v1` is the departure velocity and `delta_v2` the opposite of the arrival velocity.
pub fn izzo(
    r_init: Vector3<f64>,
    r_final: Vector3<f64>,
    tof_s: f64,
    mu_km3_s2: f64,
    direction: TransferDirection,
) -> Result<LambertSolution, LambertError> {
    let result = solve(
        r_init,
        r_final,
        tof_s,
        mu_km3_s2,
        direction,
        0,
        Vector3::zeros(),
        Vector3::zeros(),
    )?;

    result
        .solutions
        .into_iter()
        .next()
        .ok_or(LambertError::NonConvergence {
            maxiter: MAX_ITERATIONS,
        })
}

/// Geometry of the transfer triangle and the associated non-dimensional parameter.
#[derive(Copy, Clone, Debug)]
pub(crate) struct TransferGeometry {
    pub lambda: f64,
    pub chord_km: f64,
    pub semi_perimeter_km: f64,
    r1_km: f64,
    r2_km: f64,
    i_r1: Vector3<f64>,
    i_r2: Vector3<f64>,
    i_t1: Vector3<f64>,
    i_t2: Vector3<f64>,
}

impl TransferGeometry {
    /// Transfer planes containing the Z axis (zero Z component of the angular momentum) are accepted, and are
    /// flown the short way when prograde.
    pub(crate) fn new(
        r_init: &Vector3<f64>,
        r_final: &Vector3<f64>,
        direction: TransferDirection,
    ) -> Result<Self, LambertError> {
        let r1_km = r_init.norm();
        let r2_km = r_final.norm();
        ensure!(
            r1_km > f64::EPSILON && r2_km > f64::EPSILON,
            CollinearPositionsSnafu
        );

        let chord_km = (r_final - r_init).norm();
        let semi_perimeter_km = (r1_km + r2_km + chord_km) * 0.5;

        let i_r1 = r_init / r1_km;
        let i_r2 = r_final / r2_km;

        let i_h = i_r1.cross(&i_r2);
        ensure!(i_h.norm() > 1e-12, CollinearPositionsSnafu);
        let i_h = i_h.normalize();

        let mut lambda = (1.0 - chord_km / semi_perimeter_km).sqrt();

        // Transfer angle greater than 180 degrees when the momentum points to -Z
        let (mut i_t1, mut i_t2) = if i_h.z < 0.0 {
            lambda = -lambda;
            (i_r1.cross(&i_h), i_r2.cross(&i_h))
        } else {
            (i_h.cross(&i_r1), i_h.cross(&i_r2))
        };

        if direction == TransferDirection::Retrograde {
            lambda = -lambda;
            i_t1 = -i_t1;
            i_t2 = -i_t2;
        }

        Ok(Self {
            lambda,
            chord_km,
            semi_perimeter_km,
            r1_km,
            r2_km,
            i_r1,
            i_r2,
            i_t1: i_t1.normalize(),
            i_t2: i_t2.normalize(),
        })
    }

    /// Non-dimensional time of flight
    pub(crate) fn tof(&self, tof_s: f64, mu_km3_s2: f64) -> f64 {
        (2.0 * mu_km3_s2 / self.semi_perimeter_km.powi(3)).sqrt() * tof_s
    }

    /// Reconstructs the departure and arrival velocities from the root of the time of flight equation.
    fn velocities(&self, x: f64, mu_km3_s2: f64) -> (Vector3<f64>, Vector3<f64>) {
        let ll = self.lambda;
        let y = compute_y(x, ll);
        let gamma = (mu_km3_s2 * self.semi_perimeter_km / 2.0).sqrt();
        let rho = (self.r1_km - self.r2_km) / self.chord_km;
        let sigma = (1.0 - rho.powi(2)).sqrt();

        let v_r1 = gamma * ((ll * y - x) - rho * (ll * y + x)) / self.r1_km;
        let v_r2 = -gamma * ((ll * y - x) + rho * (ll * y + x)) / self.r2_km;
        let v_t = gamma * sigma * (y + ll * x);

        (
            v_r1 * self.i_r1 + (v_t / self.r1_km) * self.i_t1,
            v_r2 * self.i_r2 + (v_t / self.r2_km) * self.i_t2,
        )
    }
}

/// Returns the signed non-dimensional parameter lambda of the transfer triangle.
///
/// Its magnitude is `sqrt(1 - c/s)`, and it is negative for transfers sweeping more than 180 degrees in the requested direction.
pub(crate) fn lambda_parameter(
    r_init: &Vector3<f64>,
    r_final: &Vector3<f64>,
    direction: TransferDirection,
) -> Result<f64, LambertError> {
    Ok(TransferGeometry::new(r_init, r_final, direction)?.lambda)
}

#[allow(clippy::too_many_arguments)]
fn solve(
    r_init: Vector3<f64>,
    r_final: Vector3<f64>,
    tof_s: f64,
    mu_km3_s2: f64,
    direction: TransferDirection,
    max_revolutions: u32,
    v_departure: Vector3<f64>,
    v_arrival: Vector3<f64>,
) -> Result<LambertResult, LambertError> {
    ensure!(tof_s > 0.0, InvalidTimeOfFlightSnafu { tof_s });
    ensure!(
        mu_km3_s2 > 0.0,
        InvalidGravitationalParameterSnafu { mu_km3_s2 }
    );

    let geom = TransferGeometry::new(&r_init, &r_final, direction)?;
    let ll = geom.lambda;
    let t = geom.tof(tof_s, mu_km3_s2);

    let solution = |x: f64, iterations: usize, revolutions: u32, branch: Option<Branch>| {
        let (v1, v2) = geom.velocities(x, mu_km3_s2);
        LambertSolution {
            revolutions,
            branch,
            v1,
            v2,
            x,
            iterations,
            delta_v1: v1 - v_departure,
            delta_v2: v_arrival - v2,
        }
    };

    // Direct transfer
    let x_0 = initial_guess(t, ll, 0, Branch::Left);
    let (x, iterations) = householder(x_0, t, ll, 0, ZERO_REV_TOLERANCE)?;
    debug!("Lambert direct transfer converged in {iterations} iterations (x = {x})");

    let mut solutions = vec![solution(x, iterations, 0, None)];

    if max_revolutions > 0 {
        let m_max = max_feasible_revolutions(ll, t);
        if max_revolutions > m_max {
            debug!(
                "dropping Lambert revolutions {} to {max_revolutions}: time of flight allows at most {m_max}",
                m_max + 1
            );
        }

        for m in 1..=max_revolutions.min(m_max) {
            for branch in [Branch::Left, Branch::Right] {
                let x_0 = initial_guess(t, ll, m, branch);
                match householder(x_0, t, ll, m, MULTI_REV_TOLERANCE) {
                    Ok((x, iterations)) => {
                        solutions.push(solution(x, iterations, m, Some(branch)));
                    }
                    Err(e) => {
                        warn!("skipping {m} revolution Lambert solution on the {branch} branch: {e}");
                    }
                }
            }
        }
    }

    Ok(LambertResult {
        max_revolutions,
        solutions,
    })
}

/// Returns the largest number of complete revolutions reachable within the non-dimensional time of flight `t`.
fn max_feasible_revolutions(ll: f64, t: f64) -> u32 {
    let mut m_max = (t / PI).floor() as u32;
    let t_00 = ll.acos() + ll * (1.0 - ll.powi(2)).sqrt();

    // Close to the limit, the minimum time of flight of the last revolution decides
    if m_max > 0 && t < t_00 + (m_max as f64) * PI {
        match compute_t_min(ll, m_max) {
            Ok((_, t_min)) => {
                if t < t_min {
                    m_max -= 1;
                }
            }
            Err(e) => {
                warn!("could not compute the minimum time of flight for {m_max} revolutions: {e}");
                m_max -= 1;
            }
        }
    }

    m_max
}

fn compute_y(x: f64, ll: f64) -> f64 {
    (1.0 - ll.powi(2) * (1.0 - x.powi(2))).sqrt()
}

/// Auxiliary angle psi, by the inverse function matching the type of conic.
fn compute_psi(x: f64, y: f64, ll: f64) -> f64 {
    if x > 1.0 {
        // Hyperbolic motion
        ((y - x * ll) * (x.powi(2) - 1.0).sqrt()).asinh()
    } else if x < 1.0 {
        // Elliptic motion
        (x * y + ll * (1.0 - x.powi(2))).acos()
    } else {
        // Parabolic motion
        0.0
    }
}

/// Non-dimensional time of flight for the provided universal variable.
fn tof_equation(x: f64, ll: f64, m: u32) -> f64 {
    let y = compute_y(x, ll);
    tof_equation_y(x, y, ll, m)
}

fn tof_equation_y(x: f64, y: f64, ll: f64, m: u32) -> f64 {
    if m == 0 && x.powi(2) > 0.6 && x.powi(2) < 1.4 {
        // Battin series close to the parabola
        let eta = y - ll * x;
        let s_1 = (1.0 - ll - x * eta) * 0.5;
        let q = 4.0 / 3.0 * hyp2f1b(s_1);
        (eta.powi(3) * q + 4.0 * ll * eta) * 0.5
    } else {
        let psi = compute_psi(x, y, ll);
        let den = 1.0 - x.powi(2);
        ((psi + (m as f64) * PI) / den.abs().sqrt() - x + ll * y) / den
    }
}

/// First derivative of the time of flight equation.
fn tof_equation_p(x: f64, y: f64, t: f64, ll: f64) -> f64 {
    (3.0 * t * x - 2.0 + 2.0 * ll.powi(3) * x / y) / (1.0 - x.powi(2))
}

/// Second derivative of the time of flight equation.
fn tof_equation_p2(x: f64, y: f64, t: f64, dt: f64, ll: f64) -> f64 {
    (3.0 * t + 5.0 * x * dt + 2.0 * (1.0 - ll.powi(2)) * ll.powi(3) / y.powi(3)) / (1.0 - x.powi(2))
}

/// Third derivative of the time of flight equation.
fn tof_equation_p3(x: f64, y: f64, dt: f64, ddt: f64, ll: f64) -> f64 {
    (7.0 * x * ddt + 8.0 * dt - 6.0 * (1.0 - ll.powi(2)) * ll.powi(5) * x / y.powi(5))
        / (1.0 - x.powi(2))
}

/// Minimum time of flight for `m` revolutions, returned as `(x_T_min, T_min)`.
fn compute_t_min(ll: f64, m: u32) -> Result<(f64, f64), LambertError> {
    if (ll - 1.0).abs() < 1e-9 {
        Ok((0.0, tof_equation(0.0, ll, m)))
    } else if m == 0 {
        Ok((f64::INFINITY, 0.0))
    } else {
        // Start at x > 0 to avoid problems at ll = -1
        let x_t_min = halley(0.1, ll, m, MULTI_REV_TOLERANCE)?;
        Ok((x_t_min, tof_equation(x_t_min, ll, m)))
    }
}

/// Initial guess of the universal variable, per Izzo's equations 30 and 31.
fn initial_guess(t: f64, ll: f64, m: u32, branch: Branch) -> f64 {
    if m == 0 {
        let t_0 = ll.acos() + ll * (1.0 - ll.powi(2)).sqrt();
        let t_1 = 2.0 * (1.0 - ll.powi(3)) / 3.0;

        if t >= t_0 {
            (t_0 / t).powf(2.0 / 3.0) - 1.0
        } else if t < t_1 {
            5.0 / 2.0 * t_1 / t * (t_1 - t) / (1.0 - ll.powi(5)) + 1.0
        } else {
            (2.0f64.ln() * (t / t_0).ln() / (t_1 / t_0).ln()).exp() - 1.0
        }
    } else {
        let m = m as f64;
        match branch {
            Branch::Left => {
                let term = ((m * PI + PI) / (8.0 * t)).powf(2.0 / 3.0);
                (term - 1.0) / (term + 1.0)
            }
            Branch::Right => {
                let term = ((8.0 * t) / (m * PI)).powf(2.0 / 3.0);
                (term - 1.0) / (term + 1.0)
            }
        }
    }
}

/// Hypergeometric function 2F1(3, 1, 5/2, x), see [Battin].
fn hyp2f1b(x: f64) -> f64 {
    if x >= 1.0 {
        return f64::INFINITY;
    }

    let mut res = 1.0;
    let mut term = 1.0;
    let mut ii = 0.0_f64;
    loop {
        term *= (3.0 + ii) * (1.0 + ii) / (2.5 + ii) * x / (ii + 1.0);
        let res_old = res;
        res += term;

        if res == res_old {
            return res;
        }
        ii += 1.0;
    }
}

/// One Halley step towards the stationary point of the time of flight for `m` revolutions.
pub(crate) fn halley_step(x: f64, ll: f64, m: u32) -> Result<f64, LambertError> {
    let y = compute_y(x, ll);
    let t = tof_equation_y(x, y, ll, m);
    let fder = tof_equation_p(x, y, t, ll);
    let fder2 = tof_equation_p2(x, y, t, fder, ll);
    let fder3 = tof_equation_p3(x, y, fder, fder2, ll);

    let den = 2.0 * fder2.powi(2) - fder * fder3;
    ensure!(den.abs() > 1e-14, SingularDerivativeSnafu { x });

    Ok(x - 2.0 * fder * fder2 / den)
}

/// One Householder (third order) step towards the root of `T(x) - t_target` for `m` revolutions.
pub(crate) fn householder_step(x: f64, t_target: f64, ll: f64, m: u32) -> Result<f64, LambertError> {
    let y = compute_y(x, ll);
    let t = tof_equation_y(x, y, ll, m);
    let fval = t - t_target;
    let fder = tof_equation_p(x, y, t, ll);
    let fder2 = tof_equation_p2(x, y, t, fder, ll);
    let fder3 = tof_equation_p3(x, y, fder, fder2, ll);

    let num = fder.powi(2) - fval * fder2 / 2.0;
    let den = fder * (fder.powi(2) - fval * fder2) + fder3 * fval.powi(2) / 6.0;
    ensure!(den.abs() > 1e-14, SingularDerivativeSnafu { x });

    Ok(x - fval * (num / den))
}

/// Finds the minimum of the time of flight with Halley's method.
fn halley(mut x: f64, ll: f64, m: u32, tol: f64) -> Result<f64, LambertError> {
    for _ in 0..MAX_ITERATIONS {
        let next = halley_step(x, ll, m)?;
        ensure!(
            next.is_finite(),
            NonConvergenceSnafu {
                maxiter: MAX_ITERATIONS
            }
        );
        if (next - x).abs() < tol * x.abs() + tol {
            return Ok(next);
        }
        x = next;
    }

    Err(LambertError::NonConvergence {
        maxiter: MAX_ITERATIONS,
    })
}

/// Finds the root of the time of flight equation with Householder's method, returning it with the iterations used.
fn householder(
    mut x: f64,
    t_target: f64,
    ll: f64,
    m: u32,
    tol: f64,
) -> Result<(f64, usize), LambertError> {
    for iteration in 1..=MAX_ITERATIONS {
        let next = householder_step(x, t_target, ll, m)?;
        ensure!(
            next.is_finite(),
            NonConvergenceSnafu {
                maxiter: MAX_ITERATIONS
            }
        );
        if (next - x).abs() < tol * x.abs() + tol {
            return Ok((next, iteration));
        }
        x = next;
    }

    Err(LambertError::NonConvergence {
        maxiter: MAX_ITERATIONS,
    })
}
