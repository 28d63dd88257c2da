extern crate mnvr_planner as mnvr;

use crate::epoch;
use approx::assert_abs_diff_eq;
use mnvr::cosmic::{AstroError, Orbit, EARTH_J2000, MOON_J2000};
use mnvr::linalg::Vector3;
use mnvr::time::{Epoch, TimeUnits};
use mnvr::tools::lambert::{izzo, izzo_multi, Branch, LambertInput, TransferDirection};
use mnvr::LambertError;
use rstest::*;

/// Checks that the departure velocity of the solution reaches the final position after the time of flight.
fn assert_arrival(input: &LambertInput, v1: &Vector3<f64>, v2: &Vector3<f64>) {
    let departure = Orbit::from_vectors(
        &input.initial_state.radius(),
        v1,
        input.initial_state.epoch,
        input.initial_state.frame,
    );
    let arrival = departure.at_epoch(input.final_state.epoch).unwrap();
    assert_abs_diff_eq!(arrival.radius(), input.final_state.radius(), epsilon = 1e-2);
    assert_abs_diff_eq!(arrival.velocity(), *v2, epsilon = 1e-5);
}

#[rstest]
fn quarter_orbit_transfer(epoch: Epoch) {
    let _ = pretty_env_logger::try_init();

    let initial = Orbit::cartesian(7000.0, 0.0, 0.0, 0.0, 7.5, 0.0, epoch, EARTH_J2000);
    let fin = Orbit::cartesian(0.0, 7000.0, 0.0, -7.5, 0.0, 0.0, epoch + 1.hours(), EARTH_J2000);
    let input = LambertInput::from_states(initial, fin).unwrap();

    let result = izzo_multi(&input, TransferDirection::Prograde, 0).unwrap();
    assert_eq!(result.max_revolutions, 0);
    assert_eq!(result.solutions.len(), 1);

    let sol = result.zero_revolution_solution().unwrap();
    println!("{sol}");
    assert_eq!(sol.revolutions, 0);
    assert_eq!(sol.branch, None);
    assert_abs_diff_eq!(
        sol.v1,
        Vector3::new(4.775_059_218_878_371, 5.527_217_195_351_781, 0.0),
        epsilon = 1e-6
    );
    assert_abs_diff_eq!(
        sol.v2,
        Vector3::new(-5.527_217_195_351_781, -4.775_059_218_878_371, 0.0),
        epsilon = 1e-6
    );
    assert_eq!(sol.delta_v1, sol.v1 - initial.velocity());
    assert_eq!(sol.delta_v2, fin.velocity() - sol.v2);
    assert_abs_diff_eq!(
        sol.total_delta_v_km_s(),
        sol.delta_v1.norm() + sol.delta_v2.norm(),
        epsilon = 1e-12
    );
    assert!(result.multi_revolution_solutions(1).is_empty());
    assert_arrival(&input, &sol.v1, &sol.v2);

    // The convenience form finds the same arc
    let direct = izzo(
        initial.radius(),
        fin.radius(),
        3600.0,
        EARTH_J2000.mu_km3_s2().unwrap(),
        TransferDirection::Prograde,
    )
    .unwrap();
    assert_abs_diff_eq!(direct.v1, sol.v1, epsilon = 1e-12);
}

#[rstest]
fn retrograde_goes_the_long_way(epoch: Epoch) {
    let initial = Orbit::cartesian(7000.0, 0.0, 0.0, 0.0, 7.5, 0.0, epoch, EARTH_J2000);
    let fin = Orbit::cartesian(0.0, 7000.0, 0.0, -7.5, 0.0, 0.0, epoch + 1.hours(), EARTH_J2000);
    let input = LambertInput::from_states(initial, fin).unwrap();

    let result = izzo_multi(&input, TransferDirection::Retrograde, 0).unwrap();
    let sol = result.zero_revolution_solution().unwrap();
    // Angular momentum along -Z
    assert!(initial.radius().cross(&sol.v1).z < 0.0);
    assert_arrival(&input, &sol.v1, &sol.v2);
}

#[rstest]
fn multi_revolution_branches(epoch: Epoch) {
    let _ = pretty_env_logger::try_init();

    let initial = Orbit::cartesian(6800.0, 0.0, 0.0, 0.0, 7.65, 0.0, epoch, EARTH_J2000);
    let fin = Orbit::cartesian(
        0.0,
        6800.0,
        0.0,
        -7.65,
        0.0,
        0.0,
        epoch + 20_000.seconds(),
        EARTH_J2000,
    );
    let input = LambertInput::from_states(initial, fin).unwrap();

    let result = izzo_multi(&input, TransferDirection::Prograde, 2).unwrap();
    for sol in &result.solutions {
        println!("{sol}");
    }
    assert_eq!(result.max_revolutions, 2);
    assert_eq!(result.solutions.len(), 5);
    assert!(result.zero_revolution_solution().is_some());

    for revs in 1..=2 {
        let sols = result.multi_revolution_solutions(revs);
        assert_eq!(sols.len(), 2);
        assert_eq!(sols[0].branch, Some(Branch::Left));
        assert_eq!(sols[1].branch, Some(Branch::Right));
        for sol in sols {
            assert_eq!(sol.revolutions, revs);
            assert_arrival(&input, &sol.v1, &sol.v2);
        }
    }

    let one_rev_left = result.multi_revolution_solutions(1)[0];
    assert_abs_diff_eq!(
        one_rev_left.v1,
        Vector3::new(7.500_251_257_301_08, 4.775_198_607_071_584, 0.0),
        epsilon = 1e-6
    );

    let best = result.best().unwrap();
    assert!(result
        .solutions
        .iter()
        .all(|sol| sol.total_delta_v_km_s() >= best.total_delta_v_km_s()));
}

#[rstest]
fn infeasible_revolutions_are_dropped(epoch: Epoch) {
    let initial = Orbit::cartesian(6800.0, 0.0, 0.0, 0.0, 7.65, 0.0, epoch, EARTH_J2000);
    let fin = Orbit::cartesian(
        0.0,
        6800.0,
        0.0,
        -7.65,
        0.0,
        0.0,
        epoch + 20_000.seconds(),
        EARTH_J2000,
    );
    let input = LambertInput::from_states(initial, fin).unwrap();

    // At most four revolutions fit in the time of flight
    let result = izzo_multi(&input, TransferDirection::Prograde, 10).unwrap();
    assert_eq!(result.max_revolutions, 10);
    assert_eq!(result.solutions.len(), 9);
    assert_eq!(result.multi_revolution_solutions(4).len(), 2);
    assert!(result.multi_revolution_solutions(5).is_empty());
}

#[rstest]
fn invalid_inputs(epoch: Epoch) {
    let initial = Orbit::cartesian(7000.0, 0.0, 0.0, 0.0, 7.5, 0.0, epoch, EARTH_J2000);
    let fin = Orbit::cartesian(0.0, 7000.0, 0.0, -7.5, 0.0, 0.0, epoch, EARTH_J2000);

    assert_eq!(
        LambertInput::from_states(initial, fin).unwrap_err(),
        LambertError::InvalidTimeOfFlight { tof_s: 0.0 }
    );

    let mut early = fin;
    early.epoch = epoch - 1.minutes();
    assert!(matches!(
        LambertInput::from_states(initial, early),
        Err(LambertError::InvalidTimeOfFlight { .. })
    ));

    let frame = EARTH_J2000.with_mu_km3_s2(-1.0);
    let mut bad_initial = initial;
    bad_initial.frame = frame;
    let mut bad_fin = fin;
    bad_fin.frame = frame;
    bad_fin.epoch = epoch + 1.hours();
    assert_eq!(
        LambertInput::from_states(bad_initial, bad_fin).unwrap_err(),
        LambertError::InvalidGravitationalParameter { mu_km3_s2: -1.0 }
    );

    let mut no_mu_initial = initial;
    no_mu_initial.frame.mu_km3_s2 = None;
    let mut no_mu_fin = fin;
    no_mu_fin.frame.mu_km3_s2 = None;
    no_mu_fin.epoch = epoch + 1.hours();
    assert!(matches!(
        LambertInput::from_states(no_mu_initial, no_mu_fin),
        Err(LambertError::LambertAstro {
            source: AstroError::NoGravitationalParameter { .. }
        })
    ));

    let mut moon_fin = fin;
    moon_fin.frame = MOON_J2000;
    moon_fin.epoch = epoch + 1.hours();
    assert!(matches!(
        LambertInput::from_states(initial, moon_fin),
        Err(LambertError::LambertAstro {
            source: AstroError::FrameMismatch { .. }
        })
    ));

    let mu = EARTH_J2000.mu_km3_s2().unwrap();
    assert!(matches!(
        izzo(initial.radius(), fin.radius(), -10.0, mu, TransferDirection::Prograde),
        Err(LambertError::InvalidTimeOfFlight { .. })
    ));
    assert!(matches!(
        izzo(initial.radius(), fin.radius(), 3600.0, 0.0, TransferDirection::Prograde),
        Err(LambertError::InvalidGravitationalParameter { .. })
    ));
    assert_eq!(
        izzo(
            initial.radius(),
            initial.radius() * 2.0,
            3600.0,
            mu,
            TransferDirection::Prograde
        )
        .unwrap_err(),
        LambertError::CollinearPositions
    );
}
