extern crate mnvr_planner as mnvr;

use crate::{epoch, spacecraft, ENGINE};
use approx::assert_abs_diff_eq;
use mnvr::cosmic::{LocalOnly, Orbit, Vehicle, EARTH_J2000};
use mnvr::io::ManeuverRecord;
use mnvr::md::{AttitudeManeuver, ImpulsiveManeuver, Maneuver, ManeuverPlan};
use mnvr::time::{Duration, Epoch, TimeUnits};
use rstest::*;
use std::sync::Arc;

#[rstest]
fn hohmann_transfer_to_geo(epoch: Epoch) {
    let _ = pretty_env_logger::try_init();

    let mut sc = spacecraft(3000.0, 3000.0);
    let mut plan = ManeuverPlan::new(Arc::new(LocalOnly));

    let raise = plan.add(
        Maneuver::impulsive(
            EARTH_J2000,
            epoch,
            10.minutes(),
            ENGINE,
            ImpulsiveManeuver::apogee_height(42_164.0),
        )
        .unwrap(),
    );
    let circularize = plan.add(
        Maneuver::impulsive(
            EARTH_J2000,
            epoch,
            Duration::ZERO,
            ENGINE,
            ImpulsiveManeuver::perigee_height(42_164.0),
        )
        .unwrap(),
    );
    let point = plan.add(Maneuver::attitude(
        EARTH_J2000,
        epoch,
        1.hours(),
        ENGINE,
        AttitudeManeuver::nadir(),
    ));
    plan.set_next(raise, circularize).unwrap();
    plan.set_next(circularize, point).unwrap();
    assert_eq!(plan.chain(raise).unwrap(), vec![raise, circularize, point]);

    let leo = Orbit::cartesian(6678.0, 0.0, 0.0, 0.0, 7.727, 0.0, epoch, EARTH_J2000);
    let transfer = plan.try_execute(raise, &leo, &mut sc).unwrap().state;

    // The circularization is armed once the hold of the raise is over
    let raise_window = plan.get(raise).unwrap().maneuver_window.unwrap();
    assert_eq!(raise_window.duration(), 10.minutes());
    assert_eq!(sc.standby_maneuver, Some((circularize, raise_window.end)));

    let half_period = transfer.period().unwrap() * 0.5;
    let at_apoapsis = transfer.at_epoch(epoch + half_period).unwrap();
    let geo = plan
        .try_execute(circularize, &at_apoapsis, &mut sc)
        .unwrap()
        .state;
    assert!(geo.ecc().unwrap() < 1e-6);
    assert_abs_diff_eq!(geo.sma_km().unwrap(), 42_164.0, epsilon = 1e-3);
    assert_eq!(sc.standby_maneuver.map(|(h, _)| h), Some(point));

    plan.try_execute(point, &geo, &mut sc).unwrap();
    assert_eq!(sc.standby_maneuver, None);
    assert_eq!(sc.executed_maneuvers, vec![raise, circularize, point]);

    // Total propellant matches the two recorded burns
    let records: Vec<ManeuverRecord> = [raise, circularize]
        .iter()
        .map(|h| ManeuverRecord::from_maneuver(plan.get(*h).unwrap()).unwrap())
        .collect();
    let burned: f64 = records.iter().map(|r| r.fuel_burned_kg).sum();
    assert_abs_diff_eq!(sc.fuel_mass_kg(), 3000.0 - burned, epsilon = 1e-9);
    assert_abs_diff_eq!(sc.total_mass_kg(), 4000.0 - burned, epsilon = 1e-9);

    // Replaying the chain starts from a clean slate
    plan.reset(raise).unwrap();
    sc.refuel();
    for handle in plan.chain(raise).unwrap() {
        assert!(!plan.get(handle).unwrap().is_executed());
    }
    assert_eq!(sc.fuel_mass_kg(), 3000.0);
    assert!(sc.executed_maneuvers.is_empty());
}

#[rstest]
fn maneuver_waits_for_min_epoch(epoch: Epoch) {
    let mut plan = ManeuverPlan::new(Arc::new(LocalOnly));
    let handle = plan.add(
        Maneuver::impulsive(
            EARTH_J2000,
            epoch + 1.days(),
            Duration::ZERO,
            ENGINE,
            ImpulsiveManeuver::apogee_height(42_164.0),
        )
        .unwrap(),
    );

    // Crossing the periapsis before the minimum epoch does not fire, and does not advance the detector
    let leo = Orbit::cartesian(6800.0, 0.0, 0.0, 0.0, 7.8, 0.0, epoch, EARTH_J2000);
    for dt_s in [-10_i64, 10] {
        let state = leo.at_epoch(epoch + dt_s.seconds()).unwrap();
        assert!(!plan.can_execute(handle, &state).unwrap());
    }
    assert!(!plan.get(handle).unwrap().predicate().is_inbound());
}
