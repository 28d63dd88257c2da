extern crate mnvr_planner as mnvr;

use crate::{epoch, ENGINE};
use mnvr::cosmic::{LocalOnly, Orbit, EARTH_J2000};
use mnvr::md::{
    ImpulsiveManeuver, Maneuver, ManeuverHandle, ManeuverKind, ManeuverPlan, NodeCrossing,
};
use mnvr::time::{Duration, Epoch, TimeUnits};
use rstest::*;
use std::sync::Arc;

/// Offers the states to a fresh maneuver, in order, and returns what `can_execute` answered for each.
fn decisions(
    mnvr: ImpulsiveManeuver,
    states: &[Orbit],
) -> (ManeuverPlan, ManeuverHandle, Vec<bool>) {
    let mut plan = ManeuverPlan::new(Arc::new(LocalOnly));
    let min_epoch = states[0].epoch - 1.days();
    let handle = plan.add(
        Maneuver::impulsive(EARTH_J2000, min_epoch, Duration::ZERO, ENGINE, mnvr).unwrap(),
    );
    let fired = states
        .iter()
        .map(|state| plan.can_execute(handle, state).unwrap())
        .collect();
    (plan, handle, fired)
}

/// States around the epoch `center` of the orbit `orbit`, 30 and 10 seconds before and after it.
fn around(orbit: &Orbit, center: Epoch) -> Vec<Orbit> {
    [-30_i64, -10, 10, 30]
        .iter()
        .map(|dt_s| orbit.at_epoch(center + (*dt_s).seconds()).unwrap())
        .collect()
}

#[rstest]
fn apogee_fires_after_periapsis(epoch: Epoch) {
    let _ = pretty_env_logger::try_init();

    let orbit = Orbit::cartesian(6800.0, 0.0, 0.0, 0.0, 9.0, 0.0, epoch, EARTH_J2000);
    let target = orbit.apoapsis_km().unwrap() + 100.0;
    let half_period = orbit.period().unwrap() * 0.5;

    let (_, _, fired) = decisions(
        ImpulsiveManeuver::apogee_height(target),
        &around(&orbit, epoch),
    );
    assert_eq!(fired, vec![false, false, true, false]);

    let (_, _, fired) = decisions(
        ImpulsiveManeuver::apogee_height(target),
        &around(&orbit, epoch + half_period),
    );
    assert_eq!(fired, vec![false; 4]);
}

#[rstest]
fn perigee_fires_after_apoapsis(epoch: Epoch) {
    let _ = pretty_env_logger::try_init();

    let orbit = Orbit::cartesian(6800.0, 0.0, 0.0, 0.0, 9.0, 0.0, epoch, EARTH_J2000);
    let target = orbit.periapsis_km().unwrap() + 100.0;
    let half_period = orbit.period().unwrap() * 0.5;

    let (_, _, fired) = decisions(
        ImpulsiveManeuver::perigee_height(target),
        &around(&orbit, epoch),
    );
    assert_eq!(fired, vec![false; 4]);

    let (_, _, fired) = decisions(
        ImpulsiveManeuver::perigee_height(target),
        &around(&orbit, epoch + half_period),
    );
    assert_eq!(fired, vec![false, false, true, false]);
}

#[rstest]
fn combined_fires_after_apoapsis(epoch: Epoch) {
    let _ = pretty_env_logger::try_init();

    let (sin, cos) = 10.0_f64.to_radians().sin_cos();
    let orbit = Orbit::cartesian(6800.0, 0.0, 0.0, 0.0, 9.0 * cos, 9.0 * sin, epoch, EARTH_J2000);
    let target = orbit.periapsis_km().unwrap() + 100.0;
    let half_period = orbit.period().unwrap() * 0.5;

    let (_, _, fired) = decisions(ImpulsiveManeuver::combined(target, 0.0), &around(&orbit, epoch));
    assert_eq!(fired, vec![false; 4]);

    let (_, _, fired) = decisions(
        ImpulsiveManeuver::combined(target, 0.0),
        &around(&orbit, epoch + half_period),
    );
    assert_eq!(fired, vec![false, false, true, false]);
}

#[rstest]
fn combined_requires_apsides_on_nodes(epoch: Epoch) {
    // Periapsis ninety degrees away from the ascending node
    let orbit =
        Orbit::keplerian(24_000.0, 0.7, 28.5, 0.0, 90.0, 170.0, epoch, EARTH_J2000).unwrap();
    let at_apoapsis = orbit.at_true_anomaly(std::f64::consts::PI).unwrap();
    let (plan, handle, fired) = decisions(
        ImpulsiveManeuver::combined(42_164.0, 0.0),
        &[orbit, at_apoapsis],
    );
    assert_eq!(fired, vec![false, false]);
    // The crossing detector was never consulted
    assert!(!plan.get(handle).unwrap().predicate().is_inbound());
}

#[rstest]
fn plane_alignment_fires_after_descending_node(epoch: Epoch) {
    let _ = pretty_env_logger::try_init();

    let target = Orbit::keplerian(18_000.0, 0.5, 45.0, 55.0, 30.0, 0.0, epoch, EARTH_J2000).unwrap();
    let ta_dn_rad: f64 = 2.197_937_269_883_067;
    let states: Vec<Orbit> = [-0.2, -0.1, 0.1, 0.2]
        .iter()
        .map(|offset| {
            Orbit::keplerian(
                22_960.0,
                0.5,
                60.0,
                10.0,
                0.0,
                (ta_dn_rad + offset).to_degrees(),
                epoch,
                EARTH_J2000,
            )
            .unwrap()
        })
        .collect();

    let (plan, handle, fired) = decisions(ImpulsiveManeuver::plane_alignment(target), &states);
    assert_eq!(fired, vec![false, false, true, false]);

    let node = match &plan.get(handle).unwrap().kind {
        ManeuverKind::Impulsive(ImpulsiveManeuver::PlaneAlignment { node, .. }) => *node,
        _ => unreachable!(),
    };
    assert_eq!(node, Some(NodeCrossing::Descending));
}

#[rstest]
fn apsidal_alignment_fires_after_intersections(epoch: Epoch) {
    let _ = pretty_env_logger::try_init();

    let target = Orbit::keplerian(18_000.0, 0.5, 0.0, 0.0, 30.0, 0.0, epoch, EARTH_J2000).unwrap();
    let states: Vec<Orbit> = [150.0, 155.0, 156.5, 157.0, 341.0, 341.8, 343.0]
        .iter()
        .map(|ta_deg| {
            Orbit::keplerian(
                14_999.992_500_003_746,
                0.333_333,
                0.0,
                0.0,
                0.0,
                *ta_deg,
                epoch,
                EARTH_J2000,
            )
            .unwrap()
        })
        .collect();

    let (_, _, fired) = decisions(ImpulsiveManeuver::apsidal_alignment(target), &states);
    assert_eq!(
        fired,
        vec![false, false, true, false, false, true, false]
    );
}

#[rstest]
fn phasing_fires_after_periapsis_of_eccentric_orbit(epoch: Epoch) {
    let _ = pretty_env_logger::try_init();

    let orbit = Orbit::keplerian(13_600.0, 0.5, 0.0, 0.0, 0.0, 0.0, epoch, EARTH_J2000).unwrap();
    let target = Orbit::keplerian(13_600.0, 0.5, 0.0, 0.0, 0.0, 30.0, epoch, EARTH_J2000).unwrap();
    let states: Vec<Orbit> = [-10_i64, -1, 1, 2]
        .iter()
        .map(|dt_s| orbit.at_epoch(epoch + (*dt_s).seconds()).unwrap())
        .collect();

    let (_, _, fired) = decisions(ImpulsiveManeuver::phasing(target, 3), &states);
    assert_eq!(fired, vec![false, false, true, false]);
}
