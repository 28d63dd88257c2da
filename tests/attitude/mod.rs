extern crate mnvr_planner as mnvr;

use crate::{epoch, sc_1900, ENGINE};
use approx::assert_abs_diff_eq;
use mnvr::cosmic::{
    Bodies, BodyAxis, Ephemeris, Instrument, KeplerianEphemeris, LocalOnly, Orbit, Spacecraft,
    EARTH_J2000,
};
use mnvr::linalg::{UnitQuaternion, Vector3};
use mnvr::md::{
    AttitudeManeuver, AttitudeTarget, Maneuver, ManeuverError, ManeuverPlan, OrbitalDirection,
    Triad,
};
use mnvr::time::{Epoch, TimeUnits};
use rstest::*;
use std::sync::Arc;

#[fixture]
fn leo(epoch: Epoch) -> Orbit {
    Orbit::cartesian(7000.0, 0.0, 0.0, 0.0, 7.5, 0.0, epoch, EARTH_J2000)
}

fn attitude_plan(
    ephem: Arc<dyn Ephemeris>,
    mnvr: AttitudeManeuver,
    epoch: Epoch,
) -> (ManeuverPlan, mnvr::md::ManeuverHandle) {
    let mut plan = ManeuverPlan::new(ephem);
    let handle = plan.add(Maneuver::attitude(
        EARTH_J2000,
        epoch,
        5.minutes(),
        ENGINE,
        mnvr,
    ));
    (plan, handle)
}

#[rstest]
fn nadir_pointing(leo: Orbit, mut sc_1900: Spacecraft) {
    let _ = pretty_env_logger::try_init();

    let (mut plan, handle) = attitude_plan(Arc::new(LocalOnly), AttitudeManeuver::nadir(), leo.epoch);
    assert!(plan.can_execute(handle, &leo).unwrap());
    let outcome = plan.try_execute(handle, &leo, &mut sc_1900).unwrap();

    assert_abs_diff_eq!(
        outcome.orientation.rotate_vector(&BodyAxis::Front.vector()),
        Vector3::new(-1.0, 0.0, 0.0),
        epsilon = 1e-12
    );
    // Attitudes never change the orbit nor burn propellant
    assert_eq!(outcome.state, leo);
    assert!(outcome.delta_v_km_s.is_none());
    assert_eq!(sc_1900.fuel_mass_kg(), 900.0);

    let executed = plan.get(handle).unwrap();
    assert_eq!(executed.fuel_burned_kg, 0.0);
    assert_eq!(executed.thrust_window.unwrap().duration(), 0.seconds());
    assert_eq!(executed.maneuver_window.unwrap().duration(), 5.minutes());
}

#[rstest]
fn orbital_directions(leo: Orbit, mut sc_1900: Spacecraft) {
    let expectations = [
        (AttitudeManeuver::prograde(), Vector3::y()),
        (AttitudeManeuver::retrograde(), -Vector3::y()),
        (AttitudeManeuver::zenith(), Vector3::x()),
        (AttitudeManeuver::normal(), Vector3::z()),
        (AttitudeManeuver::anti_normal(), -Vector3::z()),
    ];
    for (mnvr, expected) in expectations {
        let (mut plan, handle) = attitude_plan(Arc::new(LocalOnly), mnvr, leo.epoch);
        let outcome = plan.try_execute(handle, &leo, &mut sc_1900).unwrap();
        assert_abs_diff_eq!(
            outcome.orientation.rotate_vector(&BodyAxis::Front.vector()),
            expected,
            epsilon = 1e-12
        );
    }
}

#[rstest]
fn lvlh_triad(leo: Orbit, mut sc_1900: Spacecraft) {
    let _ = pretty_env_logger::try_init();

    let (mut plan, handle) = attitude_plan(
        Arc::new(LocalOnly),
        AttitudeManeuver::Triad(Triad::lvlh()),
        leo.epoch,
    );
    let outcome = plan.try_execute(handle, &leo, &mut sc_1900).unwrap();
    let q = outcome.orientation;

    assert_abs_diff_eq!(
        q.rotate_vector(&BodyAxis::Down.vector()),
        Vector3::new(-1.0, 0.0, 0.0),
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        q.rotate_vector(&BodyAxis::Front.vector()),
        Vector3::new(0.0, 1.0, 0.0),
        epsilon = 1e-12
    );
    // Right handed: the right side faces the anti-normal
    assert_abs_diff_eq!(
        q.rotate_vector(&BodyAxis::Right.vector()),
        Vector3::new(0.0, 0.0, -1.0),
        epsilon = 1e-12
    );
}

#[rstest]
fn sun_tracking_triad(leo: Orbit, mut sc_1900: Spacecraft) {
    let _ = pretty_env_logger::try_init();

    let ephem = Arc::new(KeplerianEphemeris::earth_moon_sun().unwrap());
    let sun_dir = AttitudeTarget::Celestial(Bodies::Sun)
        .direction(&leo, ephem.as_ref())
        .unwrap();

    let (mut plan, handle) = attitude_plan(
        ephem,
        AttitudeManeuver::Triad(Triad::prograde_with_sun_tracking()),
        leo.epoch,
    );
    let q = plan
        .try_execute(handle, &leo, &mut sc_1900)
        .unwrap()
        .orientation;

    // The primary constraint is met exactly
    assert_abs_diff_eq!(
        q.rotate_vector(&BodyAxis::Front.vector()),
        Vector3::y(),
        epsilon = 1e-12
    );
    // The secondary body vector lies in the plane of both references, on the side of the Sun
    let up = q.rotate_vector(&BodyAxis::Up.vector());
    assert_abs_diff_eq!(up.dot(&Vector3::y().cross(&sun_dir)), 0.0, epsilon = 1e-12);
    assert!(up.dot(&sun_dir) > 0.0);
}

#[rstest]
fn collinear_references(leo: Orbit, mut sc_1900: Spacecraft) {
    let triad = Triad::new(
        BodyAxis::Down.vector(),
        OrbitalDirection::Nadir.into(),
        BodyAxis::Front.vector(),
        OrbitalDirection::Zenith.into(),
    )
    .unwrap();
    let (mut plan, handle) =
        attitude_plan(Arc::new(LocalOnly), AttitudeManeuver::Triad(triad), leo.epoch);

    let err = plan.try_execute(handle, &leo, &mut sc_1900).unwrap_err();
    assert!(matches!(
        err,
        ManeuverError::CollinearVectors {
            what: "reference",
            ..
        }
    ));
    assert!(!plan.get(handle).unwrap().is_executed());
}

#[rstest]
fn instrument_pointing(leo: Orbit, sc_1900: Spacecraft) {
    let _ = pretty_env_logger::try_init();

    // Camera looking out of the right side of the spacecraft
    let camera = Instrument::new(
        "camera",
        Vector3::z(),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2),
    );
    assert_abs_diff_eq!(
        camera.boresight_in_spacecraft_frame(),
        BodyAxis::Right.vector(),
        epsilon = 1e-12
    );
    let mut sc = sc_1900.with_instrument(camera);

    let (mut plan, handle) = attitude_plan(
        Arc::new(LocalOnly),
        AttitudeManeuver::instrument_pointing("camera", OrbitalDirection::Nadir.into()),
        leo.epoch,
    );
    let q = plan.try_execute(handle, &leo, &mut sc).unwrap().orientation;
    assert_abs_diff_eq!(
        q.rotate_vector(&BodyAxis::Right.vector()),
        Vector3::new(-1.0, 0.0, 0.0),
        epsilon = 1e-12
    );

    let (mut plan, handle) = attitude_plan(
        Arc::new(LocalOnly),
        AttitudeManeuver::instrument_pointing("telescope", OrbitalDirection::Nadir.into()),
        leo.epoch,
    );
    assert_eq!(
        plan.try_execute(handle, &leo, &mut sc).unwrap_err(),
        ManeuverError::UnknownInstrument {
            name: "telescope".to_string()
        }
    );
}

#[rstest]
fn single_instrument_triad(leo: Orbit, mut sc_1900: Spacecraft) {
    let _ = pretty_env_logger::try_init();

    // Boresight out of the right side, detector reference toward the bottom
    let camera = Instrument::new(
        "camera",
        Vector3::z(),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f64::consts::FRAC_PI_2),
    )
    .with_ref_vector(Vector3::x());
    assert_abs_diff_eq!(
        camera.ref_vector_in_spacecraft_frame().unwrap(),
        BodyAxis::Down.vector(),
        epsilon = 1e-12
    );

    let triad = Triad::from_instrument(
        &camera,
        OrbitalDirection::Nadir.into(),
        OrbitalDirection::Prograde.into(),
    )
    .unwrap();
    let (mut plan, handle) =
        attitude_plan(Arc::new(LocalOnly), AttitudeManeuver::Triad(triad), leo.epoch);
    let q = plan.try_execute(handle, &leo, &mut sc_1900).unwrap().orientation;
    assert_abs_diff_eq!(
        q.rotate_vector(&BodyAxis::Right.vector()),
        -Vector3::x(),
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(
        q.rotate_vector(&BodyAxis::Down.vector()),
        Vector3::y(),
        epsilon = 1e-12
    );

    let no_ref = Instrument::new("radar", Vector3::z(), UnitQuaternion::identity());
    assert_eq!(
        Triad::from_instrument(
            &no_ref,
            OrbitalDirection::Nadir.into(),
            OrbitalDirection::Prograde.into(),
        )
        .unwrap_err(),
        ManeuverError::InvalidBodyVector {
            which: "instrument reference"
        }
    );
}

#[rstest]
fn celestial_needs_ephemeris(leo: Orbit, mut sc_1900: Spacecraft) {
    let (mut plan, handle) = attitude_plan(
        Arc::new(LocalOnly),
        AttitudeManeuver::celestial(Bodies::Luna),
        leo.epoch,
    );
    assert!(matches!(
        plan.try_execute(handle, &leo, &mut sc_1900),
        Err(ManeuverError::ManeuverAstro { .. })
    ));

    let (mut plan, handle) = attitude_plan(
        Arc::new(KeplerianEphemeris::earth_moon_sun().unwrap()),
        AttitudeManeuver::celestial(Bodies::Luna),
        leo.epoch,
    );
    assert!(plan.try_execute(handle, &leo, &mut sc_1900).is_ok());
}
