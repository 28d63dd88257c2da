extern crate mnvr_planner as mnvr;

use crate::{epoch, sc_1900, ENGINE};
use approx::assert_abs_diff_eq;
use mnvr::cosmic::{LocalOnly, Orbit, Spacecraft, EARTH_J2000};
use mnvr::io::{ConfigRepr, Configurable, ManeuverRecord, SpacecraftConfig};
use mnvr::md::{ImpulsiveManeuver, Maneuver, ManeuverPlan};
use mnvr::time::{Duration, Epoch, TimeUnits};
use rstest::*;
use std::sync::Arc;

#[rstest]
fn record_executed_maneuver(epoch: Epoch, mut sc_1900: Spacecraft) {
    let _ = pretty_env_logger::try_init();

    let mut plan = ManeuverPlan::new(Arc::new(LocalOnly));
    let handle = plan.add(
        Maneuver::impulsive(
            EARTH_J2000,
            epoch - 1.days(),
            Duration::ZERO,
            ENGINE,
            ImpulsiveManeuver::apogee_height(42_164.0),
        )
        .unwrap(),
    );

    // Not executed yet
    assert!(ManeuverRecord::from_maneuver(plan.get(handle).unwrap()).is_err());

    let leo = Orbit::cartesian(6678.0, 0.0, 0.0, 0.0, 7.727, 0.0, epoch, EARTH_J2000);
    plan.try_execute(handle, &leo, &mut sc_1900).unwrap();

    let record = ManeuverRecord::from_maneuver(plan.get(handle).unwrap()).unwrap();
    println!("{}", record.dumps().unwrap());

    assert_eq!(record.maneuver, "apogee height change to 42164 km");
    assert_eq!(record.engine, ENGINE);
    assert_abs_diff_eq!(record.fuel_burned_kg, 803.164_866_85, epsilon = 1e-6);
    assert_abs_diff_eq!(record.delta_v_norm_km_s(), 2.424_608_426_4, epsilon = 1e-6);
    assert_abs_diff_eq!(record.delta_v_km_s[0], 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(
        record.thrust_duration.to_seconds(),
        803.164_866_85 / 50.0,
        epsilon = 1e-6
    );
    // The burn starts two thirds of its duration before the maneuver epoch
    assert_eq!(record.epoch, epoch);
    assert_abs_diff_eq!(
        (record.epoch - record.thrust_start).to_seconds(),
        0.666 * record.thrust_duration.to_seconds(),
        epsilon = 1e-6
    );
}

#[rstest]
fn record_yaml_round_trip(epoch: Epoch) {
    let record = ManeuverRecord {
        maneuver: "plane alignment".to_string(),
        epoch,
        thrust_start: epoch + 1.hours(),
        thrust_duration: 2.minutes() + 30.seconds(),
        delta_v_km_s: [0.0, 0.0, -1.25],
        fuel_burned_kg: 412.5,
        engine: ENGINE.to_string(),
    };

    let yaml = record.dumps().unwrap();
    println!("{yaml}");
    let loaded = ManeuverRecord::loads(&yaml).unwrap();
    assert_eq!(loaded, record);
    assert_abs_diff_eq!(loaded.delta_v_norm_km_s(), 1.25, epsilon = 1e-12);

    assert!(ManeuverRecord::loads("maneuver: 3").is_err());
}

#[test]
fn many_spacecraft() {
    let _ = pretty_env_logger::try_init();

    let yaml = r#"
- name: sat-a
  dry_mass_kg: 500.0
  max_operating_mass_kg: 900.0
  fuel_tanks:
    - name: tank
      model: hydrazine
      serial_number: tank-a
      capacity_kg: 400.0
      quantity_kg: 350.0
  engines:
    - name: thruster
      model: monoprop
      serial_number: eng-a
      isp_s: 220.0
      fuel_flow_kg_s: 0.1
      fuel_tank: tank-a
- name: sat-b
  dry_mass_kg: 1200.0
  max_operating_mass_kg: 1200.0
"#;

    let configs = SpacecraftConfig::loads_many(yaml).unwrap();
    assert_eq!(configs.len(), 2);
    assert!(configs[1].fuel_tanks.is_empty());
    assert!(configs[1].engines.is_empty());

    let sat_a = Spacecraft::from_config(configs[0].clone()).unwrap();
    assert_eq!(sat_a.name, "sat-a");
    assert_abs_diff_eq!(sat_a.fuel_mass_kg(), 350.0, epsilon = 1e-12);
    assert_eq!(sat_a.to_config().unwrap(), configs[0]);

    let sat_b = Spacecraft::from_config(configs[1].clone()).unwrap();
    assert_abs_diff_eq!(sat_b.fuel_mass_kg(), 0.0, epsilon = 1e-12);

    // The builder produces the same configuration as the YAML
    let built = SpacecraftConfig::builder()
        .name("sat-b")
        .dry_mass_kg(1200.0)
        .max_operating_mass_kg(1200.0)
        .build();
    assert_eq!(built, configs[1]);
}
