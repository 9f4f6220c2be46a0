// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The end-to-end scenarios from spec §8, run against the real binaries.

use std::time::Duration;

use elevator_core::CarStatus;
use elevator_specs::{run_call, run_internal, stdout_of, unique_car_name, CarProcess, ControllerProcess, SafetyProcess};

const SHORT: Duration = Duration::from_secs(3);

#[test]
fn scenario_1_simple_call_moves_the_car_and_cycles_the_door_twice() -> anyhow::Result<()> {
    let _controller = ControllerProcess::start()?;
    let name = unique_car_name("simple");
    let car = CarProcess::start(&name, "1".parse()?, "10".parse()?, 40)?;

    let output = run_call("3", "7")?;
    assert_eq!(stdout_of(&output), format!("Car {name} is arriving."));
    assert!(output.status.success());

    car.wait_until(SHORT, |f| f.current_floor == "3" && f.status == CarStatus::Closed.to_string())?;
    car.wait_until(SHORT, |f| f.current_floor == "7" && f.status == CarStatus::Closed.to_string())?;
    Ok(())
}

#[test]
fn scenario_2_no_car_registered_yields_unavailable() -> anyhow::Result<()> {
    let _controller = ControllerProcess::start()?;
    let output = run_call("3", "7")?;
    assert_eq!(stdout_of(&output), "Sorry, no car is available to take this request.");
    assert!(!output.status.success());
    Ok(())
}

#[test]
fn scenario_3_out_of_range_call_yields_unavailable() -> anyhow::Result<()> {
    let _controller = ControllerProcess::start()?;
    let name = unique_car_name("narrow");
    let _car = CarProcess::start(&name, "1".parse()?, "3".parse()?, 40)?;

    let output = run_call("2", "5")?;
    assert_eq!(stdout_of(&output), "Sorry, no car is available to take this request.");
    Ok(())
}

#[test]
fn scenario_4_same_floor_call_is_rejected_without_touching_the_network() -> anyhow::Result<()> {
    // No controller running at all: if the call pad validated over the
    // network it would fail to connect rather than print this message.
    let output = run_call("4", "4")?;
    assert_eq!(stdout_of(&output), "You are already on that floor!");
    assert!(!output.status.success());
    Ok(())
}

#[test]
fn scenario_5_obstruction_during_closing_forces_a_reopen() -> anyhow::Result<()> {
    let name = unique_car_name("obstruct");
    let car = CarProcess::start(&name, "1".parse()?, "10".parse()?, 5_000)?;
    let _safety = SafetyProcess::start(&name)?;

    car.region_mutate(|f| f.status = CarStatus::Closing.to_string());
    car.region_mutate(|f| f.door_obstruction = 1);

    car.wait_until(SHORT, |f| f.status == CarStatus::Opening.to_string())?;
    Ok(())
}

#[test]
fn scenario_6_emergency_stop_latches_and_ignores_a_second_mutation() -> anyhow::Result<()> {
    let name = unique_car_name("estop");
    let car = CarProcess::start(&name, "1".parse()?, "10".parse()?, 5_000)?;
    let _safety = SafetyProcess::start(&name)?;

    car.region_mutate(|f| f.emergency_stop = 1);
    car.wait_until(SHORT, |f| f.emergency_mode == 1)?;

    let status_before = car.snapshot().status;
    car.region_mutate(|f| f.emergency_stop = 0);
    std::thread::sleep(Duration::from_millis(100));
    let fields = car.snapshot();
    assert_eq!(fields.emergency_mode, 1, "emergency latch must not clear itself");
    assert_eq!(fields.status, status_before, "status must stay frozen once latched");
    Ok(())
}

#[test]
fn scenario_8_individual_service_up_moves_one_floor_without_cycling_the_door() -> anyhow::Result<()> {
    let name = unique_car_name("service");
    let car = CarProcess::start(&name, "1".parse()?, "10".parse()?, 40)?;
    car.wait_until(SHORT, |f| f.current_floor == "1")?;

    // Park the car at floor 5 before exercising the scenario's manual move.
    car.region_mutate(|f| f.destination_floor = "5".into());
    car.wait_until(SHORT, |f| f.current_floor == "5" && f.status == CarStatus::Closed.to_string())?;

    let service_on = run_internal(&name, "service_on")?;
    assert!(service_on.status.success());

    let up = run_internal(&name, "up")?;
    assert!(up.status.success());

    let fields = car.wait_until(SHORT, |f| f.current_floor == "6")?;
    assert_eq!(fields.status, CarStatus::Closed.to_string(), "service mode must not auto-cycle the door on arrival");
    Ok(())
}
