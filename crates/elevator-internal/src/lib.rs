// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `internal <name> <verb>`: a short-lived CLI that attaches a car's
//! shared region, performs one mutation under the lock, and exits
//! (spec §4.G, §6).

pub mod config;
pub mod verbs;

use elevator_core::shm::CarRegion;
use elevator_core::ElevatorError;

use config::Config;

pub fn run(config: Config) -> Result<(), ElevatorError> {
    let region = CarRegion::attach(&config.name)?;
    let mut outcome = Ok(());
    region.mutate(|fields| outcome = verbs::apply(fields, config.verb));
    outcome
}
