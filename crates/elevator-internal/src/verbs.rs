// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seven operator verbs, applied to a locked [`CarFields`] view (spec
//! §4.G). Each verb is one field assignment except `up`/`down`, which must
//! pass legality checks — individual service, door closed, and the result
//! staying within the car's serviceable range — before committing the move.

use elevator_core::shm::CarFields;
use elevator_core::{CarStatus, ElevatorError, Floor};

use crate::config::Verb;

pub fn apply(fields: &mut CarFields, verb: Verb) -> Result<(), ElevatorError> {
    match verb {
        Verb::Open => fields.open_button = 1,
        Verb::Close => fields.close_button = 1,
        Verb::Stop => fields.emergency_stop = 1,
        Verb::ServiceOn => {
            fields.individual_service_mode = 1;
            fields.emergency_mode = 0;
        }
        Verb::ServiceOff => fields.individual_service_mode = 0,
        Verb::Up => retarget(fields, Floor::Surface(999))?,
        Verb::Down => retarget(fields, Floor::Basement(99))?,
    }
    Ok(())
}

/// `up`/`down` share one legality check and one adjacency computation;
/// `extreme` is the far end of the requested direction's axis, so
/// `Floor::step_toward` lands on the immediate neighbor.
fn retarget(fields: &mut CarFields, extreme: Floor) -> Result<(), ElevatorError> {
    let status: CarStatus = fields
        .status
        .parse()
        .map_err(|_| ElevatorError::Validation("Car status is unreadable.".into()))?;
    if fields.individual_service_mode != 1 || status != CarStatus::Closed {
        return Err(ElevatorError::Validation(
            "Car must be in individual service with the door closed to move manually.".into(),
        ));
    }
    let current: Floor = fields
        .current_floor
        .parse()
        .map_err(|_| ElevatorError::Validation("Car floor is unreadable.".into()))?;
    let next = current.step_toward(extreme);
    if !next.within(fields.lowest_floor, fields.highest_floor) {
        return Err(ElevatorError::Validation("Car is already at the end of its serviceable range.".into()));
    }
    fields.destination_floor = next.to_string();
    Ok(())
}

#[cfg(test)]
#[path = "verbs_tests.rs"]
mod tests;
