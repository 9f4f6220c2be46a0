// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four wake-time rules (spec §4.F) plus the byte-level stdout writer
//! they report through. Grounded on `original_source/safety.c`'s
//! `custom_print`: a raw `write(2)` of a static string, never `println!`,
//! so the monitor never takes an allocator or stdio lock on its hot path.

use elevator_core::consistency::{is_consistent, CarSnapshot};
use elevator_core::shm::CarFields;
use elevator_core::CarStatus;

/// One of the three human-readable alerts the monitor can raise. Printed
/// after the lock is released, in the order the rules are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alert {
    EmergencyStop,
    Overload,
    ConsistencyError,
}

impl Alert {
    fn message(self) -> &'static str {
        match self {
            Alert::EmergencyStop => "The emergency stop button has been pressed!\n",
            Alert::Overload => "The overload sensor has been tripped!\n",
            Alert::ConsistencyError => "Data consistency error!\n",
        }
    }
}

/// Applies rules 1-4 to a locked, mutable view of the region, in order.
/// Returns the alerts that fired so the caller can print them once the
/// lock is released.
pub fn apply_rules(fields: &mut CarFields) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if fields.door_obstruction == 1 && fields.status == CarStatus::Closing.to_string() {
        fields.status = CarStatus::Opening.to_string();
    }

    if fields.emergency_stop == 1 && fields.emergency_mode == 0 {
        fields.emergency_mode = 1;
        alerts.push(Alert::EmergencyStop);
    }

    if fields.overload == 1 && fields.emergency_mode == 0 {
        fields.emergency_mode = 1;
        alerts.push(Alert::Overload);
    }

    if !is_consistent(&snapshot_of(fields)) {
        fields.emergency_mode = 1;
        alerts.push(Alert::ConsistencyError);
    }

    alerts
}

fn snapshot_of(fields: &CarFields) -> CarSnapshot {
    CarSnapshot {
        current_floor: fields.current_floor.clone(),
        destination_floor: fields.destination_floor.clone(),
        status: fields.status.clone(),
        open_button: fields.open_button,
        close_button: fields.close_button,
        door_obstruction: fields.door_obstruction,
        overload: fields.overload,
        emergency_stop: fields.emergency_stop,
        individual_service_mode: fields.individual_service_mode,
        emergency_mode: fields.emergency_mode,
        lowest_floor: fields.lowest_floor,
        highest_floor: fields.highest_floor,
    }
}

/// Writes `alert`'s message directly to stdout via `write(2)`. Ignores
/// write failures, matching `custom_print`'s best-effort behavior.
pub fn print_alert(alert: Alert) {
    let msg = alert.message();
    unsafe {
        libc::write(libc::STDOUT_FILENO, msg.as_ptr().cast(), msg.len());
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
