//! The data-consistency predicate the safety monitor evaluates on every
//! wake (spec §3 I1-I5, §4.F rule 4). Kept separate from [`crate::shm`] so
//! it can be exercised without a real shared-memory region.

use crate::floor::Floor;
use crate::wire::CarStatus;

/// A point-in-time view of everything the consistency predicate needs.
/// Floor and status fields are the *raw* text the region carries, since
/// the whole point of the checks is that they might not parse.
#[derive(Debug, Clone)]
pub struct CarSnapshot {
    pub current_floor: String,
    pub destination_floor: String,
    pub status: String,
    pub open_button: u8,
    pub close_button: u8,
    pub door_obstruction: u8,
    pub overload: u8,
    pub emergency_stop: u8,
    pub individual_service_mode: u8,
    pub emergency_mode: u8,
    pub lowest_floor: Floor,
    pub highest_floor: Floor,
}

/// Evaluates I1-I5 against `snapshot`. Once `emergency_mode == 1` the
/// region is already latched and not expected to describe a live car, so
/// — matching the reference implementation — the predicate short-circuits
/// to consistent; this is the only place `emergency_mode` is read as a
/// gate rather than validated as a bit.
pub fn is_consistent(snapshot: &CarSnapshot) -> bool {
    if snapshot.emergency_mode == 1 {
        return true;
    }

    let bits = [
        snapshot.open_button,
        snapshot.close_button,
        snapshot.door_obstruction,
        snapshot.overload,
        snapshot.emergency_stop,
        snapshot.individual_service_mode,
        snapshot.emergency_mode,
    ];
    if bits.iter().any(|&b| b > 1) {
        return false; // I3
    }

    let Ok(current) = snapshot.current_floor.parse::<Floor>() else { return false }; // I1
    let Ok(_destination) = snapshot.destination_floor.parse::<Floor>() else { return false }; // I1
    let Ok(status) = snapshot.status.parse::<CarStatus>() else { return false }; // I2

    if !current.within(snapshot.lowest_floor, snapshot.highest_floor) {
        return false; // I5
    }

    if snapshot.door_obstruction == 1 && !matches!(status, CarStatus::Opening | CarStatus::Closing)
    {
        return false; // I4
    }

    true
}

#[cfg(test)]
#[path = "consistency_tests.rs"]
mod tests;
