//! The controller's car registry and admission/selection logic (spec §3
//! "Controller car registry", §4.E "Admission"/"Car selection").

use std::sync::Arc;

use tokio::sync::{Mutex, Notify, RwLock};

use elevator_core::{CarStatus, Floor};

use crate::queue::CallQueue;

/// Immutable facts about a car, sent once in its `CAR` greeting.
#[derive(Debug, Clone)]
pub struct CarDescriptor {
    pub name: String,
    pub lowest: Floor,
    pub highest: Floor,
}

impl CarDescriptor {
    /// Whether both `src` and `dst` lie within this car's serviceable
    /// range (spec §4.E admission rule).
    pub fn serviceable(&self, src: Floor, dst: Floor) -> bool {
        src.within(self.lowest, self.highest) && dst.within(self.lowest, self.highest)
    }
}

/// The controller's last-observed mutable mirror of a car's state,
/// updated by the status-checker subtask.
#[derive(Debug, Clone)]
pub struct CarMirror {
    pub current_floor: Floor,
    pub destination_floor: Floor,
    pub status: CarStatus,
}

impl CarMirror {
    /// Whether the car is idle at its destination, or about to re-idle
    /// after arrival (spec §4.E dispatch rule part (a)).
    pub fn ready_for_dispatch(&self) -> bool {
        self.current_floor == self.destination_floor || matches!(self.status, CarStatus::Opening)
    }
}

/// One registered, still-connected car: its descriptor, mirror, stop
/// queue, and the channel the dispatcher uses to hand it `FLOOR` frames.
/// The registry lock guards membership; this entry's own locks guard the
/// mirror and queue — strictly ordered registry-then-queue (spec §5).
pub struct CarEntry {
    pub descriptor: CarDescriptor,
    pub mirror: RwLock<CarMirror>,
    pub queue: Mutex<CallQueue>,
    /// Woken whenever the mirror or queue changes, so the dispatcher does
    /// not need to busy-poll.
    pub notify: Notify,
}

/// All currently-connected cars, in registration order (selection picks
/// "first serviceable in registration order", spec §4.E, §9).
#[derive(Default)]
pub struct Registry {
    cars: RwLock<Vec<Arc<CarEntry>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, entry: Arc<CarEntry>) {
        self.cars.write().await.push(entry);
    }

    /// Drops a car from the grid on disconnect, `EMERGENCY`, or
    /// `INDIVIDUAL SERVICE` (spec §4.E "Emergency/service exit").
    pub async fn remove(&self, name: &str) {
        self.cars.write().await.retain(|c| c.descriptor.name != name);
    }

    /// The first serviceable car for `(src, dst)`, in registration order,
    /// or `None` if every registered car's range excludes either floor
    /// (spec §4.E admission + selection).
    pub async fn select(&self, src: Floor, dst: Floor) -> Option<Arc<CarEntry>> {
        self.cars
            .read()
            .await
            .iter()
            .find(|c| c.descriptor.serviceable(src, dst))
            .cloned()
    }

    pub async fn snapshot_names(&self) -> Vec<String> {
        self.cars.read().await.iter().map(|c| c.descriptor.name.clone()).collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
