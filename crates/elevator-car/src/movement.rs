//! The movement loop: steps `current_floor` toward `destination_floor` one
//! axis position at a time via `Between` (spec §4.C), used both for
//! controller-dispatched destinations and individual-service `up`/`down`
//! retargeting — the two differ only in whether arrival auto-opens the
//! door.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use elevator_core::shm::CarRegion;
use elevator_core::{CarStatus, Floor};

pub fn run(region: &CarRegion, delay: Duration, shutdown: &CancellationToken) {
    let mut deadline: Option<Instant> = None;
    loop {
        if shutdown.is_cancelled() {
            return;
        }
        let fields = region.snapshot();
        if fields.emergency_mode == 1 {
            return;
        }

        let current: Floor = fields.current_floor.parse().unwrap_or(Floor::Surface(1));
        let destination: Floor = fields.destination_floor.parse().unwrap_or(current);
        let status: CarStatus = fields.status.parse().unwrap_or(CarStatus::Closed);
        let service = fields.individual_service_mode == 1;

        if current == destination {
            deadline = None;
            if status == CarStatus::Closed && !service {
                region.mutate(|f| f.status = CarStatus::Opening.to_string());
            } else {
                region.wait(None);
            }
            continue;
        }

        if status == CarStatus::Between {
            let dl = *deadline.get_or_insert_with(|| Instant::now() + delay);
            let remaining = dl.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                region.mutate(|f| {
                    let cur: Floor = f.current_floor.parse().unwrap_or(current);
                    let dest: Floor = f.destination_floor.parse().unwrap_or(cur);
                    f.current_floor = cur.step_toward(dest).to_string();
                    f.status = CarStatus::Closed.to_string();
                });
                deadline = None;
            } else {
                region.wait(Some(remaining));
            }
            continue;
        }

        if status == CarStatus::Closed {
            region.mutate(|f| f.status = CarStatus::Between.to_string());
            deadline = Some(Instant::now() + delay);
            continue;
        }

        // Door is mid-sequence (Opening/Open/Closing): wait for the door
        // loop to return it to Closed before starting a new move.
        deadline = None;
        region.wait(None);
    }
}

#[cfg(test)]
#[path = "movement_tests.rs"]
mod tests;
