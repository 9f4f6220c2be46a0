//! The door loop: drives `status` through `Opening -> Open -> Closing ->
//! Closed`, and handles button effects (spec §4.C, §4.G `open`/`close`).
//!
//! This runs on a blocking thread ([`tokio::task::spawn_blocking`] from
//! `lib.rs`) because the shared region's condvar wait is a raw pthread
//! call, not an async one — the same reason the original process used a
//! dedicated thread per loop.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use elevator_core::shm::CarRegion;
use elevator_core::CarStatus;

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
        let service = fields.individual_service_mode == 1;
        let status: CarStatus = fields.status.parse().unwrap_or(CarStatus::Closed);

        if fields.open_button == 1 {
            let mut restart_dwell = false;
            region.mutate(|f| {
                f.open_button = 0;
                let cur: CarStatus = f.status.parse().unwrap_or(CarStatus::Closed);
                match cur {
                    CarStatus::Closing | CarStatus::Closed => {
                        f.status = if service { CarStatus::Open } else { CarStatus::Opening }.to_string();
                        restart_dwell = true;
                    }
                    // Open in non-service mode: restart the dwell timer.
                    CarStatus::Open if !service => restart_dwell = true,
                    // Opening/Between, or Open in service mode: true no-op,
                    // the in-flight dwell (if any) must keep its deadline.
                    _ => {}
                }
            });
            if restart_dwell {
                deadline = None;
            }
            continue;
        }

        if fields.close_button == 1 {
            let mut restart_dwell = false;
            region.mutate(|f| {
                f.close_button = 0;
                f.early_exit = 0;
                if f.status == CarStatus::Open.to_string() {
                    f.status = if service { CarStatus::Closed } else { CarStatus::Closing }.to_string();
                    restart_dwell = true;
                }
            });
            if restart_dwell {
                deadline = None;
            }
            continue;
        }

        match status {
            CarStatus::Closed | CarStatus::Between => {
                deadline = None;
                region.wait(None);
            }
            CarStatus::Open if service => {
                // No auto-sequence in individual service; only the close
                // verb (handled above) moves the door from here.
                deadline = None;
                region.wait(None);
            }
            CarStatus::Opening | CarStatus::Open | CarStatus::Closing => {
                let dl = *deadline.get_or_insert_with(|| Instant::now() + delay);
                let remaining = dl.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    region.mutate(|f| {
                        let cur: CarStatus = f.status.parse().unwrap_or(CarStatus::Closed);
                        f.status = match cur {
                            CarStatus::Opening => CarStatus::Open,
                            CarStatus::Open => CarStatus::Closing,
                            CarStatus::Closing => CarStatus::Closed,
                            other => other,
                        }
                        .to_string();
                    });
                    deadline = None;
                } else {
                    region.wait(Some(remaining));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "door_tests.rs"]
mod tests;
