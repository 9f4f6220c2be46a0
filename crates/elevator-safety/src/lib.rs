// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The safety monitor: a dedicated process per car that wakes on the
//! shared condvar and enforces rules 1-4 (spec §4.F). Runs until killed;
//! it never exits of its own accord.

pub mod config;
pub mod monitor;

use tokio_util::sync::CancellationToken;
use tracing::info;

use elevator_core::shm::CarRegion;

use config::Config;

pub fn run(config: Config, shutdown: CancellationToken) -> anyhow::Result<()> {
    let region = CarRegion::attach(&config.name)?;
    info!(car = %config.name, "safety monitor attached");
    monitor_loop(&region, &shutdown);
    Ok(())
}

fn monitor_loop(region: &CarRegion, shutdown: &CancellationToken) {
    loop {
        if shutdown.is_cancelled() {
            return;
        }
        region.wait(None);
        if shutdown.is_cancelled() {
            return;
        }

        let mut alerts = Vec::new();
        region.mutate(|fields| alerts = monitor::apply_rules(fields));
        for alert in alerts {
            monitor::print_alert(alert);
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
