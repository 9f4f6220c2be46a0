// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The car process: owns `/car<name>`, runs the door and movement loops on
//! blocking threads, and keeps a controller connection alive (spec §4.C).

pub mod config;
pub mod door;
pub mod link;
pub mod movement;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use elevator_core::shm::CarRegion;
use elevator_core::ElevatorError;

use config::Config;

pub async fn run(config: Config, shutdown: CancellationToken) -> anyhow::Result<()> {
    if config.delay_ms < 1 {
        return Err(ElevatorError::Validation("delayMs must be >= 1".into()).into());
    }
    if config.lowest > config.highest {
        return Err(ElevatorError::Validation("lowest floor must not exceed highest floor".into()).into());
    }

    let region = Arc::new(CarRegion::create(&config.name, config.lowest, config.highest)?);
    info!(car = %config.name, lowest = %config.lowest, highest = %config.highest, "car started");
    let delay = Duration::from_millis(config.delay_ms);

    let door_region = Arc::clone(&region);
    let door_shutdown = shutdown.clone();
    let door_handle = tokio::task::spawn_blocking(move || door::run(&door_region, delay, &door_shutdown));

    let movement_region = Arc::clone(&region);
    let movement_shutdown = shutdown.clone();
    let movement_handle =
        tokio::task::spawn_blocking(move || movement::run(&movement_region, delay, &movement_shutdown));

    let link_handle = tokio::spawn(link::run(
        Arc::clone(&region),
        config.name.clone(),
        config.lowest,
        config.highest,
        delay,
        shutdown.clone(),
    ));

    shutdown.cancelled().await;
    region.mutate(|_| {});
    let _ = tokio::join!(door_handle, movement_handle, link_handle);
    Ok(())
}
