// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::error;

use elevator_safety::config::Config;

fn main() {
    let config = Config::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Spec §7/§4.F: the monitor runs until killed, with no cooperative
    // shutdown path of its own; the token exists only so tests can stop it.
    if let Err(e) = elevator_safety::run(config, CancellationToken::new()) {
        error!(error = %e, "safety monitor exited with an error");
        std::process::exit(1);
    }
}
