// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

/// `safety <name>` — attaches `/car<name>` and runs until killed (spec §6).
#[derive(Debug, Clone, Parser)]
#[command(name = "safety", version, about = "Elevator safety monitor")]
pub struct Config {
    pub name: String,
}
