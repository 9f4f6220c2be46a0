// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, ValueEnum};

/// `internal <name> <verb>` — one mutation under the lock, then exit
/// (spec §4.G, §6).
#[derive(Debug, Clone, Parser)]
#[command(name = "internal", version, about = "Elevator internal operator panel")]
pub struct Config {
    pub name: String,
    #[arg(value_enum)]
    pub verb: Verb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Verb {
    Open,
    Close,
    Stop,
    ServiceOn,
    ServiceOff,
    Up,
    Down,
}
