// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use elevator_core::Floor;

/// `call <src> <dst>` — one connection, one `CALL`, one printed reply
/// (spec §6).
#[derive(Debug, Clone, Parser)]
#[command(name = "call", version, about = "Elevator call pad")]
pub struct Config {
    pub src: Floor,
    pub dst: Floor,
}
