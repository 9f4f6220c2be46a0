// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use elevator_internal::config::Config;

fn main() {
    let config = Config::parse();
    if let Err(e) = elevator_internal::run(config) {
        println!("{e}");
        std::process::exit(e.exit_code());
    }
}
