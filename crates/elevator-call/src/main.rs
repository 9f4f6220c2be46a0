// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use elevator_call::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::parse();
    match elevator_call::run(config).await {
        Ok(message) => println!("{message}"),
        Err(e) => {
            println!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}
