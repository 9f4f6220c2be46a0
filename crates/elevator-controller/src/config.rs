//! Controller CLI surface — the controller takes no positional arguments
//! (spec §6: "`controller` (no args). Exits only on signal. Listens on
//! `:3000`."); this struct exists so the binary follows the same
//! `clap::Parser` + `RUST_LOG` conventions as every other binary in the
//! workspace.

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "controller", version, about = "Elevator dispatch controller")]
pub struct Config {}
