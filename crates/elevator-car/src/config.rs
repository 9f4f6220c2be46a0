//! Car CLI surface: `car <name> <lowest> <highest> <delayMs>` (spec §6).

use clap::Parser;
use elevator_core::Floor;

#[derive(Debug, Clone, Parser)]
#[command(name = "car", version, about = "Elevator car process")]
pub struct Config {
    /// Car identifier, also used for the `/car<name>` shared region.
    pub name: String,
    /// Lowest floor this car services.
    pub lowest: Floor,
    /// Highest floor this car services.
    pub highest: Floor,
    /// Door/movement step duration in milliseconds, must be >= 1.
    pub delay_ms: u64,
}
