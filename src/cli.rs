mod battery;
mod fetch;
mod generate;
mod simulate;
mod sweep;
mod tariff;

use clap::{Parser, Subcommand};

pub use self::{
    fetch::FetchArgs,
    generate::GenerateArgs,
    simulate::SimulateArgs,
    sweep::SweepArgs,
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
#[must_use]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay the metering data through the battery model.
    #[clap(name = "simulate")]
    Simulate(Box<SimulateArgs>),

    /// Compare several battery capacities on the same metering data.
    #[clap(name = "sweep")]
    Sweep(Box<SweepArgs>),

    /// Download the hourly metering data from Shelly Cloud.
    #[clap(name = "fetch")]
    Fetch(Box<FetchArgs>),

    /// Generate synthetic hourly metering data.
    #[clap(name = "generate")]
    Generate(Box<GenerateArgs>),
}
