#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod dataset;
mod manifest;
mod ops;
mod prelude;
mod quantity;
mod synthetic;
mod tables;
mod tariff;
mod timestamp;

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command},
    prelude::*,
};

#[tokio::main]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    let args = Args::parse();

    match args.command {
        Command::Simulate(args) => args.run()?,
        Command::Sweep(args) => args.run().await?,
        Command::Fetch(args) => args.run().await?,
        Command::Generate(args) => args.run()?,
    }

    info!("done!");
    Ok(())
}
