//! # Maelstrom Sim
//!
//! Headless harness for the Maelstrom gameplay helpers.
//!
//! Loads a scenario file, spawns its entities into a sandbox world, runs the
//! declared area impacts and leaps, and prints a JSON report.
//!
//! Usage: `maelstrom-sim <scenario.toml> [config.toml]`, or
//! `maelstrom-sim --init-config` to write a default `maelstrom.toml`.
//! The config's `log_filter` is added on top of `RUST_LOG`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod scenario;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::SimConfig;
use crate::scenario::Scenario;

/// Main entry point.
fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let scenario_path = args
        .next()
        .context("usage: maelstrom-sim <scenario.toml> [config.toml] | --init-config")?;

    // Config is read before the subscriber exists, so its own load messages are dropped
    let mut config = if scenario_path == "--init-config" {
        SimConfig::default()
    } else {
        args.next().map_or_else(SimConfig::load, SimConfig::load_from)
    };
    let reset = config.validate();

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(config.log_filter.parse()?))
        .init();

    info!("Maelstrom sim starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    for field in reset {
        warn!("Invalid {field} in config, using default");
    }

    if scenario_path == "--init-config" {
        config.save_to(config::CONFIG_FILE)?;
        return Ok(());
    }

    let scenario = Scenario::load(&scenario_path)
        .with_context(|| format!("failed to load scenario {scenario_path}"))?;
    let report = scenario.run(&config).context("scenario run failed")?;

    let json = if config.pretty_output {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");

    info!("Maelstrom sim finished");
    Ok(())
}
