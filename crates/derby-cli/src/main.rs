//! `derby`: runs a headless crash derby and prints the final state as JSON.
//!
//! Example:
//!   derby --seed 7 --duration-ms 30000 \
//!     --spawn sedan --spawn cop --spawn tank \
//!     --command 5000:toggle-sirens --command 8000:spawn:moto
//!
//! Set `RUST_LOG=derby_core=debug` to follow collisions as they happen.

mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use derby_core::{Derby, DerbyConfig, DerbyEvent, VehicleKind};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use script::Command;

#[derive(Parser, Debug)]
#[command(name = "derby", version, about = "Headless crash derby simulation")]
struct Args {
    /// JSON configuration file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for spawn positions (overrides the configuration)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Simulated time to run, in milliseconds
    #[arg(short, long, default_value_t = 10_000)]
    duration_ms: u64,

    /// Vehicle to spawn at t=0 (sedan, police, motorcycle, tank or an alias)
    #[arg(long = "spawn", value_name = "KIND")]
    spawns: Vec<VehicleKind>,

    /// Timed command `<ms>:<action>[:<kind>]`; actions are spawn,
    /// shift-gears and toggle-sirens
    #[arg(long = "command", value_name = "COMMAND")]
    commands: Vec<Command>,

    /// Pretty-print the JSON snapshot
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "derby_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DerbyConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => DerbyConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut derby = Derby::new(config).context("creating derby")?;
    for kind in &args.spawns {
        derby
            .spawn(*kind)
            .with_context(|| format!("spawning {kind}"))?;
    }

    let mut commands = args.commands.clone();
    commands.sort_by_key(|c| c.at_ms);
    for command in &commands {
        if command.at_ms > args.duration_ms {
            warn!(at_ms = command.at_ms, "command after end of run skipped");
            continue;
        }
        derby.run_until(command.at_ms);
        command
            .apply(&mut derby)
            .with_context(|| format!("running {:?} at {} ms", command.action, command.at_ms))?;
        log_events(derby.drain_events());
    }

    derby.run_until(args.duration_ms);
    log_events(derby.drain_events());

    let snapshot = derby.snapshot();
    info!(
        now_ms = snapshot.now_ms,
        ticks = snapshot.tick_count,
        survivors = snapshot.vehicles.len(),
        "derby finished"
    );

    let json = if args.pretty {
        serde_json::to_string_pretty(&snapshot)?
    } else {
        serde_json::to_string(&snapshot)?
    };
    println!("{json}");
    Ok(())
}

fn log_events(events: Vec<DerbyEvent>) {
    for event in events {
        debug!(?event, "derby event");
    }
}
