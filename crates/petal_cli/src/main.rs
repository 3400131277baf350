//! Petal CLI
//!
//! Records a demo scene through the paint API, flushes it into the
//! headless recording host and prints what the host replayed.

mod config;
mod scenes;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use petal_core::Pipeline;
use petal_host::{RecordingHost, ReplayLog};
use tracing_subscriber::EnvFilter;

use crate::scenes::Scene;

#[derive(Parser)]
#[command(name = "petal")]
#[command(author, version, about = "Petal - deferred batched 2D drawing pipeline", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct PipelineArgs {
    /// Scene to record
    #[arg(short, long, value_enum, default_value = "flower")]
    scene: Scene,

    /// Config file, or a directory containing petal.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the tape capacity
    #[arg(long)]
    capacity: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every canvas call the host replayed, per surface
    Replay {
        #[command(flatten)]
        args: PipelineArgs,

        /// Print the log as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print flush count and per-opcode record counts
    Stats {
        #[command(flatten)]
        args: PipelineArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Replay { args, json } => cmd_replay(args, json),
        Commands::Stats { args } => cmd_stats(args),
    }
}

/// Build a pipeline over a recording host, draw `args.scene` and return the log
fn record(args: &PipelineArgs) -> Result<ReplayLog> {
    let config = config::load(args.config.as_deref(), args.capacity)?;
    let host = RecordingHost::new(&config);
    let log = host.log();
    let pipeline = Pipeline::new(config, host).context("Failed to create pipeline")?;

    tracing::info!(scene = ?args.scene, capacity = pipeline.capacity(), "recording scene");
    args.scene.draw(&pipeline)?;
    tracing::info!(batches = pipeline.rollovers(), "scene flushed");
    Ok(log)
}

fn cmd_replay(args: PipelineArgs, json: bool) -> Result<()> {
    let log = record(&args)?;

    if json {
        println!("{}", log.to_json().context("Failed to serialize replay log")?);
        return Ok(());
    }

    for (id, info) in log.surfaces() {
        println!("surface {id}: {}x{}", info.width, info.height);
    }
    for logged in log.calls() {
        println!("[{}] #{} {}", logged.context, logged.batch, logged.call);
    }
    Ok(())
}

fn cmd_stats(args: PipelineArgs) -> Result<()> {
    let log = record(&args)?;
    let stats = log.stats();

    println!("batches:          {}", stats.batches);
    println!("records:          {}", stats.records);
    println!("applied:          {}", stats.applied);
    println!("ignored:          {}", stats.ignored);
    println!("missing surface:  {}", stats.missing_surface);
    println!();
    for (op, count) in log.opcode_counts() {
        match op {
            Ok(op) => println!("{:<20} {count}", op.name()),
            Err(raw) => println!("{:<20} {count}", format!("unknown({raw})")),
        }
    }
    Ok(())
}
