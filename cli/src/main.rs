//! onthisday - export "this day in family history" pages from a Gramps tree

mod commands;
mod state;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use history::Config;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(
    name = "onthisday",
    about = "Write one JSON file of family history per calendar day",
    version
)]
struct Cli {
    /// Config file (default: ./onthisday.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export every day that has events
    Export {
        /// Gramps XML file (.gramps, gzip or plain) or a .json/.bin snapshot
        database: PathBuf,
        /// Output directory, overrides the config value
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Delete existing events_*.json first
        #[arg(long)]
        clean: bool,
    },
    /// Print the events of one day
    Day {
        database: PathBuf,
        /// Day as MM-DD
        #[arg(value_name = "MM-DD")]
        day: String,
        #[arg(long)]
        json: bool,
    },
    /// Counts and busiest days
    Stats {
        database: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Save a parsed tree as a snapshot (.json or .bin)
    Convert {
        database: PathBuf,
        snapshot: PathBuf,
    },
    /// Write a generated tree to a snapshot
    Sample {
        snapshot: PathBuf,
        #[arg(long, default_value_t = 200)]
        people: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Share of people who get a death record
        #[arg(long, default_value_t = 0.75)]
        deceased_ratio: f64,
    },
}

fn log_level(verbose: u8, config: &Config) -> anyhow::Result<Level> {
    match verbose {
        0 => match &config.log_level {
            Some(name) => Level::from_str(name)
                .map_err(|_| anyhow::anyhow!("unknown log_level '{}' in config", name)),
            None => Ok(Level::INFO),
        },
        1 => Ok(Level::DEBUG),
        _ => Ok(Level::TRACE),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to load config")?;

    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose, &config)?)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Command::Export {
            database,
            output,
            clean,
        } => {
            let out_dir = output.unwrap_or_else(|| config.output_dir.clone());
            commands::export::run(&database, &out_dir, clean, &config)
        }
        Command::Day {
            database,
            day,
            json,
        } => commands::day::run(&database, &day, json, &config),
        Command::Stats { database, json } => commands::stats::run(&database, json, &config),
        Command::Convert { database, snapshot } => commands::convert::run(&database, &snapshot),
        Command::Sample {
            snapshot,
            people,
            seed,
            deceased_ratio,
        } => commands::sample::run(&snapshot, people, seed, deceased_ratio),
    }
}
