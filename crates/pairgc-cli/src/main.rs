//! pairgc command-line driver
//!
//! Drives the VM through the demonstration scenarios, the allocation
//! stress loop and heap/stack dumps.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use pairgc_core::defaults::{DEFAULT_GC_THRESHOLD, DEFAULT_STACK_MAX};
use pairgc_core::VmOptions;

#[derive(Parser)]
#[command(name = "pairgc")]
#[command(about = "Mark-sweep garbage collector for a toy stack VM", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root stack capacity
    #[arg(long, global = true, default_value_t = DEFAULT_STACK_MAX)]
    stack_max: usize,

    /// Initial GC threshold (live objects)
    #[arg(long, global = true, default_value_t = DEFAULT_GC_THRESHOLD)]
    gc_threshold: usize,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Color output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    color: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demonstration scenarios and check their object counts
    Scenarios,

    /// Push and pop scalars in a loop, then report collector statistics
    Stress {
        /// Number of push/pop rounds
        #[arg(long, default_value_t = 1000)]
        rounds: usize,
        /// Scalars pushed per round
        #[arg(long, default_value_t = 20)]
        batch: usize,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a cyclic graph and print the heap and stack around a collection
    Dump,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let options = VmOptions {
        stack_max: cli.stack_max,
        gc_threshold: cli.gc_threshold,
    };

    match cli.command {
        Commands::Scenarios => {
            let passed = commands::scenarios::execute(&options, &cli.color)?;
            if !passed {
                std::process::exit(1);
            }
        }

        Commands::Stress {
            rounds,
            batch,
            json,
        } => {
            commands::stress::execute(
                &options,
                commands::stress::StressArgs {
                    rounds,
                    batch,
                    json,
                },
            )?;
        }

        Commands::Dump => {
            commands::dump::execute(&options)?;
        }
    }

    Ok(())
}
