//! batch-sched v0.1 — entry point.
//!
//! ```text
//! batch-sched FCFS <manifest-file>
//! batch-sched RR <quantum-ms> <manifest-file>
//! ```
//!
//! Tracing logs go to stderr; console reports (spec §6) go to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use batch_sched::descriptor::DescriptorStore;
use batch_sched::error::BadArguments;
use batch_sched::policy::{fcfs, round_robin, Scheduler};
use batch_sched::queue::Queue;
use batch_sched::{events, manifest};

#[derive(Debug, Parser)]
#[command(name = "batch-sched")]
#[command(about = "Batch process scheduler: FCFS or Round-Robin over a manifest of executables")]
struct Cli {
    /// Increase log verbosity (-v, -vv); logs go to stderr.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    policy: Policy,
}

#[derive(Debug, Subcommand)]
enum Policy {
    /// Run every workload to completion before starting the next.
    #[command(name = "FCFS")]
    Fcfs {
        /// Path to the manifest file (one executable route per line).
        manifest_file: String,
    },
    /// Time-slice workloads across a shared ready queue.
    #[command(name = "RR")]
    Rr {
        /// Quantum in milliseconds; must be a positive integer.
        quantum_ms: i64,
        /// Path to the manifest file (one executable route per line).
        manifest_file: String,
    },
}

fn main() {
    // clap's own usage/exit-2 convention is overridden below so that every
    // argument-validation failure exits 1, per spec §6.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    };

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    if let Err(e) = run(cli.policy) {
        if let Some(bad_args) = e.downcast_ref::<BadArguments>() {
            println!("{bad_args}");
            std::process::exit(1);
        }
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(policy: Policy) -> Result<()> {
    let mut store = DescriptorStore::new();
    let mut ready = Queue::new();

    match policy {
        Policy::Fcfs { manifest_file } => {
            manifest::load(manifest_file.as_ref(), &mut store, &mut ready)?;
            let events = events::spawn_router()?;
            let mut sched = Scheduler::new(store, ready, events);
            fcfs::run(&mut sched)?;
        }
        Policy::Rr {
            quantum_ms,
            manifest_file,
        } => {
            if quantum_ms <= 0 {
                return Err(BadArguments(
                    "Invalid quantum value. It must be a positive integer.".to_string(),
                )
                .into());
            }
            manifest::load(manifest_file.as_ref(), &mut store, &mut ready)?;
            let events = events::spawn_router()?;
            let mut sched = Scheduler::new(store, ready, events);
            round_robin::run(&mut sched, quantum_ms as u64)?;
        }
    }
    Ok(())
}
