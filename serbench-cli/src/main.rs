// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Serbench Contributors

//! Serbench CLI
//!
//! Command-line interface for the serialization benchmark harness.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Serbench - throughput comparison for JSON serialization engines
#[derive(Parser)]
#[command(name = "serbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run configuration file path (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the benchmark matrix and print the comparison table
    Run {
        /// Datasets to benchmark (comma-separated fixture names)
        #[arg(long, value_delimiter = ',')]
        datasets: Option<Vec<String>>,

        /// Adapters to benchmark (comma-separated identifiers)
        #[arg(long, value_delimiter = ',')]
        adapters: Option<Vec<String>>,

        /// Serialization modes (typed, generic)
        #[arg(long, value_delimiter = ',')]
        modes: Option<Vec<String>>,

        /// Warm-up iteration count
        #[arg(long)]
        warmup_iterations: Option<u64>,

        /// Warm-up duration bound in milliseconds
        #[arg(long)]
        warmup_ms: Option<u64>,

        /// Measurement iteration count
        #[arg(long)]
        iterations: Option<u64>,

        /// Measurement duration bound in milliseconds
        #[arg(long)]
        duration_ms: Option<u64>,

        /// Per-target wall-clock budget in milliseconds
        #[arg(long)]
        budget_ms: Option<u64>,

        /// Isolation mode: process or in-process
        #[arg(long)]
        isolation: Option<String>,

        /// Write the full report as JSON to this path
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// List available fixtures and adapters
    List,

    /// Internal: run one target in an isolated child process
    #[command(hide = true)]
    Worker {
        /// Target specification as JSON
        #[arg(long)]
        spec: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the report table and the worker
    // protocol.
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            datasets,
            adapters,
            modes,
            warmup_iterations,
            warmup_ms,
            iterations,
            duration_ms,
            budget_ms,
            isolation,
            log,
        } => commands::run::execute(commands::run::RunArgs {
            config_path: cli.config,
            datasets,
            adapters,
            modes,
            warmup_iterations,
            warmup_ms,
            iterations,
            duration_ms,
            budget_ms,
            isolation,
            log,
        }),
        Commands::List => commands::list::execute(),
        Commands::Worker { spec } => commands::worker::execute(&spec),
    }
}
