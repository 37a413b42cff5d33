// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! calcprobe CLI
//!
//! Runs the conformance suite against the pension calculation service over
//! HTTP, gRPC or both, and prints pass/fail detail, latency statistics and
//! the cross-binding comparison.

use std::path::PathBuf;
use std::process::ExitCode;

use calcprobe_core::TransportSelection;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

/// calcprobe - Conformance and latency harness for the pension calculation service
#[derive(Debug, Parser)]
#[command(name = "calcprobe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of times each scenario runs [default: 1]
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u64).range(1..))]
    pub iterations: Option<u64>,

    /// Maximum concurrent requests [default: 20]
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Bindings to exercise: http, rpc or both [default: http]
    #[arg(short, long)]
    pub transport: Option<TransportSelection>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the HTTP binding
    #[arg(long)]
    pub http_url: Option<String>,

    /// Endpoint of the gRPC binding
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Only run scenarios whose name contains this text (repeatable)
    #[arg(short, long = "scenario")]
    pub scenarios: Vec<String>,

    /// Directory to write a JSON suite report into
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List the scenarios and exit
    #[arg(long)]
    pub list: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.list {
        commands::list::execute(&cli.scenarios)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = commands::resolve_config(&cli)?;
    commands::run::execute(config, &cli.scenarios, cli.output.as_deref()).await
}
