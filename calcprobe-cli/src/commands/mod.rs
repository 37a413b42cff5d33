// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod list;
pub mod run;

use calcprobe_core::config::{validate_timeout, validate_url};
use calcprobe_core::{Config, ConfigLoader, Iterations, Parallelism};

use crate::Cli;

/// Load the configuration file (or defaults) and apply command-line
/// overrides on top of it.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::defaults(),
    };

    if let Some(iterations) = cli.iterations {
        config.run.iterations = Iterations::new(iterations)?;
    }
    if let Some(parallel) = cli.parallel {
        config.run.parallelism = Parallelism::new(parallel)?;
    }
    if let Some(transport) = cli.transport {
        config.run.transport = transport;
    }
    if let Some(url) = &cli.http_url {
        config.http.base_url = validate_url("--http-url", url.clone())?;
    }
    if let Some(url) = &cli.rpc_url {
        config.rpc.endpoint = validate_url("--rpc-url", url.clone())?;
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeouts.request = validate_timeout("--timeout-ms", ms)?;
    }

    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}
