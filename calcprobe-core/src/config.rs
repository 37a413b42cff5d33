// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict validation.
//!
//! Every section is optional; missing values fall back to the defaults of a
//! locally running calculation service. Invalid values are rejected before
//! any transport is touched.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, ProbeError, ProbeResult};
use crate::types::{Iterations, Parallelism, TransportSelection};

/// Raw HTTP binding section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawHttpConfig {
    #[serde(default = "default_http_base_url")]
    base_url: String,
    #[serde(default = "default_http_path")]
    path: String,
}

fn default_http_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_http_path() -> String {
    "/calculation-requests".to_string()
}

impl Default for RawHttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_http_base_url(),
            path: default_http_path(),
        }
    }
}

/// Raw RPC binding section.
#[derive(Debug, Deserialize)]
struct RawRpcConfig {
    #[serde(default = "default_rpc_endpoint")]
    endpoint: String,
    #[serde(default = "default_rpc_method_path")]
    method_path: String,
}

fn default_rpc_endpoint() -> String {
    "http://localhost:9090".to_string()
}

fn default_rpc_method_path() -> String {
    "/pension.PensionCalculationService/Calculate".to_string()
}

impl Default for RawRpcConfig {
    fn default() -> Self {
        Self {
            endpoint: default_rpc_endpoint(),
            method_path: default_rpc_method_path(),
        }
    }
}

/// Raw timeout section.
#[derive(Debug, Deserialize)]
struct RawTimeoutConfig {
    #[serde(default = "default_request_ms")]
    request_ms: u64,
    #[serde(default = "default_connect_ms")]
    connect_ms: u64,
}

fn default_request_ms() -> u64 {
    30000 // 30 seconds
}

fn default_connect_ms() -> u64 {
    5000
}

impl Default for RawTimeoutConfig {
    fn default() -> Self {
        Self {
            request_ms: default_request_ms(),
            connect_ms: default_connect_ms(),
        }
    }
}

/// Raw run parameters.
#[derive(Debug, Deserialize)]
struct RawRunConfig {
    #[serde(default = "default_iterations")]
    iterations: u64,
    #[serde(default = "default_parallelism")]
    parallelism: usize,
    #[serde(default = "default_transport")]
    transport: String,
}

fn default_iterations() -> u64 {
    1
}

fn default_parallelism() -> usize {
    20
}

fn default_transport() -> String {
    "http".to_string()
}

impl Default for RawRunConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            parallelism: default_parallelism(),
            transport: default_transport(),
        }
    }
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    http: RawHttpConfig,
    #[serde(default)]
    rpc: RawRpcConfig,
    #[serde(default)]
    timeouts: RawTimeoutConfig,
    #[serde(default)]
    run: RawRunConfig,
}

/// Validated HTTP binding configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub base_url: String,
    pub path: String,
}

impl HttpConfig {
    /// Full URL of the calculation endpoint.
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.path)
    }
}

/// Validated RPC binding configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcConfig {
    pub endpoint: String,
    pub method_path: String,
}

/// Validated per-call timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    pub request: Duration,
    pub connect: Duration,
}

/// Validated run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub iterations: Iterations,
    pub parallelism: Parallelism,
    pub transport: TransportSelection,
}

/// Complete validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub http: HttpConfig,
    pub rpc: RpcConfig,
    pub timeouts: TimeoutConfig,
    pub run: RunConfig,
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Configuration used when no file is given.
    pub fn defaults() -> Config {
        Config {
            http: HttpConfig {
                base_url: default_http_base_url(),
                path: default_http_path(),
            },
            rpc: RpcConfig {
                endpoint: default_rpc_endpoint(),
                method_path: default_rpc_method_path(),
            },
            timeouts: TimeoutConfig {
                request: Duration::from_millis(default_request_ms()),
                connect: Duration::from_millis(default_connect_ms()),
            },
            run: RunConfig {
                iterations: Iterations::default(),
                parallelism: Parallelism::default(),
                transport: TransportSelection::default(),
            },
        }
    }

    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> ProbeResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ProbeError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ProbeError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> ProbeResult<Config> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ProbeError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Ok(Self::validate(raw)?)
    }

    fn validate(raw: RawConfig) -> Result<Config, ConfigError> {
        let http = HttpConfig {
            base_url: validate_url("http.base_url", raw.http.base_url)?,
            path: validate_path("http.path", raw.http.path)?,
        };

        let rpc = RpcConfig {
            endpoint: validate_url("rpc.endpoint", raw.rpc.endpoint)?,
            method_path: validate_path("rpc.method_path", raw.rpc.method_path)?,
        };

        let timeouts = TimeoutConfig {
            request: validate_timeout("timeouts.request_ms", raw.timeouts.request_ms)?,
            connect: validate_timeout("timeouts.connect_ms", raw.timeouts.connect_ms)?,
        };

        let run = RunConfig {
            iterations: Iterations::new(raw.run.iterations)?,
            parallelism: Parallelism::new(raw.run.parallelism)?,
            transport: raw.run.transport.parse()?,
        };

        Ok(Config {
            http,
            rpc,
            timeouts,
            run,
        })
    }
}

/// Check that a binding URL is an absolute http(s) URL.
pub fn validate_url(field: &'static str, value: String) -> Result<String, ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::MissingRequiredField {
            field,
            context: "binding configuration".to_string(),
        });
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigError::InvalidFieldValue {
            field,
            value,
            reason: "Must start with http:// or https://".to_string(),
        });
    }
    Ok(value)
}

fn validate_path(field: &'static str, value: String) -> Result<String, ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::InvalidFieldValue {
            field,
            value,
            reason: "Must start with '/'".to_string(),
        });
    }
    Ok(value)
}

/// Check that a timeout is non-zero and convert it to a `Duration`.
pub fn validate_timeout(field: &'static str, ms: u64) -> Result<Duration, ConfigError> {
    if ms == 0 {
        return Err(ConfigError::InvalidFieldValue {
            field,
            value: ms.to_string(),
            reason: "Timeout must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_millis(ms))
}
