// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for calcprobe.
//!
//! Explicit enum error types throughout the library. Transport faults and
//! assertion mismatches are different things and never share a variant:
//! a mismatch is not an error at all, it is a failed `Check`.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TransportKind;

/// Top-level error type for the harness.
#[derive(Debug, Error)]
pub enum ProbeError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Run Errors
    // =========================================================================
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors for configuration values and run parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Unknown transport selection: {value} (expected http, rpc or both)")]
    UnknownTransport { value: String },
}

/// A failure to obtain any response from a binding.
///
/// Every variant names the binding it came from; `cause` is opaque text
/// taken from the underlying client library.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("{binding} setup failed: {cause}")]
    Setup { binding: TransportKind, cause: String },

    #[error("{binding} connection failed: {cause}")]
    Connect { binding: TransportKind, cause: String },

    #[error("{binding} request timed out after {timeout_ms}ms")]
    Timeout {
        binding: TransportKind,
        timeout_ms: u64,
    },

    #[error("{binding} returned status {status}: {cause}")]
    Status {
        binding: TransportKind,
        status: String,
        cause: String,
    },

    #[error("{binding} response could not be decoded: {cause}")]
    Decode { binding: TransportKind, cause: String },

    #[error("{binding} request could not be encoded: {cause}")]
    Encode { binding: TransportKind, cause: String },
}

impl TransportError {
    /// The binding that produced this error.
    pub fn binding(&self) -> TransportKind {
        match self {
            TransportError::Setup { binding, .. }
            | TransportError::Connect { binding, .. }
            | TransportError::Timeout { binding, .. }
            | TransportError::Status { binding, .. }
            | TransportError::Decode { binding, .. }
            | TransportError::Encode { binding, .. } => *binding,
        }
    }
}

/// Errors raised while building a scenario's request.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Invalid date '{value}' for {field}: {reason}")]
    InvalidDate {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Request for tenant '{tenant_id}' is invalid: {reason}")]
    InvalidRequest { tenant_id: String, reason: String },
}

/// Internal runner failures. Job faults are not runner errors.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Worker task for {transport} did not complete: {reason}")]
    Worker {
        transport: TransportKind,
        reason: String,
    },
}

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using ProbeError.
pub type ProbeResult<T> = Result<T, ProbeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidFieldValue {
            field: "parallelism",
            value: "0".to_string(),
            reason: "Must be at least 1".to_string(),
        };
        assert!(err.to_string().contains("parallelism"));
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_error_chain() {
        let transport_err = TransportError::Timeout {
            binding: TransportKind::Rpc,
            timeout_ms: 250,
        };
        assert_eq!(transport_err.binding(), TransportKind::Rpc);

        let probe_err: ProbeError = transport_err.into();
        assert!(matches!(probe_err, ProbeError::Transport(_)));
        assert!(probe_err.to_string().contains("250ms"));
    }
}
