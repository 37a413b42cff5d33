// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated run parameters.
//!
//! All types validate their invariants at creation time, so a `Runner`
//! can never be built with zero iterations or an empty worker pool.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of times every scenario is executed. Must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Iterations(u64);

impl Iterations {
    /// Create a new iteration count with validation.
    pub fn new(count: u64) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "iterations",
                value: count.to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }
        Ok(Self(count))
    }

    /// Get the inner count.
    pub fn get(&self) -> u64 {
        self.0
    }

    /// True when each scenario runs exactly once.
    pub fn is_single(&self) -> bool {
        self.0 == 1
    }
}

impl Default for Iterations {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Iterations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for Iterations {
    type Error = ConfigError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Iterations> for u64 {
    fn from(iterations: Iterations) -> Self {
        iterations.0
    }
}

/// Size of the worker pool. Must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Parallelism(usize);

impl Parallelism {
    /// Create a new pool size with validation.
    pub fn new(workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "parallelism",
                value: workers.to_string(),
                reason: "Must be at least 1".to_string(),
            });
        }
        Ok(Self(workers))
    }

    /// Get the inner pool size.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for Parallelism {
    fn default() -> Self {
        Self(20)
    }
}

impl fmt::Display for Parallelism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for Parallelism {
    type Error = ConfigError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Parallelism> for usize {
    fn from(parallelism: Parallelism) -> Self {
        parallelism.0
    }
}

/// One concrete binding to the calculation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// JSON over HTTP
    Http,
    /// Protobuf over gRPC
    Rpc,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Http => write!(f, "HTTP"),
            TransportKind::Rpc => write!(f, "RPC"),
        }
    }
}

/// Which bindings a run exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportSelection {
    #[default]
    Http,
    Rpc,
    Both,
}

impl TransportSelection {
    /// The bindings to run, HTTP first.
    pub fn kinds(&self) -> &'static [TransportKind] {
        match self {
            TransportSelection::Http => &[TransportKind::Http],
            TransportSelection::Rpc => &[TransportKind::Rpc],
            TransportSelection::Both => &[TransportKind::Http, TransportKind::Rpc],
        }
    }

    /// True when both bindings run and a comparison is produced.
    pub fn is_both(&self) -> bool {
        matches!(self, TransportSelection::Both)
    }
}

impl FromStr for TransportSelection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" | "rest" => Ok(TransportSelection::Http),
            "rpc" | "grpc" => Ok(TransportSelection::Rpc),
            "both" => Ok(TransportSelection::Both),
            _ => Err(ConfigError::UnknownTransport {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for TransportSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportSelection::Http => write!(f, "http"),
            TransportSelection::Rpc => write!(f, "rpc"),
            TransportSelection::Both => write!(f, "both"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iterations_validation() {
        assert!(Iterations::new(0).is_err());
        assert!(Iterations::new(1).unwrap().is_single());
        assert_eq!(Iterations::new(50).unwrap().get(), 50);
    }

    #[test]
    fn test_parallelism_validation() {
        assert!(Parallelism::new(0).is_err());
        assert_eq!(Parallelism::new(100_000).unwrap().get(), 100_000);
        assert_eq!(Parallelism::new(usize::MAX).unwrap().get(), usize::MAX);
        assert_eq!(Parallelism::default().get(), 20);
    }

    #[test]
    fn test_transport_selection_parse() {
        assert_eq!(
            "both".parse::<TransportSelection>().unwrap().kinds(),
            &[TransportKind::Http, TransportKind::Rpc]
        );
        assert_eq!(
            "GRPC".parse::<TransportSelection>().unwrap(),
            TransportSelection::Rpc
        );
        assert!("carrier-pigeon".parse::<TransportSelection>().is_err());
    }

    #[test]
    fn test_iterations_serde_rejects_zero() {
        let parsed: Result<Iterations, _> = serde_json::from_str("0");
        assert!(parsed.is_err());
    }
}
