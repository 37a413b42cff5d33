// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! calcprobe Core Library
//!
//! Conformance and latency harness for a pension calculation service
//! reachable over two bindings, JSON over HTTP and protobuf over gRPC.
//! Provides the transport abstraction, scenario model, bounded-concurrency
//! runner, result aggregation, statistics and cross-binding comparison.

pub mod aggregator;
pub mod canonical;
pub mod comparison;
pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod request;
pub mod runner;
pub mod scenario;
pub mod scenarios;
pub mod stats;
pub mod timing;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use aggregator::{AggregateSnapshot, Aggregator, ScenarioAggregate};
pub use canonical::{CanonicalResult, Outcome, Severity};
pub use comparison::{ComparisonReport, ComparisonReporter, Speedup, Verdict};
pub use config::{Config, ConfigLoader};
pub use error::{
    ConfigError, ProbeError, ProbeResult, ReportError, RunnerError, ScenarioError, TransportError,
};
pub use registry::ScenarioRegistry;
pub use report::{FailureDigest, JsonReporter, RunParameters, SuiteReport};
pub use request::{CalculationRequest, Mutation, RequestBuilder};
pub use runner::{RunOutcome, Runner, SuiteSummary, TransportRun};
pub use scenario::{Assertion, Check, EvalResult, Scenario};
pub use stats::{LatencyStats, ScenarioStats, StatsReport, StatsReporter, Throughput};
pub use transport::{Exchange, TransportClient, TransportContext};
pub use types::{Iterations, Parallelism, TransportKind, TransportSelection};
