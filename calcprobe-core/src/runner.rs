// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Bounded-concurrency suite runner.
//!
//! A run executes every scenario of a registry `iterations` times against
//! one binding. All jobs are spawned up front; a semaphore with
//! `parallelism` permits limits how many are in flight. Jobs are
//! independent: a fault in one never affects another, and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::aggregator::{AggregateSnapshot, Aggregator};
use crate::error::{RunnerError, TransportError};
use crate::registry::ScenarioRegistry;
use crate::stats::{StatsReport, StatsReporter};
use crate::timing::{duration_ms, Timer};
use crate::transport::TransportClient;
use crate::types::{Iterations, Parallelism, TransportKind};

/// Totals for one transport run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SuiteSummary {
    pub transport: TransportKind,
    pub passed: u64,
    pub failed: u64,
    #[serde(rename = "wall_ms", serialize_with = "serialize_ms")]
    pub wall: Duration,
}

fn serialize_ms<S: serde::Serializer>(wall: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration_ms(*wall))
}

impl SuiteSummary {
    pub fn total(&self) -> u64 {
        self.passed + self.failed
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub aggregates: AggregateSnapshot,
    pub summary: SuiteSummary,
}

impl RunOutcome {
    pub fn stats(&self) -> StatsReport {
        StatsReporter::report(&self.aggregates, self.summary.wall)
    }
}

/// A transport's run, or the reason it never started.
#[derive(Debug, Clone)]
pub enum TransportRun {
    Completed(RunOutcome),
    SetupFailed(TransportError),
}

impl TransportRun {
    pub fn outcome(&self) -> Option<&RunOutcome> {
        match self {
            TransportRun::Completed(outcome) => Some(outcome),
            TransportRun::SetupFailed(_) => None,
        }
    }

    /// True iff the run completed with no failed job.
    pub fn succeeded(&self) -> bool {
        self.outcome().is_some_and(|o| o.summary.all_passed())
    }
}

/// Executes `iterations x scenarios` jobs on a bounded worker pool.
#[derive(Debug, Clone, Copy)]
pub struct Runner {
    iterations: Iterations,
    parallelism: Parallelism,
}

impl Runner {
    pub fn new(iterations: Iterations, parallelism: Parallelism) -> Self {
        Self {
            iterations,
            parallelism,
        }
    }

    pub fn iterations(&self) -> Iterations {
        self.iterations
    }

    pub fn parallelism(&self) -> Parallelism {
        self.parallelism
    }

    /// Establish the binding's connection, then run the suite on it.
    ///
    /// A setup failure is returned as `TransportRun::SetupFailed` rather
    /// than an error so the caller can still run the other binding.
    pub async fn run_transport(
        &self,
        registry: &ScenarioRegistry,
        transport: Arc<dyn TransportClient>,
    ) -> Result<TransportRun, RunnerError> {
        if let Err(e) = transport.prepare().await {
            tracing::error!(transport = %transport.kind(), error = %e, "Transport setup failed");
            return Ok(TransportRun::SetupFailed(e));
        }
        self.run(registry, transport).await.map(TransportRun::Completed)
    }

    /// Run every job and fold the results.
    pub async fn run(
        &self,
        registry: &ScenarioRegistry,
        transport: Arc<dyn TransportClient>,
    ) -> Result<RunOutcome, RunnerError> {
        let kind = transport.kind();
        let jobs = self.iterations.get() * registry.len() as u64;
        tracing::info!(
            transport = %kind,
            jobs,
            iterations = self.iterations.get(),
            parallelism = self.parallelism.get(),
            "Starting suite run"
        );

        let aggregator = Arc::new(Aggregator::new(registry.names()));
        let permits = Arc::new(Semaphore::new(
            self.parallelism.get().min(Semaphore::MAX_PERMITS),
        ));
        let mut workers = JoinSet::new();
        let timer = Timer::start();

        for iteration in 0..self.iterations.get() {
            for scenario in registry.iter() {
                let scenario = Arc::clone(scenario);
                let transport = Arc::clone(&transport);
                let aggregator = Arc::clone(&aggregator);
                let permits = Arc::clone(&permits);

                workers.spawn(async move {
                    // The pool is never closed, so this always yields a permit.
                    let _permit = permits.acquire_owned().await.ok();

                    let result = scenario.evaluate(transport.as_ref()).await;
                    match &result.error {
                        Some(error) => tracing::warn!(
                            scenario = %scenario.name(),
                            transport = %kind,
                            iteration,
                            error = %error,
                            "Job faulted"
                        ),
                        None => tracing::debug!(
                            scenario = %scenario.name(),
                            transport = %kind,
                            iteration,
                            ok = result.ok,
                            elapsed_ms = result.elapsed_ms.unwrap_or_default(),
                            "Job completed"
                        ),
                    }

                    aggregator.record(scenario.name(), &result);
                });
            }
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                return Err(RunnerError::Worker {
                    transport: kind,
                    reason: e.to_string(),
                });
            }
        }

        let wall = timer.elapsed();
        let aggregates = aggregator.snapshot();
        let summary = SuiteSummary {
            transport: kind,
            passed: aggregates.total_passed,
            failed: aggregates.total_failed,
            wall,
        };

        tracing::info!(
            transport = %kind,
            passed = summary.passed,
            failed = summary.failed,
            wall_ms = duration_ms(wall),
            "Suite run finished"
        );

        Ok(RunOutcome {
            aggregates,
            summary,
        })
    }
}
