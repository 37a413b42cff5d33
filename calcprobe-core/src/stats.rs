// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Latency statistics.
//!
//! Percentiles use the nearest-rank rule on the sorted samples: the p-th
//! percentile is the element at `floor(len * p)`, clamped to the last
//! index. The median is the 50th percentile under the same rule.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::aggregator::AggregateSnapshot;
use crate::timing::duration_ms;

/// Nearest-rank percentile of an ascending slice. `None` when empty.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let index = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    Some(sorted[index])
}

/// Summary statistics over a non-empty set of latency samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencyStats {
    pub count: usize,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
}

impl LatencyStats {
    /// Compute statistics from samples in milliseconds. `None` when empty.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let len = sorted.len();

        let sum: f64 = sorted.iter().sum();
        let median_ms = percentile(&sorted, 0.50)?;
        let p95_ms = percentile(&sorted, 0.95)?;

        Some(Self {
            count: len,
            mean_ms: sum / len as f64,
            min_ms: sorted[0],
            max_ms: sorted[len - 1],
            median_ms,
            p95_ms,
        })
    }
}

/// Requests per second, when it can be computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Throughput {
    PerSecond(f64),
    NotAvailable,
}

impl Throughput {
    /// Timed samples divided by wall seconds.
    pub fn calculate(samples: usize, wall: Duration) -> Self {
        let secs = wall.as_secs_f64();
        if samples == 0 || secs <= 0.0 {
            Throughput::NotAvailable
        } else {
            Throughput::PerSecond(samples as f64 / secs)
        }
    }

    pub fn per_second(&self) -> Option<f64> {
        match self {
            Throughput::PerSecond(rate) => Some(*rate),
            Throughput::NotAvailable => None,
        }
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Throughput::PerSecond(rate) => write!(f, "{:.0} req/s", rate),
            Throughput::NotAvailable => write!(f, "n/a"),
        }
    }
}

impl Serialize for Throughput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.per_second().serialize(serializer)
    }
}

/// Statistics for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScenarioStats {
    Measured {
        name: String,
        #[serde(flatten)]
        latency: LatencyStats,
    },
    /// Every job for the scenario faulted.
    NoSamples { name: String },
}

impl ScenarioStats {
    pub fn name(&self) -> &str {
        match self {
            ScenarioStats::Measured { name, .. } | ScenarioStats::NoSamples { name } => name,
        }
    }

    pub fn latency(&self) -> Option<&LatencyStats> {
        match self {
            ScenarioStats::Measured { latency, .. } => Some(latency),
            ScenarioStats::NoSamples { .. } => None,
        }
    }
}

/// Statistics for one transport run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub scenarios: Vec<ScenarioStats>,
    /// Over every timed sample of the run.
    pub overall: Option<LatencyStats>,
    pub wall_ms: f64,
    pub throughput: Throughput,
}

impl StatsReport {
    pub fn scenario(&self, name: &str) -> Option<&ScenarioStats> {
        self.scenarios.iter().find(|s| s.name() == name)
    }
}

/// Turns aggregate snapshots into statistics.
pub struct StatsReporter;

impl StatsReporter {
    pub fn report(snapshot: &AggregateSnapshot, wall: Duration) -> StatsReport {
        let scenarios = snapshot
            .iter()
            .map(|aggregate| match LatencyStats::from_samples(&aggregate.timings) {
                Some(latency) => ScenarioStats::Measured {
                    name: aggregate.name.clone(),
                    latency,
                },
                None => ScenarioStats::NoSamples {
                    name: aggregate.name.clone(),
                },
            })
            .collect();

        let all = snapshot.all_timings();

        StatsReport {
            scenarios,
            overall: LatencyStats::from_samples(&all),
            wall_ms: duration_ms(wall),
            throughput: Throughput::calculate(all.len(), wall),
        }
    }
}
