// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Thread-safe fold of job results.
//!
//! Workers record concurrently and in any order; the resulting snapshot is
//! the same regardless of interleaving, apart from which result is kept as
//! `first` when a scenario runs more than once.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use crate::scenario::EvalResult;

/// Everything recorded for one scenario on one transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioAggregate {
    pub name: String,
    /// Latencies of fault-free jobs, in completion order.
    pub timings: Vec<f64>,
    pub passed: u64,
    pub failed: u64,
    /// Distinct fault descriptions and how often each occurred.
    pub faults: BTreeMap<String, u64>,
    /// Failing check labels and how often each failed.
    pub failing_checks: BTreeMap<String, u64>,
    /// The first result recorded, kept for per-check detail.
    #[serde(skip)]
    pub first: Option<EvalResult>,
}

impl ScenarioAggregate {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            timings: Vec::new(),
            passed: 0,
            failed: 0,
            faults: BTreeMap::new(),
            failing_checks: BTreeMap::new(),
            first: None,
        }
    }

    /// Jobs recorded for this scenario.
    pub fn jobs(&self) -> u64 {
        self.passed + self.failed
    }

    pub fn fault_count(&self) -> u64 {
        self.faults.values().sum()
    }

    pub fn has_timings(&self) -> bool {
        !self.timings.is_empty()
    }

    fn fold(&mut self, result: &EvalResult) {
        if let Some(elapsed) = result.elapsed_ms {
            self.timings.push(elapsed);
        }
        if result.ok {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        if let Some(error) = &result.error {
            *self.faults.entry(error.clone()).or_default() += 1;
        }
        for label in result.failing_checks() {
            *self.failing_checks.entry(label.to_string()).or_default() += 1;
        }
        if self.first.is_none() {
            self.first = Some(result.clone());
        }
    }
}

/// Concurrent accumulator shared by all workers of one run.
#[derive(Debug)]
pub struct Aggregator {
    order: Vec<String>,
    scenarios: DashMap<String, ScenarioAggregate>,
    passed: AtomicU64,
    failed: AtomicU64,
}

impl Aggregator {
    /// Create an aggregator with the given scenarios pre-registered, in
    /// reporting order.
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let order: Vec<String> = names.into_iter().map(str::to_string).collect();
        let scenarios = DashMap::with_capacity(order.len());
        for name in &order {
            scenarios.insert(name.clone(), ScenarioAggregate::new(name));
        }

        Self {
            order,
            scenarios,
            passed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Fold one job result into the scenario's aggregate and global counts.
    pub fn record(&self, scenario: &str, result: &EvalResult) {
        self.scenarios
            .entry(scenario.to_string())
            .or_insert_with(|| ScenarioAggregate::new(scenario))
            .fold(result);

        if result.ok {
            self.passed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn total_passed(&self) -> u64 {
        self.passed.load(Ordering::Relaxed)
    }

    pub fn total_failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Copy out the current state. Registered scenarios come first in
    /// registration order; any others follow sorted by name.
    pub fn snapshot(&self) -> AggregateSnapshot {
        let mut scenarios: Vec<ScenarioAggregate> = self
            .order
            .iter()
            .filter_map(|name| self.scenarios.get(name).map(|a| a.value().clone()))
            .collect();

        let mut extra: Vec<ScenarioAggregate> = self
            .scenarios
            .iter()
            .filter(|entry| !self.order.contains(entry.key()))
            .map(|entry| entry.value().clone())
            .collect();
        extra.sort_by(|a, b| a.name.cmp(&b.name));
        scenarios.extend(extra);

        AggregateSnapshot {
            scenarios,
            total_passed: self.total_passed(),
            total_failed: self.total_failed(),
        }
    }
}

/// Point-in-time copy of an aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateSnapshot {
    pub scenarios: Vec<ScenarioAggregate>,
    pub total_passed: u64,
    pub total_failed: u64,
}

impl AggregateSnapshot {
    pub fn get(&self, name: &str) -> Option<&ScenarioAggregate> {
        self.scenarios.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioAggregate> {
        self.scenarios.iter()
    }

    pub fn total_jobs(&self) -> u64 {
        self.total_passed + self.total_failed
    }

    /// Every timed sample across all scenarios.
    pub fn all_timings(&self) -> Vec<f64> {
        self.scenarios
            .iter()
            .flat_map(|s| s.timings.iter().copied())
            .collect()
    }
}
