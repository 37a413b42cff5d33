// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Cross-binding latency comparison.
//!
//! Pairs same-named scenarios from an HTTP run and an RPC run of the same
//! registry. A speedup of `2.0x` means the RPC binding took half as long.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::aggregator::{AggregateSnapshot, ScenarioAggregate};
use crate::stats::LatencyStats;
use crate::types::{Iterations, TransportKind};

/// Ratio of HTTP latency to RPC latency.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Speedup(pub f64);

impl Speedup {
    /// `other / this`; `None` when `this` is not positive.
    pub fn of(other_ms: f64, this_ms: f64) -> Option<Self> {
        if this_ms > 0.0 && other_ms.is_finite() {
            Some(Speedup(other_ms / this_ms))
        } else {
            None
        }
    }

    pub fn ratio(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for Speedup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x", self.0)
    }
}

impl Serialize for Speedup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

/// Result of comparing one pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Verdict {
    Comparable {
        http_ms: f64,
        rpc_ms: f64,
        /// Single latency ratio, or ratio of means for repeated runs.
        speedup: Speedup,
        /// Ratio of medians; repeated runs only.
        #[serde(skip_serializing_if = "Option::is_none")]
        median_speedup: Option<Speedup>,
    },
    NotComparable { reason: String },
}

impl Verdict {
    pub fn speedup(&self) -> Option<Speedup> {
        match self {
            Verdict::Comparable { speedup, .. } => Some(*speedup),
            Verdict::NotComparable { .. } => None,
        }
    }

    pub fn is_comparable(&self) -> bool {
        matches!(self, Verdict::Comparable { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Comparable { speedup, .. } => write!(f, "{}", speedup),
            Verdict::NotComparable { reason } => write!(f, "not comparable ({})", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub name: String,
    #[serde(flatten)]
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub rows: Vec<ComparisonRow>,
    pub overall: ComparisonRow,
}

impl ComparisonReport {
    pub fn row(&self, name: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.name == name)
    }
}

/// Builds a `ComparisonReport` from two runs.
pub struct ComparisonReporter;

impl ComparisonReporter {
    pub fn compare(
        http: &AggregateSnapshot,
        rpc: &AggregateSnapshot,
        iterations: Iterations,
    ) -> ComparisonReport {
        let rows = http
            .iter()
            .map(|a| ComparisonRow {
                name: a.name.clone(),
                verdict: match rpc.get(&a.name) {
                    Some(b) => compare_bags(a, b, iterations),
                    None => not_comparable(format!("missing on {}", TransportKind::Rpc)),
                },
            })
            .collect();

        let overall = ComparisonRow {
            name: "Overall".to_string(),
            verdict: compare_samples(&http.all_timings(), &rpc.all_timings(), false),
        };

        ComparisonReport { rows, overall }
    }
}

fn not_comparable(reason: impl Into<String>) -> Verdict {
    Verdict::NotComparable {
        reason: reason.into(),
    }
}

fn compare_bags(a: &ScenarioAggregate, b: &ScenarioAggregate, iterations: Iterations) -> Verdict {
    compare_samples(&a.timings, &b.timings, iterations.is_single())
}

fn compare_samples(a: &[f64], b: &[f64], single: bool) -> Verdict {
    let (Some(a_stats), Some(b_stats)) = (LatencyStats::from_samples(a), LatencyStats::from_samples(b))
    else {
        let missing = if a.is_empty() {
            TransportKind::Http
        } else {
            TransportKind::Rpc
        };
        return not_comparable(format!("no {} samples", missing));
    };

    let (http_ms, rpc_ms) = if single {
        (a[0], b[0])
    } else {
        (a_stats.mean_ms, b_stats.mean_ms)
    };

    let Some(speedup) = Speedup::of(http_ms, rpc_ms) else {
        return not_comparable(format!("{} latency is zero", TransportKind::Rpc));
    };

    let median_speedup = if single {
        None
    } else {
        Speedup::of(a_stats.median_ms, b_stats.median_ms)
    };

    Verdict::Comparable {
        http_ms,
        rpc_ms,
        speedup,
        median_speedup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Aggregator;
    use crate::scenario::EvalResult;

    fn snapshot(entries: &[(&str, &[f64])]) -> AggregateSnapshot {
        let aggregator = Aggregator::new(entries.iter().map(|(name, _)| *name));
        for (name, timings) in entries {
            for ms in *timings {
                aggregator.record(name, &EvalResult::completed(*ms, vec![]));
            }
        }
        aggregator.snapshot()
    }

    #[test]
    fn test_single_iteration_speedup() {
        let http = snapshot(&[("README example", &[10.0])]);
        let rpc = snapshot(&[("README example", &[5.0])]);

        let report = ComparisonReporter::compare(&http, &rpc, Iterations::default());
        let row = report.row("README example").unwrap();
        assert_eq!(row.verdict.speedup(), Some(Speedup(2.0)));
        assert_eq!(row.verdict.to_string(), "2.0x");
        assert!(matches!(
            row.verdict,
            Verdict::Comparable {
                median_speedup: None,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_rpc_is_not_comparable() {
        let http = snapshot(&[("a", &[10.0]), ("b", &[8.0])]);
        let rpc = snapshot(&[("a", &[5.0])]);

        let report = ComparisonReporter::compare(&http, &rpc, Iterations::default());
        assert!(report.row("a").unwrap().verdict.is_comparable());
        let b = &report.row("b").unwrap().verdict;
        assert!(!b.is_comparable());
        assert!(b.to_string().starts_with("not comparable"));
    }

    #[test]
    fn test_faulted_side_is_not_comparable() {
        let http = snapshot(&[("a", &[10.0])]);
        let rpc = snapshot(&[("a", &[])]);

        let report = ComparisonReporter::compare(&http, &rpc, Iterations::default());
        match &report.row("a").unwrap().verdict {
            Verdict::NotComparable { reason } => assert!(reason.contains("RPC")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!report.overall.verdict.is_comparable());
    }

    #[test]
    fn test_zero_rpc_latency_is_not_comparable() {
        let http = snapshot(&[("a", &[10.0])]);
        let rpc = snapshot(&[("a", &[0.0])]);

        let report = ComparisonReporter::compare(&http, &rpc, Iterations::default());
        assert!(!report.row("a").unwrap().verdict.is_comparable());
    }

    #[test]
    fn test_repeated_runs_use_means_and_medians() {
        let http = snapshot(&[("a", &[10.0, 20.0, 30.0])]);
        let rpc = snapshot(&[("a", &[5.0, 5.0, 20.0])]);

        let iterations = Iterations::new(3).unwrap();
        let report = ComparisonReporter::compare(&http, &rpc, iterations);
        match &report.row("a").unwrap().verdict {
            Verdict::Comparable {
                speedup,
                median_speedup,
                ..
            } => {
                assert_eq!(*speedup, Speedup(2.0));
                assert_eq!(*median_speedup, Some(Speedup(4.0)));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(report.overall.verdict.speedup(), Some(Speedup(2.0)));
    }
}
