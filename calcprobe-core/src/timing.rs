// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Latency measurement helpers.
//!
//! Samples are kept as fractional milliseconds so sub-millisecond calls on a
//! local service still produce distinct values.

use std::time::{Duration, Instant};

/// Convert a duration to fractional milliseconds.
pub fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Timer for measuring individual operations.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed fractional milliseconds since start.
    pub fn elapsed_ms(&self) -> f64 {
        duration_ms(self.start.elapsed())
    }

    /// Elapsed duration since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Format a millisecond latency in human-readable form (auto-selects μs/ms/s).
pub fn format_ms(ms: f64) -> String {
    if ms < 1.0 {
        format!("{:.2}μs", ms * 1_000.0)
    } else if ms < 1_000.0 {
        format!("{:.2}ms", ms)
    } else {
        format!("{:.2}s", ms / 1_000.0)
    }
}
