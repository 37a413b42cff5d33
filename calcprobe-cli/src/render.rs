// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Terminal output for suite runs.

use calcprobe_core::error::TransportError;
use calcprobe_core::timing::{duration_ms, format_ms};
use calcprobe_core::{
    ComparisonReport, FailureDigest, Iterations, LatencyStats, RunOutcome, Runner, ScenarioStats,
    SuiteSummary, TransportKind, Verdict,
};

const NAME_WIDTH: usize = 46;

pub fn run_banner(kind: TransportKind, runner: &Runner, scenarios: usize) {
    println!();
    println!("══════════════════════════════════════════════════════════════════");
    println!(
        "  {} binding: {} iteration(s) x {} scenario(s), {} worker(s)",
        kind,
        runner.iterations().get(),
        scenarios,
        runner.parallelism().get()
    );
    println!("══════════════════════════════════════════════════════════════════");
}

/// Per-check detail for a one-shot run.
pub fn single_iteration(kind: TransportKind, outcome: &RunOutcome) {
    for aggregate in outcome.aggregates.iter() {
        let Some(result) = aggregate.first.as_ref() else {
            continue;
        };

        println!();
        match result.elapsed_ms {
            Some(ms) => println!("  {} ({})", aggregate.name, format_ms(ms)),
            None => println!("  {} (ERROR)", aggregate.name),
        }
        match &result.error {
            Some(error) => println!("    [FAULT] {}", error),
            None => {
                for check in &result.checks {
                    let tag = if check.passed { "PASS" } else { "FAIL" };
                    println!("    [{}] {}", tag, check.label);
                }
            }
        }
    }

    let stats = outcome.stats();
    println!();
    match &stats.overall {
        Some(overall) => println!("  {:<12} {}", "Average:", format_ms(overall.mean_ms)),
        None => println!("  {:<12} n/a", "Average:"),
    }
    println!("  {:<12} {}", "Wall time:", format_ms(stats.wall_ms));
    println!();
    println!(
        "  {}: {} passed, {} failed",
        kind, outcome.summary.passed, outcome.summary.failed
    );
}

fn latency_columns(latency: &LatencyStats) -> String {
    format!(
        "{:>10} {:>10} {:>10} {:>10} {:>10}",
        format_ms(latency.mean_ms),
        format_ms(latency.min_ms),
        format_ms(latency.max_ms),
        format_ms(latency.median_ms),
        format_ms(latency.p95_ms)
    )
}

/// `HTTP: 40 passed, 2 failed (7x6 = 42 requests)`, iterations first.
fn totals_line(summary: &SuiteSummary, iterations: Iterations, scenarios: usize) -> String {
    format!(
        "  {}: {} passed, {} failed ({}x{} = {} requests)",
        summary.transport,
        summary.passed,
        summary.failed,
        iterations.get(),
        scenarios,
        summary.total()
    )
}

/// Percentile table for repeated runs.
pub fn percentile_table(outcome: &RunOutcome, iterations: Iterations, scenarios: usize) {
    let summary = &outcome.summary;
    let stats = outcome.stats();

    println!();
    println!("{}", totals_line(summary, iterations, scenarios));
    println!();
    println!(
        "  {:<width$} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Scenario",
        "Avg",
        "Min",
        "Max",
        "P50",
        "P95",
        width = NAME_WIDTH
    );
    println!("  {}", "-".repeat(NAME_WIDTH + 55));

    for scenario in &stats.scenarios {
        match scenario {
            ScenarioStats::Measured { name, latency } => println!(
                "  {:<width$} {}",
                name,
                latency_columns(latency),
                width = NAME_WIDTH
            ),
            ScenarioStats::NoSamples { name } => println!(
                "  {:<width$} {:>10}",
                name,
                "ERROR",
                width = NAME_WIDTH
            ),
        }
    }

    println!("  {}", "-".repeat(NAME_WIDTH + 55));
    match &stats.overall {
        Some(overall) => println!(
            "  {:<width$} {}",
            "Overall",
            latency_columns(overall),
            width = NAME_WIDTH
        ),
        None => println!("  {:<width$} {:>10}", "Overall", "n/a", width = NAME_WIDTH),
    }
    println!();
    println!("  Wall time:  {}", format_ms(duration_ms(summary.wall)));
    println!("  Throughput: {}", stats.throughput);

    failure_digest(&FailureDigest::collect(outcome.aggregates.iter()));
}

fn failure_digest(digests: &[FailureDigest]) {
    if digests.is_empty() {
        return;
    }

    println!();
    println!("  Failures:");
    for digest in digests {
        println!("    {} ({} failed)", digest.scenario, digest.failed);
        for (label, count) in &digest.failing_checks {
            println!("      [FAIL] {} x{}", label, count);
        }
        for (error, count) in &digest.faults {
            println!("      [FAULT] {} x{}", error, count);
        }
    }
}

pub fn setup_failure(kind: TransportKind, error: &TransportError) {
    println!();
    println!("  {} binding could not be set up: {}", kind, error);
    println!("  Skipping {} run.", kind);
}

fn verdict_cells(verdict: &Verdict, repeated: bool) -> String {
    match verdict {
        Verdict::Comparable {
            http_ms,
            rpc_ms,
            speedup,
            median_speedup,
        } => {
            let mut cells = format!(
                "{:>10} {:>10} {:>10}",
                format_ms(*http_ms),
                format_ms(*rpc_ms),
                speedup.to_string()
            );
            if repeated {
                let median = median_speedup
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string());
                cells.push_str(&format!(" {:>10}", median));
            }
            cells
        }
        Verdict::NotComparable { .. } => verdict.to_string(),
    }
}

/// HTTP against RPC, one row per scenario.
pub fn comparison(report: &ComparisonReport, iterations: Iterations) {
    let repeated = !iterations.is_single();

    println!();
    println!("══════════════════════════════════════════════════════════════════");
    println!("  HTTP vs RPC");
    println!("══════════════════════════════════════════════════════════════════");
    let mut header = format!(
        "  {:<width$} {:>10} {:>10} {:>10}",
        "Scenario",
        "HTTP",
        "RPC",
        "Speedup",
        width = NAME_WIDTH
    );
    if repeated {
        header.push_str(&format!(" {:>10}", "Median"));
    }
    println!("{}", header);
    println!("  {}", "-".repeat(NAME_WIDTH + if repeated { 44 } else { 33 }));

    for row in &report.rows {
        println!(
            "  {:<width$} {}",
            row.name,
            verdict_cells(&row.verdict, repeated),
            width = NAME_WIDTH
        );
    }
    println!("  {}", "-".repeat(NAME_WIDTH + if repeated { 44 } else { 33 }));
    println!(
        "  {:<width$} {}",
        "Overall",
        verdict_cells(&report.overall.verdict, repeated),
        width = NAME_WIDTH
    );
}
