// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON suite reports.
//!
//! A report captures one invocation: host, parameters, each transport's
//! statistics (or why it never ran) and the comparison when both ran.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::System;
use uuid::Uuid;

use crate::aggregator::ScenarioAggregate;
use crate::comparison::{ComparisonReport, ComparisonReporter};
use crate::error::ReportError;
use crate::runner::{SuiteSummary, TransportRun};
use crate::stats::StatsReport;
use crate::types::{Iterations, Parallelism, TransportKind, TransportSelection};

/// Host the run executed on.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub kernel_version: Option<String>,
    pub cpu_model: String,
    pub cpu_cores: usize,
    pub memory_bytes: u64,
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        let unknown = || "Unknown".to_string();
        Self {
            os: System::name().unwrap_or_else(unknown),
            os_version: System::os_version().unwrap_or_else(unknown),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(unknown),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(unknown),
        }
    }
}

/// Parameters the suite ran with.
#[derive(Debug, Clone, Serialize)]
pub struct RunParameters {
    pub iterations: Iterations,
    pub parallelism: Parallelism,
    pub transport: TransportSelection,
    pub scenarios: Vec<String>,
}

/// Failing checks and faults for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureDigest {
    pub scenario: String,
    pub failed: u64,
    pub failing_checks: Vec<(String, u64)>,
    pub faults: Vec<(String, u64)>,
}

impl FailureDigest {
    /// Digests for every scenario with at least one failed job.
    pub fn collect<'a>(aggregates: impl IntoIterator<Item = &'a ScenarioAggregate>) -> Vec<Self> {
        aggregates
            .into_iter()
            .filter(|a| a.failed > 0)
            .map(|a| Self {
                scenario: a.name.clone(),
                failed: a.failed,
                failing_checks: a
                    .failing_checks
                    .iter()
                    .map(|(label, count)| (label.clone(), *count))
                    .collect(),
                faults: a
                    .faults
                    .iter()
                    .map(|(error, count)| (error.clone(), *count))
                    .collect(),
            })
            .collect()
    }
}

/// One transport's section of the report.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportSection {
    Completed {
        transport: TransportKind,
        summary: SuiteSummary,
        stats: StatsReport,
        failures: Vec<FailureDigest>,
    },
    SetupFailed {
        transport: TransportKind,
        error: String,
    },
}

impl TransportSection {
    pub fn from_run(transport: TransportKind, run: &TransportRun) -> Self {
        match run {
            TransportRun::Completed(outcome) => TransportSection::Completed {
                transport,
                summary: outcome.summary,
                stats: outcome.stats(),
                failures: FailureDigest::collect(outcome.aggregates.iter()),
            },
            TransportRun::SetupFailed(error) => TransportSection::SetupFailed {
                transport,
                error: error.to_string(),
            },
        }
    }
}

/// Complete report for one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub run_id: Uuid,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    pub parameters: RunParameters,
    pub transports: Vec<TransportSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonReport>,
}

impl SuiteReport {
    pub fn new(parameters: RunParameters) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            parameters,
            transports: Vec::new(),
            comparison: None,
        }
    }

    /// Add the sections for each run, and the comparison when both
    /// bindings completed.
    pub fn with_runs(mut self, runs: &[(TransportKind, TransportRun)]) -> Self {
        self.transports = runs
            .iter()
            .map(|(kind, run)| TransportSection::from_run(*kind, run))
            .collect();

        let completed = |wanted: TransportKind| {
            runs.iter()
                .find(|(kind, _)| *kind == wanted)
                .and_then(|(_, run)| run.outcome())
        };
        if let (Some(http), Some(rpc)) = (completed(TransportKind::Http), completed(TransportKind::Rpc)) {
            self.comparison = Some(ComparisonReporter::compare(
                &http.aggregates,
                &rpc.aggregates,
                self.parameters.iterations,
            ));
        }
        self
    }
}

/// Writes suite reports as pretty-printed JSON files.
pub struct JsonReporter {
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a reporter writing into `output_dir`, creating it if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReportError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Save a report. Returns the path of the created file.
    pub fn save(&self, report: &SuiteReport) -> Result<PathBuf, ReportError> {
        let timestamp = report.timestamp.format("%Y-%m-%dT%H-%M-%SZ");
        let run_id = report.run_id.simple().to_string();
        let filename = format!(
            "calcprobe_{}_{}_{}.json",
            report.parameters.transport,
            timestamp,
            &run_id[..8]
        );
        let filepath = self.output_dir.join(filename);

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        tracing::info!(path = %filepath.display(), "Saved suite report");
        Ok(filepath)
    }

    /// All JSON reports in the output directory, sorted by name.
    pub fn list_reports(&self) -> Result<Vec<PathBuf>, ReportError> {
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.output_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                reports.push(path);
            }
        }
        reports.sort();
        Ok(reports)
    }

    /// Load a saved report as untyped JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<serde_json::Value, ReportError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}
