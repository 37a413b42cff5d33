// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Default command - run the suite on the selected bindings.

use std::path::Path;
use std::process::ExitCode;

use calcprobe_core::report::{JsonReporter, RunParameters, SuiteReport};
use calcprobe_core::scenarios::default_registry;
use calcprobe_core::{
    ComparisonReporter, Config, Runner, TransportContext, TransportKind, TransportRun,
};

use crate::render;

pub async fn execute(
    config: Config,
    filters: &[String],
    output: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let registry = default_registry().filter(filters);
    if registry.is_empty() {
        anyhow::bail!("No scenario matches {:?}; use --list to see names", filters);
    }

    let context = TransportContext::new(&config);
    let runner = Runner::new(config.run.iterations, config.run.parallelism);
    let selection = config.run.transport;

    let mut runs: Vec<(TransportKind, TransportRun)> = Vec::new();
    for &kind in selection.kinds() {
        render::run_banner(kind, &runner, registry.len());
        let run = runner.run_transport(&registry, context.client(kind)).await?;

        match &run {
            TransportRun::Completed(outcome) => {
                if runner.iterations().is_single() {
                    render::single_iteration(kind, outcome);
                } else {
                    render::percentile_table(outcome, runner.iterations(), registry.len());
                }
            }
            TransportRun::SetupFailed(error) => render::setup_failure(kind, error),
        }
        runs.push((kind, run));
    }

    if selection.is_both() {
        let completed = |wanted: TransportKind| {
            runs.iter()
                .find(|(kind, _)| *kind == wanted)
                .and_then(|(_, run)| run.outcome())
        };
        match (completed(TransportKind::Http), completed(TransportKind::Rpc)) {
            (Some(http), Some(rpc)) => {
                let comparison = ComparisonReporter::compare(
                    &http.aggregates,
                    &rpc.aggregates,
                    runner.iterations(),
                );
                render::comparison(&comparison, runner.iterations());
            }
            _ => println!("\n  Comparison skipped: a binding did not complete its run."),
        }
    }

    if let Some(dir) = output {
        let parameters = RunParameters {
            iterations: runner.iterations(),
            parallelism: runner.parallelism(),
            transport: selection,
            scenarios: registry.names().into_iter().map(str::to_string).collect(),
        };
        let report = SuiteReport::new(parameters).with_runs(&runs);
        let path = JsonReporter::new(dir)?.save(&report)?;
        println!("\n  Report saved to: {}", path.display());
    }

    let all_passed = runs.iter().all(|(_, run)| run.succeeded());
    Ok(if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
