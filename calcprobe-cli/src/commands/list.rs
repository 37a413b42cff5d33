// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `calcprobe --list` - List the shipped scenarios.

use calcprobe_core::scenarios::default_registry;

pub fn execute(filters: &[String]) -> anyhow::Result<()> {
    let registry = default_registry().filter(filters);

    if registry.is_empty() {
        println!("No scenarios match {:?}.", filters);
        return Ok(());
    }

    println!("  {:<3} {:<46} {:>6}", "#", "Scenario", "Checks");
    println!("  {} {} {}", "-".repeat(3), "-".repeat(46), "-".repeat(6));
    for (index, scenario) in registry.iter().enumerate() {
        println!(
            "  {:<3} {:<46} {:>6}",
            index + 1,
            scenario.name(),
            scenario.assertions().len()
        );
    }
    println!();
    println!("Total: {} scenario(s)", registry.len());

    Ok(())
}
