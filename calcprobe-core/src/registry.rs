// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Ordered scenario registry.
//!
//! The registry fixes which scenarios a run executes and the order every
//! report lists them in. It is built once at startup and shared read-only.

use std::sync::Arc;

use crate::scenario::Scenario;

#[derive(Debug, Clone, Default)]
pub struct ScenarioRegistry {
    scenarios: Vec<Arc<Scenario>>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scenario. A later scenario with an existing name replaces
    /// the earlier one in place.
    pub fn register(&mut self, scenario: Scenario) {
        let scenario = Arc::new(scenario);
        match self
            .scenarios
            .iter_mut()
            .find(|s| s.name() == scenario.name())
        {
            Some(existing) => {
                tracing::warn!(scenario = %scenario.name(), "Replacing scenario with duplicate name");
                *existing = scenario;
            }
            None => self.scenarios.push(scenario),
        }
    }

    pub fn with(mut self, scenario: Scenario) -> Self {
        self.register(scenario);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Scenario>> {
        self.scenarios.iter().find(|s| s.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Scenario>> {
        self.scenarios.iter()
    }

    /// Scenario names in registry order.
    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Keep scenarios whose name contains any of the patterns,
    /// case-insensitively. No patterns keeps everything.
    pub fn filter<S: AsRef<str>>(&self, patterns: &[S]) -> Self {
        if patterns.is_empty() {
            return self.clone();
        }

        let patterns: Vec<String> = patterns
            .iter()
            .map(|p| p.as_ref().to_lowercase())
            .collect();

        Self {
            scenarios: self
                .scenarios
                .iter()
                .filter(|s| {
                    let name = s.name().to_lowercase();
                    patterns.iter().any(|p| name.contains(p.as_str()))
                })
                .cloned()
                .collect(),
        }
    }
}
