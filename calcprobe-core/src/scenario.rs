// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Scenarios and their evaluation.
//!
//! A scenario builds one request, sends it through a binding and runs an
//! ordered list of labelled checks against the decoded result. Evaluation
//! never fails: request-building errors, transport faults and panics all
//! become a failed [`EvalResult`] without a timing.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;

use crate::canonical::CanonicalResult;
use crate::error::ScenarioError;
use crate::request::CalculationRequest;
use crate::transport::TransportClient;

type BuildFn = dyn Fn() -> Result<CalculationRequest, ScenarioError> + Send + Sync;
type PredicateFn = dyn Fn(&CanonicalResult) -> bool + Send + Sync;

/// A labelled predicate over a decoded result.
#[derive(Clone)]
pub struct Assertion {
    label: String,
    predicate: Arc<PredicateFn>,
}

impl Assertion {
    pub fn new<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&CanonicalResult) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Evaluate against a result.
    pub fn check(&self, result: &CanonicalResult) -> Check {
        Check {
            label: self.label.clone(),
            passed: (self.predicate)(result),
        }
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assertion")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Outcome of one assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub label: String,
    pub passed: bool,
}

/// Outcome of one scenario evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalResult {
    /// True iff there was no fault and every check passed.
    pub ok: bool,
    /// Wire latency; present iff a response was obtained and checked.
    pub elapsed_ms: Option<f64>,
    /// Checks in declaration order. Empty on a fault.
    pub checks: Vec<Check>,
    /// Fault description; present iff no response could be checked.
    pub error: Option<String>,
}

impl EvalResult {
    /// A result for a response that was obtained and checked.
    pub fn completed(elapsed_ms: f64, checks: Vec<Check>) -> Self {
        Self {
            ok: checks.iter().all(|c| c.passed),
            elapsed_ms: Some(elapsed_ms),
            checks,
            error: None,
        }
    }

    /// A result for a job that produced no checkable response.
    pub fn fault(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            elapsed_ms: None,
            checks: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_fault(&self) -> bool {
        self.error.is_some()
    }

    /// Labels of the checks that did not pass.
    pub fn failing_checks(&self) -> impl Iterator<Item = &str> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.label.as_str())
    }
}

/// A named test case.
#[derive(Clone)]
pub struct Scenario {
    name: String,
    build: Arc<BuildFn>,
    assertions: Vec<Assertion>,
}

impl Scenario {
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> Result<CalculationRequest, ScenarioError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            build: Arc::new(build),
            assertions: Vec::new(),
        }
    }

    /// Append a labelled check.
    pub fn assert<F>(mut self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&CanonicalResult) -> bool + Send + Sync + 'static,
    {
        self.assertions.push(Assertion::new(label, predicate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    /// Build a fresh request.
    pub fn request(&self) -> Result<CalculationRequest, ScenarioError> {
        (self.build)()
    }

    /// Run every assertion against a result, in order.
    pub fn check(&self, result: &CanonicalResult) -> Vec<Check> {
        self.assertions.iter().map(|a| a.check(result)).collect()
    }

    /// Build, send and check. Never fails and never panics.
    pub async fn evaluate(&self, transport: &dyn TransportClient) -> EvalResult {
        let attempt = AssertUnwindSafe(self.exchange(transport))
            .catch_unwind()
            .await;

        match attempt {
            Ok(Ok(result)) => result,
            Ok(Err(fault)) => EvalResult::fault(fault),
            Err(panic) => EvalResult::fault(format!("panicked: {}", panic_message(&*panic))),
        }
    }

    async fn exchange(&self, transport: &dyn TransportClient) -> Result<EvalResult, String> {
        let request = self.request().map_err(|e| e.to_string())?;
        let exchange = transport.send(&request).await.map_err(|e| e.to_string())?;
        let checks = self.check(&exchange.result);
        Ok(EvalResult::completed(exchange.elapsed_ms, checks))
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("assertions", &self.assertions)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
