// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Canned service responses and stub transports shared by the
//! integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use calcprobe_core::transport::http;
use calcprobe_core::{
    CalculationRequest, CanonicalResult, Exchange, TransportClient, TransportError, TransportKind,
};
use serde_json::{json, Value};

fn message(level: &str, code: &str) -> Value {
    json!([{ "id": 0, "level": level, "code": code, "message": code.to_lowercase() }])
}

fn echoes(ids: &[(&str, &str)]) -> Value {
    Value::Array(
        ids.iter()
            .map(|(id, name)| {
                json!({
                    "mutation": { "mutation_id": id, "mutation_definition_name": name },
                    "calculation_message_indexes": [],
                    "forward_patch_to_situation_after_this_mutation": [],
                    "backward_patch_to_previous_situation": []
                })
            })
            .collect(),
    )
}

fn person(name: &str) -> Value {
    json!({ "person_id": "p-1", "role": "PARTICIPANT", "name": name, "birth_date": "1960-01-01" })
}

fn policy(id: &str, scheme: &str, salary: f64, pension: Option<f64>) -> Value {
    json!({
        "policy_id": id,
        "scheme_id": scheme,
        "employment_start_date": "2000-01-01",
        "salary": salary,
        "part_time_factor": 1.0,
        "attainable_pension": pension,
        "projections": null
    })
}

fn dossier(id: &str, status: &str, retirement_date: Option<&str>, policies: Vec<Value>) -> Value {
    json!({
        "dossier_id": id,
        "status": status,
        "retirement_date": retirement_date,
        "persons": [person("John Smith")],
        "policies": policies
    })
}

fn response(
    tenant_id: &str,
    outcome: &str,
    messages: Value,
    mutations: Value,
    end_index: i32,
    end_dossier: Value,
) -> Value {
    json!({
        "calculation_metadata": {
            "calculation_id": format!("calc-{}", tenant_id),
            "tenant_id": tenant_id,
            "calculation_started_at": "2025-01-01T00:00:00Z",
            "calculation_completed_at": "2025-01-01T00:00:00Z",
            "calculation_duration_ms": 1,
            "calculation_outcome": outcome
        },
        "calculation_result": {
            "messages": messages,
            "mutations": mutations,
            "end_situation": {
                "mutation_id": "m",
                "mutation_index": end_index,
                "actual_at": "2020-01-01",
                "situation": { "dossier": end_dossier }
            },
            "initial_situation": {
                "actual_at": "2020-01-01",
                "situation": { "dossier": null }
            }
        }
    })
}

/// The response a conforming service returns for each shipped scenario,
/// keyed by the scenario's tenant id.
pub fn canned(tenant_id: &str) -> Option<Value> {
    let value = match tenant_id {
        "tenant-001" => {
            let d = "d2222222-2222-2222-2222-222222222222";
            response(
                tenant_id,
                "SUCCESS",
                json!([]),
                echoes(&[
                    ("a1", "create_dossier"),
                    ("b4", "add_policy"),
                    ("c5", "apply_indexation"),
                ]),
                2,
                dossier(
                    d,
                    "ACTIVE",
                    None,
                    vec![policy(&format!("{}-1", d), "SCHEME-A", 51500.0, None)],
                ),
            )
        }
        "tenant-002" => response(
            tenant_id,
            "SUCCESS",
            json!([]),
            echoes(&[("m1", "create_dossier")]),
            0,
            dossier("dddddddd-0000-0000-0000-000000000001", "ACTIVE", None, vec![]),
        ),
        "tenant-003" => response(
            tenant_id,
            "FAILURE",
            message("CRITICAL", "DOSSIER_NOT_FOUND"),
            echoes(&[("m1", "add_policy")]),
            0,
            Value::Null,
        ),
        "tenant-004" => response(
            tenant_id,
            "SUCCESS",
            json!([]),
            echoes(&[
                ("a", "create_dossier"),
                ("b1", "add_policy"),
                ("b2", "add_policy"),
                ("c", "calculate_retirement_benefit"),
            ]),
            3,
            dossier(
                "dddddddd-0000-0000-0000-000000000002",
                "RETIRED",
                Some("2025-01-01"),
                vec![
                    policy("p-1", "SCHEME-A", 50000.0, Some(24625.0)),
                    policy("p-2", "SCHEME-B", 60000.0, Some(14775.0)),
                ],
            ),
        ),
        "tenant-005" => response(
            tenant_id,
            "FAILURE",
            message("CRITICAL", "NOT_ELIGIBLE"),
            echoes(&[
                ("e1", "create_dossier"),
                ("e2", "add_policy"),
                ("e3", "calculate_retirement_benefit"),
            ]),
            1,
            dossier(
                "dddddddd-0000-0000-0000-000000000005",
                "ACTIVE",
                None,
                vec![policy("p-1", "SCHEME-A", 40000.0, None)],
            ),
        ),
        "tenant-006" => response(
            tenant_id,
            "SUCCESS",
            json!([]),
            echoes(&[
                ("f1", "create_dossier"),
                ("f2", "add_policy"),
                ("f3", "add_policy"),
                ("f4", "apply_indexation"),
                ("f5", "apply_indexation"),
            ]),
            4,
            dossier(
                "dddddddd-0000-0000-0000-000000000006",
                "ACTIVE",
                None,
                vec![
                    policy("p-1", "SCHEME-A", 46200.0, None),
                    policy("p-2", "SCHEME-B", 50000.0, None),
                ],
            ),
        ),
        "tenant-007" => response(
            tenant_id,
            "FAILURE",
            message("CRITICAL", "DOSSIER_ALREADY_EXISTS"),
            echoes(&[("m1", "create_dossier"), ("m2", "create_dossier")]),
            0,
            dossier("dddddddd-0000-0000-0000-000000000007", "ACTIVE", None, vec![]),
        ),
        "tenant-008" => response(
            tenant_id,
            "FAILURE",
            message("CRITICAL", "UNKNOWN_MUTATION"),
            echoes(&[("m1", "create_dossier"), ("m2", "transfer_dossier")]),
            0,
            dossier("dddddddd-0000-0000-0000-000000000009", "ACTIVE", None, vec![]),
        ),
        "tenant-009" => response(
            tenant_id,
            "FAILURE",
            message("CRITICAL", "INVALID_DATE_RANGE"),
            echoes(&[
                ("n1", "create_dossier"),
                ("n2", "add_policy"),
                ("n3", "project_future_benefits"),
            ]),
            1,
            dossier(
                "dddddddd-0000-0000-0000-000000000010",
                "ACTIVE",
                None,
                vec![policy("p-1", "SCHEME-A", 45000.0, None)],
            ),
        ),
        _ => return None,
    };
    Some(value)
}

/// Decode a canned response.
pub fn canned_result(tenant_id: &str) -> CanonicalResult {
    let body = canned(tenant_id).expect("no canned response for tenant");
    http::decode(body.to_string().as_bytes()).expect("canned response decodes")
}

/// A transport that answers every request with its canned response.
///
/// Call number `fail_call` (zero-based, in arrival order) fails with a
/// connection error instead. Tracks the peak number of concurrent calls.
pub struct StubTransport {
    kind: TransportKind,
    latency: Duration,
    fail_call: Option<usize>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl StubTransport {
    pub fn new(kind: TransportKind, latency: Duration) -> Self {
        Self {
            kind,
            latency,
            fail_call: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn failing_call(mut self, call: usize) -> Self {
        self.fail_call = Some(call);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportClient for StubTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn prepare(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send(&self, request: &CalculationRequest) -> Result<Exchange, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_call == Some(call) {
            return Err(TransportError::Connect {
                binding: self.kind,
                cause: "injected fault".to_string(),
            });
        }

        Ok(Exchange {
            result: canned_result(&request.tenant_id),
            elapsed_ms: self.latency.as_secs_f64() * 1000.0 + 0.5,
        })
    }
}

/// A transport whose setup always fails.
pub struct UnreachableTransport(pub TransportKind);

#[async_trait]
impl TransportClient for UnreachableTransport {
    fn kind(&self) -> TransportKind {
        self.0
    }

    async fn prepare(&self) -> Result<(), TransportError> {
        Err(TransportError::Connect {
            binding: self.0,
            cause: "connection refused".to_string(),
        })
    }

    async fn send(&self, _: &CalculationRequest) -> Result<Exchange, TransportError> {
        Err(TransportError::Connect {
            binding: self.0,
            cause: "connection refused".to_string(),
        })
    }
}
