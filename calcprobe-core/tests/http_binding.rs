// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP binding against an in-process stub service.

mod common;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use calcprobe_core::request::{date, CreateDossier};
use calcprobe_core::scenarios::{self, default_registry};
use calcprobe_core::{
    ConfigLoader, Iterations, Mutation, Parallelism, RequestBuilder, Runner, Scenario,
    TransportContext, TransportKind,
};
use serde_json::{json, Value};

type Received = Arc<Mutex<Vec<Value>>>;

async fn calculate(State(received): State<Received>, Json(body): Json<Value>) -> Response {
    let tenant = body["tenant_id"].as_str().unwrap_or_default().to_string();
    received.lock().unwrap().push(body);

    match tenant.as_str() {
        "tenant-slow" => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            StatusCode::OK.into_response()
        }
        "tenant-bad" => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "status": 400, "message": "Invalid calculation request" })),
        )
            .into_response(),
        _ => match common::canned(&tenant) {
            Some(response) => Json(response).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
    }
}

async fn start_stub() -> (SocketAddr, Received) {
    let received = Received::default();
    let app = Router::new()
        .route("/calculation-requests", post(calculate))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, received)
}

fn context_for(addr: SocketAddr) -> TransportContext {
    let yaml = format!(
        "http:\n  base_url: http://{}/\ntimeouts:\n  request_ms: 300\n  connect_ms: 300\n",
        addr
    );
    TransportContext::new(&ConfigLoader::load_string(&yaml).unwrap())
}

fn single_dossier_scenario(tenant: &'static str) -> Scenario {
    Scenario::new(tenant, move || {
        RequestBuilder::new(tenant)
            .mutation(Mutation::create_dossier(
                "m-1",
                date("actual_at", "2020-01-01")?,
                CreateDossier {
                    dossier_id: "d-1".to_string(),
                    person_id: "p-1".to_string(),
                    name: "Jane Doe".to_string(),
                    birth_date: date("birth_date", "1960-06-15")?,
                },
            ))
            .build()
    })
    .assert("outcome SUCCESS", |r| r.is_success())
}

#[tokio::test]
async fn test_readme_example_over_http() {
    let (addr, received) = start_stub().await;
    let http = context_for(addr).client(TransportKind::Http);

    let result = scenarios::readme_example().evaluate(http.as_ref()).await;
    assert!(result.ok, "{:?}", result);
    assert!(result.elapsed_ms.unwrap() > 0.0);
    assert_eq!(result.checks.len(), 11);

    let bodies = received.lock().unwrap();
    let mutations = &bodies[0]["calculation_instructions"]["mutations"];
    assert_eq!(mutations.as_array().unwrap().len(), 3);
    assert!(mutations[0].get("dossier_id").is_none());
    assert_eq!(mutations[1]["mutation_properties"]["salary"], 50000.0);
    assert_eq!(mutations[2]["actual_at"], "2021-01-01");
}

#[tokio::test]
async fn test_failure_response_is_not_a_fault() {
    let (addr, _) = start_stub().await;
    let http = context_for(addr).client(TransportKind::Http);

    let result = scenarios::policy_without_dossier().evaluate(http.as_ref()).await;
    assert!(result.ok);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_error_status_carries_service_message() {
    let (addr, _) = start_stub().await;
    let http = context_for(addr).client(TransportKind::Http);

    let result = single_dossier_scenario("tenant-bad").evaluate(http.as_ref()).await;
    assert!(!result.ok);
    assert!(result.elapsed_ms.is_none());
    let error = result.error.unwrap();
    assert!(error.contains("400"), "{}", error);
    assert!(error.contains("Invalid calculation request"), "{}", error);
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let (addr, _) = start_stub().await;
    let http = context_for(addr).client(TransportKind::Http);

    let result = single_dossier_scenario("tenant-slow").evaluate(http.as_ref()).await;
    assert!(result.is_fault());
    assert!(result.error.unwrap().contains("timed out after 300ms"));
}

#[tokio::test]
async fn test_refused_connection_is_a_fault() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let http = context_for(addr).client(TransportKind::Http);
    http.prepare().await.unwrap();

    let result = scenarios::create_dossier_only().evaluate(http.as_ref()).await;
    assert!(result.is_fault());
    assert!(result.elapsed_ms.is_none());
    assert!(result.checks.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runner_over_http() {
    let (addr, received) = start_stub().await;
    let http = context_for(addr).client(TransportKind::Http);
    let registry = default_registry().filter(&["README", "without dossier"]);
    assert_eq!(registry.len(), 2);

    let runner = Runner::new(Iterations::new(3).unwrap(), Parallelism::new(4).unwrap());
    let outcome = runner.run(&registry, http).await.unwrap();

    assert_eq!(outcome.summary.passed, 6);
    assert_eq!(outcome.summary.failed, 0);
    assert_eq!(received.lock().unwrap().len(), 6);
}
