// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! gRPC binding against an in-process tonic service.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use calcprobe_core::request::{date, CreateDossier};
use calcprobe_core::scenarios::{self, default_registry};
use calcprobe_core::transport::rpc::proto;
use calcprobe_core::{
    ConfigLoader, Iterations, Mutation, Parallelism, RequestBuilder, Runner, Scenario,
    TransportContext, TransportError, TransportKind, TransportRun,
};
use tonic::body::BoxBody;
use tonic::codec::ProstCodec;
use tonic::codegen::{empty_body, http, Body, BoxFuture, Context, Poll, Service, StdError};
use tonic::server::{NamedService, UnaryService};
use tonic::Status;

const METHOD_PATH: &str = "/pension.PensionCalculationService/Calculate";

/// Calculation service stub; records every request it is sent.
#[derive(Clone, Default)]
struct CalculationService {
    received: Arc<Mutex<Vec<proto::CalculationRequest>>>,
}

fn dossier_not_found(tenant_id: &str) -> proto::CalculationResponse {
    proto::CalculationResponse {
        calculation_metadata: Some(proto::CalculationMetadata {
            calculation_id: format!("calc-{}", tenant_id),
            tenant_id: tenant_id.to_string(),
            calculation_started_at: "2025-01-01T00:00:00Z".to_string(),
            calculation_completed_at: "2025-01-01T00:00:00Z".to_string(),
            calculation_duration_ms: 1,
            calculation_outcome: "FAILURE".to_string(),
        }),
        calculation_result: Some(proto::CalculationResult {
            messages: vec![proto::CalculationMessage {
                id: 0,
                level: "CRITICAL".to_string(),
                code: "DOSSIER_NOT_FOUND".to_string(),
                message: "No dossier".to_string(),
            }],
            mutations: vec![],
            end_situation: Some(proto::SituationSnapshot {
                mutation_id: "m-1".to_string(),
                mutation_index: 0,
                actual_at: "2020-01-01".to_string(),
                situation: Some(proto::Situation { dossier: None }),
            }),
            initial_situation: None,
        }),
    }
}

impl CalculationService {
    async fn calculate(
        self,
        request: proto::CalculationRequest,
    ) -> Result<proto::CalculationResponse, Status> {
        let tenant = request.tenant_id.clone();
        self.received.lock().unwrap().push(request);

        match tenant.as_str() {
            "tenant-slow" => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(dossier_not_found(&tenant))
            }
            "tenant-003" => Ok(dossier_not_found(&tenant)),
            _ => Err(Status::invalid_argument(format!("unknown tenant {}", tenant))),
        }
    }
}

struct Calculate(CalculationService);

impl UnaryService<proto::CalculationRequest> for Calculate {
    type Response = proto::CalculationResponse;
    type Future = BoxFuture<tonic::Response<Self::Response>, Status>;

    fn call(&mut self, request: tonic::Request<proto::CalculationRequest>) -> Self::Future {
        let service = self.0.clone();
        Box::pin(async move {
            service
                .calculate(request.into_inner())
                .await
                .map(tonic::Response::new)
        })
    }
}

impl<B> Service<http::Request<B>> for CalculationService
where
    B: Body + Send + 'static,
    B::Error: Into<StdError> + Send + 'static,
{
    type Response = http::Response<BoxBody>;
    type Error = Infallible;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: http::Request<B>) -> Self::Future {
        if request.uri().path() != METHOD_PATH {
            return Box::pin(async {
                let mut response = http::Response::new(empty_body());
                let headers = response.headers_mut();
                // 12 is UNIMPLEMENTED
                headers.insert("grpc-status", http::HeaderValue::from_static("12"));
                headers.insert(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static("application/grpc"),
                );
                Ok(response)
            });
        }

        let method = Calculate(self.clone());
        Box::pin(async move {
            let mut grpc = tonic::server::Grpc::new(ProstCodec::default());
            Ok(grpc.unary(method, request).await)
        })
    }
}

impl NamedService for CalculationService {
    const NAME: &'static str = "pension.PensionCalculationService";
}

async fn start_stub() -> (SocketAddr, CalculationService) {
    let service = CalculationService::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let incoming = futures::stream::unfold(listener, |listener| async move {
        let accepted = listener.accept().await.map(|(stream, _)| stream);
        Some((accepted, listener))
    });

    let server = tonic::transport::Server::builder().add_service(service.clone());
    tokio::spawn(async move {
        server.serve_with_incoming(Box::pin(incoming)).await.unwrap();
    });
    (addr, service)
}

fn context_for(addr: SocketAddr) -> TransportContext {
    let yaml = format!(
        "rpc:\n  endpoint: http://{}\ntimeouts:\n  request_ms: 300\n  connect_ms: 300\n",
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
async fn test_failure_scenario_over_rpc() {
    let (addr, service) = start_stub().await;
    let rpc = context_for(addr).client(TransportKind::Rpc);

    let result = scenarios::policy_without_dossier().evaluate(rpc.as_ref()).await;
    assert!(result.ok, "{:?}", result);
    assert!(result.elapsed_ms.unwrap() > 0.0);
    assert_eq!(result.checks.len(), 4);

    let received = service.received.lock().unwrap();
    assert_eq!(received[0].tenant_id, "tenant-003");
    let mutation = &received[0].calculation_instructions.as_ref().unwrap().mutations[0];
    assert_eq!(mutation.mutation_definition_name, "add_policy");
    assert_eq!(mutation.mutation_type, "DOSSIER");
    assert!(mutation.dossier_id.is_some());
    let properties = mutation.mutation_properties.as_ref().unwrap();
    assert!(properties.fields.contains_key("salary"));
}

#[tokio::test]
async fn test_error_status_is_a_fault() {
    let (addr, _) = start_stub().await;
    let rpc = context_for(addr).client(TransportKind::Rpc);

    let result = single_dossier_scenario("tenant-bad").evaluate(rpc.as_ref()).await;
    assert!(result.is_fault());
    let error = result.error.unwrap();
    assert!(error.contains("InvalidArgument"), "{}", error);
    assert!(error.contains("unknown tenant tenant-bad"), "{}", error);
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let (addr, _) = start_stub().await;
    let rpc = context_for(addr).client(TransportKind::Rpc);

    let result = single_dossier_scenario("tenant-slow").evaluate(rpc.as_ref()).await;
    assert!(result.is_fault());
    assert!(result.elapsed_ms.is_none());
    let error = result.error.unwrap();
    assert!(error.contains("timed out after 300ms"), "{}", error);
}

#[tokio::test]
async fn test_closed_port_fails_setup() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let rpc = context_for(addr).client(TransportKind::Rpc);
    let runner = Runner::new(Iterations::new(1).unwrap(), Parallelism::new(2).unwrap());
    let run = runner.run_transport(&default_registry(), rpc).await.unwrap();

    match &run {
        TransportRun::SetupFailed(error) => {
            assert!(matches!(error, TransportError::Connect { .. }), "{:?}", error);
            assert_eq!(error.binding(), TransportKind::Rpc);
        }
        TransportRun::Completed(_) => panic!("run should not start"),
    }
    assert!(!run.succeeded());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_runner_shares_one_channel() {
    let (addr, service) = start_stub().await;
    let rpc = context_for(addr).client(TransportKind::Rpc);
    let registry = default_registry().filter(&["without dossier"]);
    assert_eq!(registry.len(), 1);

    let runner = Runner::new(Iterations::new(5).unwrap(), Parallelism::new(3).unwrap());
    let run = runner.run_transport(&registry, rpc).await.unwrap();

    let outcome = run.outcome().unwrap();
    assert_eq!(outcome.summary.passed, 5);
    assert_eq!(outcome.summary.failed, 0);
    assert_eq!(service.received.lock().unwrap().len(), 5);
}
