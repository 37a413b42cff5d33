// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Transport abstraction over the calculation service bindings.
//!
//! A `TransportClient` submits one request and returns the decoded
//! `CanonicalResult` with the measured latency, or a `TransportError`.
//! Each binding owns its connection and builds it at most once per process.

use std::sync::Arc;

use async_trait::async_trait;

use crate::canonical::CanonicalResult;
use crate::config::Config;
use crate::error::TransportError;
use crate::request::CalculationRequest;
use crate::types::TransportKind;

pub mod http;
pub mod rpc;

pub use http::HttpTransport;
pub use rpc::RpcTransport;

/// A successful exchange with the service.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Decoded response.
    pub result: CanonicalResult,
    /// Time spent on the wire, request out to full response in.
    pub elapsed_ms: f64,
}

/// One binding to the calculation service.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Which binding this is.
    fn kind(&self) -> TransportKind;

    /// Run one-time connection setup if it has not happened yet.
    ///
    /// Concurrent callers wait for the first one; later callers reuse the
    /// established connection.
    async fn prepare(&self) -> Result<(), TransportError>;

    /// Submit a request and decode the response.
    async fn send(&self, request: &CalculationRequest) -> Result<Exchange, TransportError>;
}

/// Per-process holder of both bindings.
///
/// Constructing the context does no I/O; each binding connects on first use.
#[derive(Clone)]
pub struct TransportContext {
    http: Arc<HttpTransport>,
    rpc: Arc<RpcTransport>,
}

impl TransportContext {
    /// Build both bindings from validated configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: Arc::new(HttpTransport::new(&config.http, config.timeouts)),
            rpc: Arc::new(RpcTransport::new(&config.rpc, config.timeouts)),
        }
    }

    /// The client for one binding.
    pub fn client(&self, kind: TransportKind) -> Arc<dyn TransportClient> {
        match kind {
            TransportKind::Http => self.http.clone() as Arc<dyn TransportClient>,
            TransportKind::Rpc => self.rpc.clone() as Arc<dyn TransportClient>,
        }
    }
}
