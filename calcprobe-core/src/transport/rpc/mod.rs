// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! gRPC binding.
//!
//! Makes a unary `Calculate` call through `tonic`'s generic client with the
//! message types declared in [`proto`].

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};

use crate::config::{RpcConfig, TimeoutConfig};
use crate::error::TransportError;
use crate::request::CalculationRequest;
use crate::timing::Timer;
use crate::types::TransportKind;

use super::{Exchange, TransportClient};

pub mod proto;

const BINDING: TransportKind = TransportKind::Rpc;

/// An established channel and the parsed method path.
struct Connection {
    channel: Channel,
    path: PathAndQuery,
}

/// RPC binding with a lazily connected, shared `tonic` channel.
pub struct RpcTransport {
    endpoint: String,
    method_path: String,
    request_timeout: Duration,
    connect_timeout: Duration,
    connection: OnceCell<Connection>,
}

impl RpcTransport {
    pub fn new(config: &RpcConfig, timeouts: TimeoutConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            method_path: config.method_path.clone(),
            request_timeout: timeouts.request,
            connect_timeout: timeouts.connect,
            connection: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<&Connection, TransportError> {
        self.connection
            .get_or_try_init(|| async {
                tracing::debug!(endpoint = %self.endpoint, "Connecting gRPC channel");

                let path = self
                    .method_path
                    .parse::<PathAndQuery>()
                    .map_err(|e| TransportError::Setup {
                        binding: BINDING,
                        cause: format!("invalid method path '{}': {}", self.method_path, e),
                    })?;

                let endpoint = Endpoint::from_shared(self.endpoint.clone())
                    .map_err(|e| TransportError::Setup {
                        binding: BINDING,
                        cause: e.to_string(),
                    })?
                    .connect_timeout(self.connect_timeout)
                    .timeout(self.request_timeout);

                let channel = endpoint
                    .connect()
                    .await
                    .map_err(|e| TransportError::Connect {
                        binding: BINDING,
                        cause: e.to_string(),
                    })?;

                Ok(Connection { channel, path })
            })
            .await
    }

    fn classify(&self, status: Status) -> TransportError {
        match status.code() {
            Code::DeadlineExceeded => self.timeout(),
            Code::Cancelled if status.message().contains("Timeout") => self.timeout(),
            Code::Unavailable => TransportError::Connect {
                binding: BINDING,
                cause: status.message().to_string(),
            },
            code => TransportError::Status {
                binding: BINDING,
                status: format!("{:?}", code),
                cause: status.message().to_string(),
            },
        }
    }

    fn timeout(&self) -> TransportError {
        TransportError::Timeout {
            binding: BINDING,
            timeout_ms: self.request_timeout.as_millis() as u64,
        }
    }
}

#[async_trait]
impl TransportClient for RpcTransport {
    fn kind(&self) -> TransportKind {
        BINDING
    }

    async fn prepare(&self) -> Result<(), TransportError> {
        self.connection().await.map(|_| ())
    }

    async fn send(&self, request: &CalculationRequest) -> Result<Exchange, TransportError> {
        let connection = self.connection().await?;
        let message = proto::encode_request(request).map_err(|e| TransportError::Encode {
            binding: BINDING,
            cause: e.to_string(),
        })?;

        let mut grpc = tonic::client::Grpc::new(connection.channel.clone());
        let codec: ProstCodec<proto::CalculationRequest, proto::CalculationResponse> =
            ProstCodec::default();

        let timer = Timer::start();
        grpc.ready().await.map_err(|e| TransportError::Connect {
            binding: BINDING,
            cause: e.to_string(),
        })?;
        let response = grpc
            .unary(tonic::Request::new(message), connection.path.clone(), codec)
            .await
            .map_err(|status| self.classify(status))?;
        let elapsed_ms = timer.elapsed_ms();

        let result = proto::decode_response(response.into_inner()).map_err(|cause| {
            TransportError::Decode {
                binding: BINDING,
                cause,
            }
        })?;
        Ok(Exchange { result, elapsed_ms })
    }
}
