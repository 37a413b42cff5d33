// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! JSON-over-HTTP binding.
//!
//! Posts the request as JSON to the calculation endpoint and decodes the
//! `{calculation_metadata, calculation_result}` envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::canonical::{
    null_as_default, CalculationMessage, CalculationMetadata, CanonicalResult, InitialSituation,
    ProcessedMutation, SituationSnapshot,
};
use crate::config::{HttpConfig, TimeoutConfig};
use crate::error::TransportError;
use crate::request::CalculationRequest;
use crate::timing::Timer;
use crate::types::TransportKind;

use super::{Exchange, TransportClient};

const BINDING: TransportKind = TransportKind::Http;

/// Response envelope as sent by the service.
#[derive(Debug, Deserialize)]
struct WireResponse {
    calculation_metadata: CalculationMetadata,
    calculation_result: WireResult,
}

#[derive(Debug, Deserialize)]
struct WireResult {
    #[serde(default, deserialize_with = "null_as_default")]
    messages: Vec<CalculationMessage>,
    #[serde(default, deserialize_with = "null_as_default")]
    mutations: Vec<ProcessedMutation>,
    end_situation: SituationSnapshot,
    #[serde(default)]
    initial_situation: Option<InitialSituation>,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    message: Option<String>,
}

/// Decode an HTTP response body into a `CanonicalResult`.
pub fn decode(body: &[u8]) -> Result<CanonicalResult, TransportError> {
    let wire: WireResponse =
        serde_json::from_slice(body).map_err(|e| TransportError::Decode {
            binding: BINDING,
            cause: e.to_string(),
        })?;

    Ok(CanonicalResult {
        metadata: wire.calculation_metadata,
        messages: wire.calculation_result.messages,
        mutations: wire.calculation_result.mutations,
        end_situation: wire.calculation_result.end_situation,
        initial_situation: wire.calculation_result.initial_situation,
    })
}

/// HTTP binding with a lazily built, pooled `reqwest` client.
pub struct HttpTransport {
    url: String,
    request_timeout: Duration,
    connect_timeout: Duration,
    client: OnceCell<Client>,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig, timeouts: TimeoutConfig) -> Self {
        Self {
            url: config.endpoint_url(),
            request_timeout: timeouts.request,
            connect_timeout: timeouts.connect,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&Client, TransportError> {
        self.client
            .get_or_try_init(|| async {
                tracing::debug!(url = %self.url, "Building HTTP client");
                Client::builder()
                    .timeout(self.request_timeout)
                    .connect_timeout(self.connect_timeout)
                    .build()
                    .map_err(|e| TransportError::Setup {
                        binding: BINDING,
                        cause: e.to_string(),
                    })
            })
            .await
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                binding: BINDING,
                timeout_ms: self.request_timeout.as_millis() as u64,
            }
        } else if err.is_decode() {
            TransportError::Decode {
                binding: BINDING,
                cause: err.to_string(),
            }
        } else {
            TransportError::Connect {
                binding: BINDING,
                cause: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl TransportClient for HttpTransport {
    fn kind(&self) -> TransportKind {
        BINDING
    }

    async fn prepare(&self) -> Result<(), TransportError> {
        self.client().await.map(|_| ())
    }

    async fn send(&self, request: &CalculationRequest) -> Result<Exchange, TransportError> {
        let client = self.client().await?;

        let timer = Timer::start();
        let response = client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let elapsed_ms = timer.elapsed_ms();

        if !status.is_success() {
            let cause = serde_json::from_slice::<WireError>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            return Err(TransportError::Status {
                binding: BINDING,
                status: status.as_u16().to_string(),
                cause,
            });
        }

        let result = decode(&body)?;
        Ok(Exchange { result, elapsed_ms })
    }
}
