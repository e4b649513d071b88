//! Per-route request handling.
//!
//! Each route owns a [`RouteHandler`] bound to its operation and to the
//! shared override table. A request is answered from the override table when
//! its exact path is configured there; otherwise a body is synthesized from
//! the operation's `200` response schema.

use crate::config::OverrideTable;
use crate::resolver;
use crate::spec::OperationDescriptor;
use crate::synth;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The only declared response synthesized from. Other status codes in the
/// document are never consulted.
pub const DEFAULT_STATUS: &str = "200";

/// Error message returned when the operation declares no default response.
pub const UNDEFINED_MESSAGE: &str = "Mock response not defined";

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// Fixed response from the override table
    Override,
    /// Synthesized from the `200` response schema
    Synthesized,
    /// No override and no `200` response
    Undefined,
}

/// A decided response: status, JSON body, and the latency to simulate.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Value,
    pub delay: Duration,
    pub source: ResponseSource,
}

impl IntoResponse for MockResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Handler bound to one (path, method) route.
#[derive(Debug, Clone)]
pub struct RouteHandler {
    operation: Arc<OperationDescriptor>,
    overrides: Arc<OverrideTable>,
}

impl RouteHandler {
    pub fn new(operation: Arc<OperationDescriptor>, overrides: Arc<OverrideTable>) -> Self {
        Self {
            operation,
            overrides,
        }
    }

    /// The operation this handler serves.
    pub fn operation(&self) -> &OperationDescriptor {
        &self.operation
    }

    /// Decide the response for a request path without waiting.
    pub fn decide(&self, request_path: &str) -> MockResponse {
        if let Some(entry) = resolver::resolve(&self.overrides, request_path) {
            let status = StatusCode::from_u16(entry.status_code).unwrap_or_else(|_| {
                warn!(
                    path = %request_path,
                    status = entry.status_code,
                    "Override has an invalid status code, answering 500"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            });
            return MockResponse {
                status,
                body: entry.response.clone(),
                delay: entry.delay(),
                source: ResponseSource::Override,
            };
        }

        match self.operation.response(DEFAULT_STATUS) {
            Some(response) => MockResponse {
                status: StatusCode::OK,
                body: synth::synthesize(response.schema.as_ref()).unwrap_or(Value::Null),
                delay: Duration::ZERO,
                source: ResponseSource::Synthesized,
            },
            None => MockResponse {
                status: StatusCode::NOT_IMPLEMENTED,
                body: json!({ "error": UNDEFINED_MESSAGE }),
                delay: Duration::ZERO,
                source: ResponseSource::Undefined,
            },
        }
    }

    /// Decide the response and apply its delay.
    ///
    /// The delay suspends only the current task.
    pub async fn handle(&self, request_path: &str) -> MockResponse {
        let response = self.decide(request_path);

        match response.source {
            ResponseSource::Override => {
                info!(
                    path = %request_path,
                    status = response.status.as_u16(),
                    delay_ms = response.delay.as_millis() as u64,
                    "Serving override"
                );
            }
            ResponseSource::Synthesized => {
                debug!(path = %request_path, "Serving synthesized response");
            }
            ResponseSource::Undefined => {
                warn!(
                    path = %request_path,
                    operation_id = self.operation.operation_id.as_deref().unwrap_or("-"),
                    "No override and no 200 response declared"
                );
            }
        }

        if !response.delay.is_zero() {
            debug!(path = %request_path, delay_ms = response.delay.as_millis() as u64, "Applying delay");
            tokio::time::sleep(response.delay).await;
        }

        response
    }
}
