//! HTTP serving.
//!
//! [`MockServer`] wraps a built [`RouteTable`] in an axum router. Mock
//! routes are dispatched by a single fallback handler that matches the
//! request against the table; `/health` reports what is loaded.

use crate::handler::MockResponse;
use crate::routes::{RouteLookup, RouteTable};
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

/// A mock server ready to be served.
#[derive(Debug, Clone)]
pub struct MockServer {
    routes: Arc<RouteTable>,
    cors: bool,
}

impl MockServer {
    /// Create a server for a built route table. CORS is enabled by default.
    pub fn new(routes: RouteTable) -> Self {
        Self {
            routes: Arc::new(routes),
            cors: true,
        }
    }

    /// Enable or disable the permissive CORS layer.
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors = enabled;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Build the axum router.
    pub fn router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(health))
            .fallback(dispatch)
            .with_state(self.routes.clone());

        if self.cors {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!(address = %addr, routes = self.routes.len(), "Mock server listening");
        }
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn health(State(routes): State<Arc<RouteTable>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "routes": routes.len(),
        "overrides": routes.overrides().len(),
    }))
}

async fn dispatch(
    State(routes): State<Arc<RouteTable>>,
    method: Method,
    uri: Uri,
) -> Response {
    let raw_path = uri.path();

    match routes.lookup(&method, raw_path) {
        RouteLookup::Found(route) => {
            let request_path = decode_path(raw_path);
            debug!(
                method = %method,
                path = %request_path,
                route = %route.path,
                "Dispatching mock request"
            );
            let response: MockResponse = route.handler.handle(&request_path).await;
            response.into_response()
        }
        RouteLookup::MethodNotAllowed(allowed) => {
            warn!(method = %method, path = %raw_path, "Method not allowed");
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let mut response = (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({ "error": "Method not allowed" })),
            )
                .into_response();
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
            response
        }
        RouteLookup::NotFound => {
            warn!(method = %method, path = %raw_path, "No mock route for request");
            (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
        }
    }
}

/// Override keys are written unescaped, so match against the decoded path.
fn decode_path(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
