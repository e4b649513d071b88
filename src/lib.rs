//! OpenAPI Mock Server
//!
//! Serves synthetic responses for every operation in an OpenAPI document so
//! client developers have a running API before the real backend exists.
//!
//! # Features
//!
//! - **Route Materialization**: One route per (path, method), served under `/mock`
//! - **Response Synthesis**: Fake JSON shaped like the `200` response schema
//! - **Overrides**: Fixed status and body for exact request paths
//! - **Latency Simulation**: Per-override delays that only hold up their own request
//!
//! # Example Override Configuration
//!
//! ```yaml
//! /mock/users/1:
//!   status_code: 404
//!   response:
//!     error: "User not found"
//!   delay: 2
//! ```
//!
//! # Example
//!
//! ```no_run
//! use openapi_mock_server::{MockServer, OverrideTable, RouteTable, SpecDocument};
//! use std::path::Path;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let spec = SpecDocument::from_file(Path::new("openapi.yaml"))?;
//! let overrides = OverrideTable::from_file(Path::new("mock-config.yaml"))?;
//! let routes = RouteTable::build(spec, overrides)?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:5000").await?;
//! MockServer::new(routes).serve(listener).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod resolver;
pub mod routes;
pub mod server;
pub mod spec;
pub mod synth;

pub use config::{OverrideEntry, OverrideTable};
pub use error::{Error, Result, SpecError};
pub use handler::{MockResponse, ResponseSource, RouteHandler};
pub use routes::{RouteTable, MOCK_PREFIX};
pub use server::MockServer;
pub use spec::{SchemaNode, SpecDocument};
