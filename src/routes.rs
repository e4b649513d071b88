//! Route table construction and lookup.
//!
//! The route table is built once from a [`SpecDocument`] before the server
//! accepts connections and is read-only afterwards.

use crate::config::OverrideTable;
use crate::error::SpecError;
use crate::handler::RouteHandler;
use crate::matcher::PathTemplate;
use crate::spec::SpecDocument;
use axum::http::Method;
use std::sync::Arc;
use tracing::{debug, info};

/// Prefix for every mock route, keeping them clear of management endpoints.
pub const MOCK_PREFIX: &str = "/mock";

/// One (path, method) route.
#[derive(Debug, Clone)]
pub struct Route {
    /// Path template from the document, e.g. `/users/{id}`
    pub template: String,
    /// Served path template, e.g. `/mock/users/{id}`
    pub path: String,
    pub method: Method,
    pub handler: RouteHandler,
    matcher: PathTemplate,
}

impl Route {
    /// Match a runtime request path against this route's template.
    pub fn matches(&self, request_path: &str) -> bool {
        self.matcher.matches(request_path)
    }
}

/// Outcome of looking up a request.
#[derive(Debug)]
pub enum RouteLookup<'a> {
    Found(&'a Route),
    /// The path exists but not for this method; carries the allowed methods
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Immutable table of all mock routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    overrides: Arc<OverrideTable>,
}

impl RouteTable {
    /// Build one route per (path, method) in the document.
    ///
    /// Any structural problem aborts the build; no partial table is returned.
    pub fn build(spec: SpecDocument, overrides: OverrideTable) -> Result<Self, SpecError> {
        Self::build_shared(spec, Arc::new(overrides))
    }

    /// Like [`RouteTable::build`], sharing an existing override handle.
    pub fn build_shared(
        spec: SpecDocument,
        overrides: Arc<OverrideTable>,
    ) -> Result<Self, SpecError> {
        let mut routes: Vec<Route> = Vec::with_capacity(spec.operation_count());

        for item in spec.paths {
            if item.path.is_empty() || !item.path.starts_with('/') {
                return Err(SpecError::InvalidPath { path: item.path });
            }
            let path = format!("{MOCK_PREFIX}{}", item.path);
            let matcher = PathTemplate::parse(&path);

            for (method, operation) in item.operations {
                let method = normalize_method(&method).ok_or_else(|| SpecError::InvalidMethod {
                    path: item.path.clone(),
                    method: method.clone(),
                })?;

                if routes
                    .iter()
                    .any(|r| r.template == item.path && r.method == method)
                {
                    return Err(SpecError::DuplicateRoute {
                        path: item.path.clone(),
                        method: method.to_string(),
                    });
                }

                debug!(method = %method, path = %path, "Registered mock route");
                routes.push(Route {
                    template: item.path.clone(),
                    path: path.clone(),
                    method,
                    handler: RouteHandler::new(Arc::new(operation), overrides.clone()),
                    matcher: matcher.clone(),
                });
            }
        }

        info!(
            routes = routes.len(),
            overrides = overrides.len(),
            "Route table built"
        );

        Ok(Self { routes, overrides })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// Find the route serving a request.
    ///
    /// The most specific matching template wins (most literal segments, then
    /// document order). `HEAD` falls back to the template's `GET` route.
    pub fn lookup(&self, method: &Method, request_path: &str) -> RouteLookup<'_> {
        let mut best: Option<(&str, usize)> = None;
        for route in &self.routes {
            if !route.matches(request_path) {
                continue;
            }
            let specificity = route.matcher.specificity();
            if best.map_or(true, |(_, s)| specificity > s) {
                best = Some((route.template.as_str(), specificity));
            }
        }

        let Some((template, _)) = best else {
            return RouteLookup::NotFound;
        };

        let candidates: Vec<&Route> = self
            .routes
            .iter()
            .filter(|r| r.template == template)
            .collect();

        let exact = candidates.iter().find(|r| r.method == *method);
        let fallback = || {
            (*method == Method::HEAD)
                .then(|| candidates.iter().find(|r| r.method == Method::GET))
                .flatten()
        };

        match exact.or_else(fallback) {
            Some(route) => RouteLookup::Found(*route),
            None => RouteLookup::MethodNotAllowed(
                candidates.iter().map(|r| r.method.clone()).collect(),
            ),
        }
    }
}

/// Upper-case a method string into an HTTP verb.
fn normalize_method(method: &str) -> Option<Method> {
    let upper = method.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return None;
    }
    Method::from_bytes(upper.as_bytes()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(yaml: &str) -> Result<RouteTable, SpecError> {
        let spec = SpecDocument::from_yaml_str(yaml).unwrap();
        RouteTable::build(spec, OverrideTable::default())
    }

    const USERS: &str = r#"
paths:
  /users:
    get:
      responses:
        "200": {description: ok}
    post:
      responses:
        "201": {description: created}
  /users/{id}:
    get:
      responses:
        "200": {description: ok}
    Delete:
      responses:
        "204": {description: deleted}
  /users/me:
    get:
      operationId: currentUser
      responses:
        "200": {description: ok}
"#;

    #[test]
    fn test_one_route_per_operation() {
        let table = build(USERS).unwrap();
        assert_eq!(table.len(), 5);

        let listed: Vec<_> = table
            .routes()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect();
        assert_eq!(
            listed,
            vec![
                "GET /mock/users",
                "POST /mock/users",
                "GET /mock/users/{id}",
                "DELETE /mock/users/{id}",
                "GET /mock/users/me",
            ]
        );
    }

    #[test]
    fn test_empty_spec() {
        let table = build("paths: {}\n").unwrap();
        assert!(table.is_empty());
        assert!(matches!(
            table.lookup(&Method::GET, "/mock/anything"),
            RouteLookup::NotFound
        ));
    }

    #[test]
    fn test_lookup_prefers_concrete_paths() {
        let table = build(USERS).unwrap();

        match table.lookup(&Method::GET, "/mock/users/me") {
            RouteLookup::Found(route) => {
                assert_eq!(route.template, "/users/me");
                assert_eq!(route.handler.operation().operation_id.as_deref(), Some("currentUser"));
            }
            other => panic!("unexpected lookup: {other:?}"),
        }

        match table.lookup(&Method::GET, "/mock/users/42") {
            RouteLookup::Found(route) => assert_eq!(route.template, "/users/{id}"),
            other => panic!("unexpected lookup: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_method_not_allowed() {
        let table = build(USERS).unwrap();
        match table.lookup(&Method::PUT, "/mock/users/42") {
            RouteLookup::MethodNotAllowed(methods) => {
                assert_eq!(methods, vec![Method::GET, Method::DELETE]);
            }
            other => panic!("unexpected lookup: {other:?}"),
        }
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let table = build(USERS).unwrap();
        match table.lookup(&Method::HEAD, "/mock/users") {
            RouteLookup::Found(route) => assert_eq!(route.method, Method::GET),
            other => panic!("unexpected lookup: {other:?}"),
        }
    }

    #[test]
    fn test_unprefixed_path_not_found() {
        let table = build(USERS).unwrap();
        assert!(matches!(
            table.lookup(&Method::GET, "/users"),
            RouteLookup::NotFound
        ));
    }

    #[test]
    fn test_relative_path_rejected() {
        let err = build("paths:\n  users:\n    get: {}\n").unwrap_err();
        assert_eq!(
            err,
            SpecError::InvalidPath {
                path: "users".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_method_rejected() {
        let err = build("paths:\n  /users:\n    \"not a verb\": {}\n").unwrap_err();
        assert!(matches!(err, SpecError::InvalidMethod { .. }));
    }

    #[test]
    fn test_duplicate_method_rejected() {
        let err = build("paths:\n  /users:\n    get: {}\n    GET: {}\n").unwrap_err();
        assert_eq!(
            err,
            SpecError::DuplicateRoute {
                path: "/users".to_string(),
                method: "GET".to_string()
            }
        );
    }

    #[test]
    fn test_handlers_share_overrides() {
        let mut overrides = OverrideTable::default();
        overrides.insert("/mock/users", Default::default());
        let spec = SpecDocument::from_yaml_str(USERS).unwrap();
        let table = RouteTable::build(spec, overrides).unwrap();

        assert_eq!(table.overrides().len(), 1);
        for route in table.routes() {
            let response = route.handler.decide("/mock/users");
            assert_eq!(response.source, crate::handler::ResponseSource::Override);
        }
    }
}
