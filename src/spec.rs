//! API specification documents.
//!
//! Decodes the parts of an OpenAPI-style document the mock server needs:
//! paths, operations, and the JSON schema of each response. Structural
//! containers must be mappings; schema fragments are decoded leniently and
//! anything unrecognized becomes [`SchemaNode::Unknown`].

use crate::error::{Result, SpecError};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::warn;

/// Maximum nesting of schema nodes. Deeper fragments decode as `Unknown`.
pub const MAX_SCHEMA_DEPTH: usize = 32;

/// Media type whose schema drives synthesis.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Path-item keys that never describe an operation.
const NON_OPERATION_KEYS: &[&str] = &["parameters", "summary", "description", "servers", "$ref"];

/// A decoded API specification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecDocument {
    /// Path items in document order
    pub paths: Vec<PathItem>,
}

/// All operations declared under one templated path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
    /// Path template as written in the document, e.g. `/users/{id}`
    pub path: String,
    /// (method as written, operation) pairs in document order
    pub operations: Vec<(String, OperationDescriptor)>,
}

/// A single operation: the responses it declares, keyed by status code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationDescriptor {
    /// `operationId`, when present
    pub operation_id: Option<String>,
    /// (status code, response) pairs in document order
    pub responses: Vec<(String, ResponseDescriptor)>,
}

impl OperationDescriptor {
    /// Look up the response declared for a status code.
    pub fn response(&self, status: &str) -> Option<&ResponseDescriptor> {
        self.responses
            .iter()
            .find(|(code, _)| code == status)
            .map(|(_, response)| response)
    }
}

/// A declared response. Only the JSON body schema matters here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDescriptor {
    /// Schema under `content -> application/json -> schema`
    pub schema: Option<SchemaNode>,
}

/// A JSON-Schema-like fragment reduced to the shapes we can synthesize.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    Integer,
    Boolean,
    /// Item schema
    Array(Box<SchemaNode>),
    /// Declared properties in document order
    Object(Vec<(String, SchemaNode)>),
    /// Missing or unsupported `type`
    Unknown,
}

impl SchemaNode {
    /// Decode a schema fragment. Never fails.
    pub fn from_yaml(value: &Value) -> Self {
        Self::decode(value, 0)
    }

    fn decode(value: &Value, depth: usize) -> Self {
        if depth >= MAX_SCHEMA_DEPTH {
            warn!(depth, "Schema nesting limit reached, treating fragment as unknown");
            return SchemaNode::Unknown;
        }

        let Some(schema) = value.as_mapping() else {
            return SchemaNode::Unknown;
        };

        match schema.get("type").and_then(Value::as_str) {
            Some("string") => SchemaNode::String,
            Some("integer") => SchemaNode::Integer,
            Some("boolean") => SchemaNode::Boolean,
            Some("array") => {
                let items = schema
                    .get("items")
                    .map(|items| Self::decode(items, depth + 1))
                    .unwrap_or(SchemaNode::Unknown);
                SchemaNode::Array(Box::new(items))
            }
            Some("object") => {
                let properties = schema
                    .get("properties")
                    .and_then(Value::as_mapping)
                    .map(|props| {
                        props
                            .iter()
                            .filter_map(|(name, prop)| {
                                key_string(name).map(|name| (name, Self::decode(prop, depth + 1)))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                SchemaNode::Object(properties)
            }
            _ => SchemaNode::Unknown,
        }
    }
}

impl SpecDocument {
    /// Load a specification from a YAML or JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse a specification from YAML (or JSON) text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)?;
        Ok(Self::from_yaml(&value)?)
    }

    /// Walk a decoded document.
    pub fn from_yaml(document: &Value) -> std::result::Result<Self, SpecError> {
        let root = document
            .as_mapping()
            .ok_or_else(|| SpecError::not_a_mapping("document root"))?;
        let paths = root.get("paths").ok_or(SpecError::MissingPaths)?;

        let mut items = Vec::new();
        if let Some(paths) = mapping_at(paths, || "paths".to_string())? {
            for (key, item) in paths {
                let path = key_string(key).ok_or_else(|| SpecError::InvalidPath {
                    path: format!("{key:?}"),
                })?;
                let operations = decode_path_item(&path, item)?;
                items.push(PathItem { path, operations });
            }
        }

        Ok(Self { paths: items })
    }

    /// Number of (path, method) pairs in the document.
    pub fn operation_count(&self) -> usize {
        self.paths.iter().map(|item| item.operations.len()).sum()
    }
}

fn decode_path_item(
    path: &str,
    item: &Value,
) -> std::result::Result<Vec<(String, OperationDescriptor)>, SpecError> {
    let Some(item) = mapping_at(item, || format!("paths.{path}"))? else {
        return Ok(Vec::new());
    };

    let mut operations = Vec::new();
    for (key, operation) in item {
        let method = key_string(key).ok_or_else(|| SpecError::InvalidMethod {
            path: path.to_string(),
            method: format!("{key:?}"),
        })?;
        if NON_OPERATION_KEYS.contains(&method.as_str()) || method.starts_with("x-") {
            continue;
        }
        let location = || format!("paths.{path}.{method}");
        let descriptor = decode_operation(operation, location)?;
        operations.push((method, descriptor));
    }
    Ok(operations)
}

fn decode_operation(
    operation: &Value,
    location: impl Fn() -> String,
) -> std::result::Result<OperationDescriptor, SpecError> {
    let Some(operation) = mapping_at(operation, &location)? else {
        return Ok(OperationDescriptor::default());
    };

    let operation_id = operation
        .get("operationId")
        .and_then(Value::as_str)
        .map(String::from);

    let mut responses = Vec::new();
    if let Some(declared) = operation.get("responses") {
        if let Some(declared) = mapping_at(declared, || format!("{}.responses", location()))? {
            for (code, response) in declared {
                let Some(code) = key_string(code) else {
                    continue;
                };
                let response = mapping_at(response, || {
                    format!("{}.responses.{}", location(), code)
                })?;
                responses.push((code, decode_response(response)));
            }
        }
    }

    Ok(OperationDescriptor {
        operation_id,
        responses,
    })
}

fn decode_response(response: Option<&Mapping>) -> ResponseDescriptor {
    let schema = response
        .and_then(|r| r.get("content"))
        .and_then(|content| content.get(JSON_MEDIA_TYPE))
        .and_then(|media| media.get("schema"))
        .map(SchemaNode::from_yaml);
    ResponseDescriptor { schema }
}

/// Mappings may be left empty in YAML (`key:` with nothing after it), which
/// decodes as null. Treat that as an empty mapping.
fn mapping_at<'a>(
    value: &'a Value,
    location: impl FnOnce() -> String,
) -> std::result::Result<Option<&'a Mapping>, SpecError> {
    match value {
        Value::Mapping(mapping) => Ok(Some(mapping)),
        Value::Null => Ok(None),
        _ => Err(SpecError::not_a_mapping(location())),
    }
}

/// YAML allows non-string keys; response codes are commonly written as bare
/// integers.
fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
