//! Override configuration.
//!
//! An override file maps exact request paths to fixed responses:
//!
//! ```yaml
//! /mock/users/1:
//!   status_code: 404
//!   response:
//!     error: "User not found"
//!   delay: 1.5
//! ```
//!
//! `status_code` may be a number or a numeric string. Entries left empty
//! (`/mock/users/2:` or `/mock/users/2: {}`) are ignored, as if the path had
//! no override.

use crate::error::{Error, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Fixed responses keyed by the literal runtime request path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideTable {
    entries: HashMap<String, OverrideEntry>,
}

impl OverrideTable {
    /// Load overrides from a YAML or JSON file.
    ///
    /// A missing file is an empty table, not an error.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse overrides from YAML (or JSON) text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Option<HashMap<String, serde_yaml::Value>> = serde_yaml::from_str(content)?;

        let mut entries = HashMap::new();
        for (path, entry) in raw.unwrap_or_default() {
            if is_blank(&entry) {
                debug!(path = %path, "Ignoring empty override entry");
                continue;
            }
            let entry: OverrideEntry = serde_yaml::from_value(entry)
                .map_err(|e| Error::config(format!("Override {path}: {e}")))?;
            entries.insert(path, entry);
        }

        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Validate every entry.
    pub fn validate(&self) -> Result<()> {
        for (path, entry) in &self.entries {
            if !path.starts_with('/') {
                return Err(Error::config(format!(
                    "Override {path:?}: keys must be request paths starting with '/'"
                )));
            }
            entry
                .validate()
                .map_err(|e| Error::config(format!("Override {path}: {e}")))?;
        }
        Ok(())
    }

    /// Exact-match lookup.
    pub fn get(&self, request_path: &str) -> Option<&OverrideEntry> {
        self.entries.get(request_path)
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, request_path: impl Into<String>, entry: OverrideEntry) {
        self.entries.insert(request_path.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.entries.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

/// An entry with nothing configured does not override anything.
fn is_blank(entry: &serde_yaml::Value) -> bool {
    match entry {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::Mapping(fields) => fields.is_empty(),
        _ => false,
    }
}

impl FromIterator<(String, OverrideEntry)> for OverrideTable {
    fn from_iter<I: IntoIterator<Item = (String, OverrideEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A fixed response for one request path.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OverrideEntry {
    /// HTTP status code
    #[serde(default = "default_status", deserialize_with = "deserialize_status")]
    pub status_code: u16,

    /// JSON body returned verbatim
    #[serde(default = "default_body", alias = "response_body")]
    pub response: serde_json::Value,

    /// Seconds to wait before responding
    #[serde(default, alias = "delay_seconds")]
    pub delay: f64,
}

fn default_status() -> u16 {
    200
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusRepr {
    Number(u16),
    Text(String),
}

/// Accept `404` as well as `"404"`.
fn deserialize_status<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match StatusRepr::deserialize(deserializer)? {
        StatusRepr::Number(status) => Ok(status),
        StatusRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("invalid status code {text:?}"))),
    }
}

fn default_body() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for OverrideEntry {
    fn default() -> Self {
        Self {
            status_code: default_status(),
            response: default_body(),
            delay: 0.0,
        }
    }
}

impl OverrideEntry {
    /// Validate the entry.
    pub fn validate(&self) -> Result<()> {
        if !(100..=599).contains(&self.status_code) {
            return Err(Error::config(format!(
                "Invalid status code: {}",
                self.status_code
            )));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(Error::config(format!(
                "Delay must be a non-negative number of seconds, got {}",
                self.delay
            )));
        }
        Ok(())
    }

    /// The delay to apply before responding. Saturates at `Duration::MAX`.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_overrides() {
        let yaml = r#"
/mock/users/1:
  status_code: 404
  response:
    error: "User not found"
  delay: 1.5
/mock/health-check:
  response: ok
"#;
        let table = OverrideTable::from_yaml_str(yaml).unwrap();
        assert_eq!(table.len(), 2);

        let user = table.get("/mock/users/1").unwrap();
        assert_eq!(user.status_code, 404);
        assert_eq!(user.response["error"], "User not found");
        assert_eq!(user.delay(), Duration::from_millis(1500));

        let health = table.get("/mock/health-check").unwrap();
        assert_eq!(health.status_code, 200);
        assert_eq!(health.response, serde_json::json!("ok"));
        assert_eq!(health.delay(), Duration::ZERO);
    }

    #[test]
    fn test_entry_defaults() {
        let table = OverrideTable::from_yaml_str("/mock/partial:\n  delay: 0\n").unwrap();
        let entry = table.get("/mock/partial").unwrap();
        assert_eq!(entry, &OverrideEntry::default());
        assert_eq!(entry.response, serde_json::json!({}));
    }

    #[test]
    fn test_empty_entries_are_ignored() {
        let yaml = r#"
/mock/null:
/mock/empty: {}
/mock/set:
  status_code: 404
"#;
        let table = OverrideTable::from_yaml_str(yaml).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("/mock/null").is_none());
        assert!(table.get("/mock/empty").is_none());
        assert_eq!(table.get("/mock/set").unwrap().status_code, 404);
    }

    #[test]
    fn test_string_status_code() {
        let yaml = r#"
/mock/quoted:
  status_code: "404"
/mock/padded:
  status_code: " 503 "
"#;
        let table = OverrideTable::from_yaml_str(yaml).unwrap();
        assert_eq!(table.get("/mock/quoted").unwrap().status_code, 404);
        assert_eq!(table.get("/mock/padded").unwrap().status_code, 503);

        let err = OverrideTable::from_yaml_str("/mock/bad:\n  status_code: \"teapot\"\n").unwrap_err();
        assert!(err.to_string().contains("/mock/bad"));
    }

    #[test]
    fn test_huge_delay_saturates() {
        let table = OverrideTable::from_yaml_str("/mock/forever:\n  delay: 1.0e20\n").unwrap();
        let delay = table.get("/mock/forever").unwrap().delay();
        assert_eq!(delay, Duration::MAX);
        assert!(delay > Duration::from_secs(1));
    }

    #[test]
    fn test_field_aliases() {
        let yaml = r#"
/mock/slow:
  status_code: 202
  response_body: [1, 2, 3]
  delay_seconds: 0.25
"#;
        let table = OverrideTable::from_yaml_str(yaml).unwrap();
        let entry = table.get("/mock/slow").unwrap();
        assert_eq!(entry.response, serde_json::json!([1, 2, 3]));
        assert_eq!(entry.delay(), Duration::from_millis(250));
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = r#"
/mock/typo:
  status: 500
"#;
        assert!(OverrideTable::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_invalid_status_rejected() {
        let yaml = r#"
/mock/bad:
  status_code: 99
"#;
        let err = OverrideTable::from_yaml_str(yaml).unwrap_err();
        assert!(err.to_string().contains("Invalid status code"));
    }

    #[test]
    fn test_negative_delay_rejected() {
        let yaml = r#"
/mock/bad:
  delay: -1
"#;
        assert!(OverrideTable::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_relative_key_rejected() {
        let yaml = r#"
users/1:
  status_code: 200
"#;
        assert!(OverrideTable::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_empty_documents() {
        assert!(OverrideTable::from_yaml_str("").unwrap().is_empty());
        assert!(OverrideTable::from_yaml_str("~\n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = OverrideTable::from_file(&dir.path().join("absent.yaml")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{\"/mock/json\": {{\"status_code\": 418}}}}").unwrap();

        let table = OverrideTable::from_file(file.path()).unwrap();
        assert_eq!(table.get("/mock/json").unwrap().status_code, 418);
        assert_eq!(table.paths(), vec!["/mock/json"]);
    }
}
