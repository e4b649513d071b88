//! Override resolution.
//!
//! Overrides are keyed by the literal runtime request path, `/mock` prefix
//! included. Path parameters are never pattern-matched: an entry for
//! `/mock/users/{id}` only answers a request whose path is literally
//! `/mock/users/{id}`. The HTTP method is not part of the key, so every
//! method on a path shares one entry.

use crate::config::{OverrideEntry, OverrideTable};

/// Look up the override configured for a request path.
pub fn resolve<'a>(overrides: &'a OverrideTable, request_path: &str) -> Option<&'a OverrideEntry> {
    overrides.get(request_path)
}
