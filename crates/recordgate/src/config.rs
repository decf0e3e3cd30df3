//! Gate configuration.

use serde::{Deserialize, Serialize};

use recordgate_perms::{DeletePolicy, ReadPolicy};

use crate::error::Result;

/// Configuration for a [`RecordGate`](crate::RecordGate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Whether the authorized set also gates reads.
    pub read_policy: ReadPolicy,

    /// Whether deleting a missing record is an error.
    pub delete_policy: DeletePolicy,

    /// Emit tracing events for granted and denied calls.
    pub audit: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            read_policy: ReadPolicy::AllowList,
            delete_policy: DeletePolicy::Ignore,
            audit: true,
        }
    }
}

impl GateConfig {
    /// Parse from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Disable audit events (for tests).
    pub fn without_audit(mut self) -> Self {
        self.audit = false;
        self
    }
}
