//! Policy knobs for behavior the access rules leave open.

use serde::{Deserialize, Serialize};

/// Who may pass the allow-list gate of a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// Only the record's allow-list counts. The global authorized set is an
    /// administrative flag with no effect on reads.
    #[default]
    AllowList,

    /// The caller must be on the allow-list *and* in the authorized set.
    /// Failing either produces the allow-list error.
    AllowListAndAuthorized,
}

/// What deleting a key with no record does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Succeed silently.
    #[default]
    Ignore,

    /// Fail with `NotFound`.
    Strict,
}
