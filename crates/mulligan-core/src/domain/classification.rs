//! Failure taxonomy: category tags and the classification value.
//!
//! This module only defines the "shape" of a classified failure. The rules
//! that produce one live in `classify`; the user-facing rendering lives in
//! `format`.

use serde::{Deserialize, Serialize};

/// A unified classification of a failed attempt.
///
/// Fixed, closed set. Serialized as lowercase tags to match the names the
/// presentation layer displays: build / deploy / network / parsing / unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureCategory {
    /// Code-level build or compilation failure.
    Build,

    /// Deployment infrastructure failure (canister, wallet, legacy tooling).
    Deploy,

    /// Network connectivity failure (timeouts, dropped connections).
    Network,

    /// Response/message parsing failure.
    Parsing,

    /// Anything the rules did not recognize.
    Unknown,
}

impl FailureCategory {
    /// Short label for logs and display.
    pub fn as_str(self) -> &'static str {
        match self {
            FailureCategory::Build => "build",
            FailureCategory::Deploy => "deploy",
            FailureCategory::Network => "network",
            FailureCategory::Parsing => "parsing",
            FailureCategory::Unknown => "unknown",
        }
    }
}

/// The classified form of one failure.
///
/// Derived deterministically from a single error; immutable once created
/// and compared by value. `original_error` keeps the raw message so no
/// information is lost between classification and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureClassification {
    pub category: FailureCategory,

    /// Whether the failure is likely transient, so running the identical
    /// call again may succeed without any code change.
    pub is_safe_to_retry: bool,

    /// The error message exactly as the operation produced it.
    pub original_error: String,
}

impl FailureClassification {
    pub fn new(
        category: FailureCategory,
        is_safe_to_retry: bool,
        original_error: impl Into<String>,
    ) -> Self {
        Self {
            category,
            is_safe_to_retry,
            original_error: original_error.into(),
        }
    }
}
