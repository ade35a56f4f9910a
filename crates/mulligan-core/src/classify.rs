//! Failure classifier: raw error -> category + retry-safety verdict.
//!
//! Classification is substring matching over the lowercased message,
//! evaluated as an ordered decision list (first match wins). It is not
//! semantic: a parse-like message without a matching keyword falls through
//! to `Unknown`.

use std::fmt;

use crate::domain::{FailureCategory, FailureClassification};

/// One entry in the decision list.
struct Rule {
    category: FailureCategory,
    is_safe_to_retry: bool,
    keywords: &'static [&'static str],
}

/// Ordered decision list. First match wins.
///
/// Ordering matters because a message may contain several matching
/// substrings (e.g. a deploy error mentioning a network timeout): parsing
/// and build take precedence since those are deterministic, code-level
/// failures where a blind retry cannot succeed. Deploy and network
/// failures are treated as operational and transient.
const RULES: &[Rule] = &[
    Rule {
        category: FailureCategory::Parsing,
        is_safe_to_retry: false,
        keywords: &["parsing", "parse"],
    },
    Rule {
        category: FailureCategory::Build,
        is_safe_to_retry: false,
        keywords: &["build", "compilation"],
    },
    Rule {
        category: FailureCategory::Deploy,
        is_safe_to_retry: true,
        keywords: &["canister", "wallet", "legacy", "deploy"],
    },
    Rule {
        category: FailureCategory::Network,
        is_safe_to_retry: true,
        keywords: &["network", "timeout", "connection", "no response", "subnet", "fetch"],
    },
];

/// Classify an error into a failure category and retry-safety verdict.
///
/// Total function: any value is rendered to a string first, so it never
/// fails. Unrecognized messages classify as `Unknown` and safe to retry,
/// so an unclassified failure does not block the user from retrying.
pub fn classify<E: fmt::Display + ?Sized>(error: &E) -> FailureClassification {
    let message = error.to_string();
    let lowered = message.to_lowercase();

    for rule in RULES {
        if rule.keywords.iter().any(|k| lowered.contains(k)) {
            return FailureClassification::new(rule.category, rule.is_safe_to_retry, message);
        }
    }

    FailureClassification::new(FailureCategory::Unknown, true, message)
}
