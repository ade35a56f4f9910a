//! mulligan-core
//!
//! Building blocks for retryable operations with failure triage.
//!
//! # Module layout
//! - **domain**: value types (OperationId, OperationState, FailureCategory,
//!   FailureClassification, OperationError)
//! - **classify**: raw error -> category + retry-safety verdict
//! - **format**: classification -> user-facing explanation bundle
//! - **operation**: the injected-async-operation seam (Operation trait,
//!   FnOperation adapter)
//! - **runner**: RetryableOperation, the idle/running/succeeded/failed
//!   state machine around one operation
//!
//! A failure never escapes `execute`/`retry` as an `Err`: it is absorbed,
//! classified, and formatted, and surfaced through the instance's
//! observable state. The presentation layer on top only ever renders.

pub mod classify;
pub mod domain;
pub mod format;
pub mod operation;
pub mod runner;
