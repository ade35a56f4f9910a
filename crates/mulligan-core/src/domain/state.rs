//! Operation state machine tags.

use serde::{Deserialize, Serialize};

/// State of one retryable operation instance.
///
/// State transitions:
/// - Idle -> Running -> Succeeded
/// - Idle -> Running -> Failed
/// - Failed -> Running (retry) -> Succeeded | Failed
/// - any state -> Idle (reset, does not invoke the operation)
///
/// Exactly one state is active per instance at any time. Calls received
/// while Running do not start a second invocation (see `RetryableOperation`).
///
/// Design note: Using an enum ensures exhaustive matching and prevents
/// invalid states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationState {
    /// Nothing has run yet, or the instance was reset.
    Idle,

    /// The wrapped operation is in flight.
    Running,

    /// The last invocation completed and its result is stored.
    Succeeded,

    /// The last invocation failed; classification and formatted error
    /// are stored.
    Failed,
}

impl OperationState {
    /// Is this a settled state (an invocation has finished)?
    pub fn is_terminal(self) -> bool {
        matches!(self, OperationState::Succeeded | OperationState::Failed)
    }

    /// May `execute`/`retry` start an invocation from this state?
    pub fn can_start(self) -> bool {
        !matches!(self, OperationState::Running)
    }
}
