//! Retryable-operation runner: drives an injected async operation through
//! idle -> running -> succeeded/failed, classifying and formatting failures
//! into observable state.
//!
//! Design intent:
//! - The runner is the authority on overlap: a call received while Running
//!   is ignored, never a second concurrent invocation.
//! - The operation's error never crosses `execute`/`retry` as an `Err`; it
//!   is absorbed into the cell and surfaced through `status()`.
//! - The cell mutex is never held across the operation's await.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::classify::classify;
use crate::domain::{
    FailureClassification, OperationError, OperationId, OperationState,
};
use crate::format::{FormattedError, format_failure};
use crate::operation::{FnOperation, Operation};

/// Observable fields of one operation instance.
///
/// Single source of truth for instance state. All transitions happen
/// through methods here, which keep the field invariant:
/// `result` is Some iff Succeeded; `error`, `classification` and
/// `formatted_error` are Some iff Failed.
struct OperationCell<T> {
    state: OperationState,
    result: Option<T>,
    error: Option<OperationError>,
    classification: Option<FailureClassification>,
    formatted_error: Option<FormattedError>,

    /// Number of invocations started (including the current one if Running).
    attempts: u32,

    /// Timestamps for observability.
    created_at: Instant,
    updated_at: Instant,
}

impl<T> OperationCell<T> {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            state: OperationState::Idle,
            result: None,
            error: None,
            classification: None,
            formatted_error: None,
            attempts: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Transition to Running, clearing every outcome field.
    fn begin_attempt(&mut self) {
        self.state = OperationState::Running;
        self.result = None;
        self.error = None;
        self.classification = None;
        self.formatted_error = None;
        self.attempts += 1;
        self.updated_at = Instant::now();
    }

    fn mark_succeeded(&mut self, result: T) {
        self.state = OperationState::Succeeded;
        self.result = Some(result);
        self.updated_at = Instant::now();
    }

    fn mark_failed(
        &mut self,
        error: OperationError,
        classification: FailureClassification,
        formatted_error: FormattedError,
    ) {
        self.state = OperationState::Failed;
        self.error = Some(error);
        self.classification = Some(classification);
        self.formatted_error = Some(formatted_error);
        self.updated_at = Instant::now();
    }

    /// Back to Idle with every outcome field cleared.
    fn clear(&mut self) {
        self.state = OperationState::Idle;
        self.result = None;
        self.error = None;
        self.classification = None;
        self.formatted_error = None;
        self.updated_at = Instant::now();
    }
}

/// Cloned snapshot of an operation instance, for a presentation layer.
#[derive(Debug, Clone)]
pub struct OperationStatus<T> {
    pub id: OperationId,
    pub state: OperationState,
    pub result: Option<T>,
    pub error: Option<OperationError>,
    pub classification: Option<FailureClassification>,
    pub formatted_error: Option<FormattedError>,
    pub attempts: u32,
    pub created_at: Instant,
    pub updated_at: Instant,
}

/// Stateful wrapper that makes one async operation retryable.
///
/// Owns the operation and its observable state. `execute` runs the
/// operation exactly once; on failure the error is classified and
/// formatted, and both are exposed alongside the state tag. `retry` is
/// the identical call again; `reset` returns to Idle without invoking
/// the operation.
///
/// Cloning yields another handle to the same instance (shared cell,
/// shared operation).
pub struct RetryableOperation<O: Operation> {
    id: OperationId,
    op: Arc<O>,
    cell: Arc<Mutex<OperationCell<O::Output>>>,
}

impl<O: Operation> Clone for RetryableOperation<O> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            op: Arc::clone(&self.op),
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<O: Operation> RetryableOperation<O> {
    pub fn new(op: O) -> Self {
        Self {
            id: OperationId::generate(),
            op: Arc::new(op),
            cell: Arc::new(Mutex::new(OperationCell::new())),
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    /// Run the wrapped operation once and record the outcome.
    ///
    /// Legal from any state; acts as "start or restart". Clears any prior
    /// outcome fields before invoking. Never returns an error: a failure
    /// is classified, formatted, and stored, and the resulting state tag
    /// is returned. If the instance is already Running, the call is
    /// ignored and `Running` is returned without a second invocation.
    pub async fn execute(&self) -> OperationState {
        {
            let mut cell = self.cell.lock().await;
            if !cell.state.can_start() {
                debug!(id = %self.id, "execute ignored: invocation already in flight");
                return cell.state;
            }
            cell.begin_attempt();
            debug!(id = %self.id, attempt = cell.attempts, "operation started");
        }
        // Lock released: the operation may suspend for as long as it likes.

        let outcome = self.op.run().await;

        let mut cell = self.cell.lock().await;
        match outcome {
            Ok(result) => {
                cell.mark_succeeded(result);
                debug!(id = %self.id, attempts = cell.attempts, "operation succeeded");
            }
            Err(error) => {
                let classification = classify(&error);
                let formatted = format_failure(&classification);
                warn!(
                    id = %self.id,
                    attempts = cell.attempts,
                    category = classification.category.as_str(),
                    is_safe_to_retry = classification.is_safe_to_retry,
                    error = %error,
                    "operation failed"
                );
                cell.mark_failed(error, classification, formatted);
            }
        }
        cell.state
    }

    /// Try the identical call again.
    ///
    /// Same wrapped operation, same captured inputs; nothing is
    /// re-parameterized between attempts.
    pub async fn retry(&self) -> OperationState {
        self.execute().await
    }

    /// Return to Idle and clear result, error, classification, and
    /// formatted error. Does not invoke the operation.
    ///
    /// No-op while Running: only the in-flight invocation may move the
    /// instance out of Running, so a completing operation never records
    /// its outcome into a cell that was reset underneath it.
    pub async fn reset(&self) {
        let mut cell = self.cell.lock().await;
        if cell.state == OperationState::Running {
            debug!(id = %self.id, "reset ignored: invocation in flight");
            return;
        }
        cell.clear();
        debug!(id = %self.id, "operation reset");
    }

    /// Current state tag.
    pub async fn state(&self) -> OperationState {
        self.cell.lock().await.state
    }

    /// Number of invocations started so far.
    pub async fn attempts(&self) -> u32 {
        self.cell.lock().await.attempts
    }
}

impl<O: Operation> RetryableOperation<O>
where
    O::Output: Clone,
{
    /// Full snapshot for a presentation layer.
    pub async fn status(&self) -> OperationStatus<O::Output> {
        let cell = self.cell.lock().await;
        OperationStatus {
            id: self.id,
            state: cell.state,
            result: cell.result.clone(),
            error: cell.error.clone(),
            classification: cell.classification.clone(),
            formatted_error: cell.formatted_error.clone(),
            attempts: cell.attempts,
            created_at: cell.created_at,
            updated_at: cell.updated_at,
        }
    }
}

impl<T: Send + 'static> RetryableOperation<FnOperation<T>> {
    /// Wrap a zero-argument async closure without a hand-written
    /// [`Operation`] impl.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, OperationError>> + Send + 'static,
    {
        Self::new(FnOperation::new(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FailureCategory;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Notify;
    use tokio::time::{Duration, sleep};

    /// Fails `failures` times with `error`, then succeeds.
    struct Flaky {
        error: &'static str,
        remaining_failures: AtomicU32,
        calls: AtomicU32,
    }

    impl Flaky {
        fn new(error: &'static str, failures: u32) -> Self {
            Self {
                error,
                remaining_failures: AtomicU32::new(failures),
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Operation for Flaky {
        type Output = String;

        async fn run(&self) -> Result<String, OperationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.remaining_failures.load(Ordering::SeqCst);
            if left > 0 {
                self.remaining_failures.fetch_sub(1, Ordering::SeqCst);
                return Err(OperationError::new(self.error));
            }
            Ok("deployed".to_string())
        }
    }

    #[tokio::test]
    async fn successful_execute_reaches_succeeded() {
        let op = RetryableOperation::from_fn(|| async { Ok("ok".to_string()) });
        assert_eq!(op.state().await, OperationState::Idle);

        let state = op.execute().await;
        assert_eq!(state, OperationState::Succeeded);

        let status = op.status().await;
        assert_eq!(status.result.as_deref(), Some("ok"));
        assert!(status.error.is_none());
        assert!(status.classification.is_none());
        assert!(status.formatted_error.is_none());
        assert_eq!(status.attempts, 1);
    }

    #[tokio::test]
    async fn failed_execute_is_classified_and_formatted() {
        let op = RetryableOperation::new(Flaky::new("network timeout: no response from subnet", 1));

        let state = op.execute().await;
        assert_eq!(state, OperationState::Failed);

        let status = op.status().await;
        assert!(status.result.is_none());
        assert_eq!(
            status.error.as_ref().unwrap().message(),
            "network timeout: no response from subnet"
        );

        let classification = status.classification.unwrap();
        assert_eq!(classification.category, FailureCategory::Network);
        assert!(classification.is_safe_to_retry);

        let formatted = status.formatted_error.unwrap();
        assert_eq!(formatted.title, "Network Connection Issue");
        assert_eq!(
            formatted.technical_details,
            "network timeout: no response from subnet"
        );
    }

    #[tokio::test]
    async fn retry_reinvokes_the_same_operation() {
        let op = RetryableOperation::new(Flaky::new("network timeout", 1));

        assert_eq!(op.execute().await, OperationState::Failed);
        assert_eq!(op.retry().await, OperationState::Succeeded);

        let status = op.status().await;
        assert_eq!(status.result.as_deref(), Some("deployed"));
        // Failure fields from the first attempt were cleared on retry.
        assert!(status.error.is_none());
        assert!(status.classification.is_none());
        assert!(status.formatted_error.is_none());
        assert_eq!(status.attempts, 2);
    }

    #[tokio::test]
    async fn retrying_a_deterministic_failure_keeps_its_classification() {
        let op = RetryableOperation::new(Flaky::new(
            "build failed: compilation error in module X",
            u32::MAX,
        ));

        assert_eq!(op.execute().await, OperationState::Failed);
        let first = op.status().await.classification.unwrap();

        assert_eq!(op.retry().await, OperationState::Failed);
        let second = op.status().await.classification.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.category, FailureCategory::Build);
        assert!(!second.is_safe_to_retry);
        assert_eq!(op.status().await.formatted_error.unwrap().title, "Build Failed");
    }

    #[tokio::test]
    async fn reset_clears_everything_from_any_settled_state() {
        let op = RetryableOperation::new(Flaky::new("network timeout", 1));

        assert_eq!(op.execute().await, OperationState::Failed);
        op.reset().await;

        let status = op.status().await;
        assert_eq!(status.state, OperationState::Idle);
        assert!(status.result.is_none());
        assert!(status.error.is_none());
        assert!(status.classification.is_none());
        assert!(status.formatted_error.is_none());

        assert_eq!(op.execute().await, OperationState::Succeeded);
        op.reset().await;
        assert_eq!(op.state().await, OperationState::Idle);
        assert!(op.status().await.result.is_none());
    }

    #[tokio::test]
    async fn calls_received_while_running_are_ignored() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicU32::new(0));

        let op = {
            let gate = Arc::clone(&gate);
            let calls = Arc::clone(&calls);
            RetryableOperation::from_fn(move || {
                let gate = Arc::clone(&gate);
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    gate.notified().await;
                    Ok(())
                }
            })
        };

        let handle = op.clone();
        let running = tokio::spawn(async move { handle.execute().await });

        // Wait until the first invocation is in flight.
        while op.state().await != OperationState::Running {
            sleep(Duration::from_millis(1)).await;
        }

        // A second execute and a retry are both ignored.
        assert_eq!(op.execute().await, OperationState::Running);
        assert_eq!(op.retry().await, OperationState::Running);

        // Reset is a no-op while running.
        op.reset().await;
        assert_eq!(op.state().await, OperationState::Running);

        gate.notify_one();
        assert_eq!(running.await.unwrap(), OperationState::Succeeded);

        // Exactly one invocation reached the operation.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(op.attempts().await, 1);
    }

    #[tokio::test]
    async fn handles_share_one_instance() {
        let op = RetryableOperation::new(Flaky::new("network timeout", 0));
        let other = op.clone();

        assert_eq!(op.id(), other.id());
        op.execute().await;
        assert_eq!(other.state().await, OperationState::Succeeded);
    }
}
