//! Operation seam: the injected async operation a runner drives.
//!
//! The runner never looks inside `Output`; it only stores it on success.
//! Anything the operation fails with is coerced to an `OperationError`
//! before it reaches classification.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::domain::OperationError;

/// A zero-argument async operation with a generic result.
///
/// Implementations carry their own captured inputs; retrying means calling
/// `run` again on the same value, not re-parameterizing it.
#[async_trait]
pub trait Operation: Send + Sync {
    type Output: Send;

    async fn run(&self) -> Result<Self::Output, OperationError>;
}

type OperationFuture<T> = Pin<Box<dyn Future<Output = Result<T, OperationError>> + Send>>;

/// Adapter that lets a plain async closure satisfy [`Operation`].
///
/// # Example
/// ```ignore
/// let op = FnOperation::new(|| async { Ok::<_, OperationError>(42) });
/// ```
pub struct FnOperation<T> {
    f: Box<dyn Fn() -> OperationFuture<T> + Send + Sync>,
}

impl<T: Send + 'static> FnOperation<T> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, OperationError>> + Send + 'static,
    {
        Self {
            f: Box::new(move || Box::pin(f())),
        }
    }
}

#[async_trait]
impl<T: Send + 'static> Operation for FnOperation<T> {
    type Output = T;

    async fn run(&self) -> Result<T, OperationError> {
        (self.f)().await
    }
}
