use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::time::{Duration, sleep};
use tracing_subscriber::EnvFilter;

use mulligan_core::domain::{OperationError, OperationState};
use mulligan_core::operation::Operation;
use mulligan_core::runner::{OperationStatus, RetryableOperation};

/// Simulated deployment call: fails `n` times with a fixed error, then
/// succeeds. Stands in for the opaque backend call a real panel would wire
/// in.
struct FlakyDeploy {
    error: &'static str,
    remaining_failures: AtomicU32,
}

impl FlakyDeploy {
    fn new(error: &'static str, n: u32) -> Self {
        Self {
            error,
            remaining_failures: AtomicU32::new(n),
        }
    }
}

#[async_trait]
impl Operation for FlakyDeploy {
    type Output = String;

    async fn run(&self) -> Result<String, OperationError> {
        // 実際のデプロイの代わりに少し待つ
        sleep(Duration::from_millis(150)).await;

        let left = self.remaining_failures.load(Ordering::Relaxed);
        if left > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::Relaxed);
            return Err(OperationError::new(self.error));
        }
        Ok("deployment finished".to_string())
    }
}

/// Start the operation, poll while it runs, and return the settled status.
/// The poll loop is what a UI would do to keep its spinner honest.
async fn drive(op: &RetryableOperation<FlakyDeploy>) -> OperationStatus<String> {
    let handle = op.clone();
    let run = tokio::spawn(async move { handle.execute().await });

    while !op.state().await.is_terminal() {
        println!("  ... deployment in progress");
        sleep(Duration::from_millis(50)).await;
    }
    let _ = run.await;
    op.status().await
}

/// Render the settled status the way the panel does: success banner, or
/// the formatted bundle plus an expandable technical-details block.
fn render(status: &OperationStatus<String>) {
    match status.state {
        OperationState::Succeeded => {
            println!("== Deployment Successful ==");
            if let Some(result) = &status.result {
                println!("   {result}");
            }
            println!(
                "   Your deployment completed successfully. No changes were made to your \
                 application functionality or data."
            );
        }
        OperationState::Failed => {
            if let (Some(formatted), Some(classification)) =
                (&status.formatted_error, &status.classification)
            {
                println!("== {} ==", formatted.title);
                println!("   {}", formatted.description);
                println!("   {}", formatted.action_message);
                println!("   -- technical details --");
                println!("   category:      {}", classification.category.as_str());
                println!(
                    "   safe to retry: {}",
                    if classification.is_safe_to_retry { "Yes" } else { "No" }
                );
                println!(
                    "   classification: {}",
                    serde_json::to_string(classification).unwrap()
                );
                println!("   raw error:     {}", formatted.technical_details);
            }
        }
        _ => {}
    }
    println!();
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // (A) A transient failure: two network timeouts, then success.
    //     Retrying is safe, so keep pressing the retry button.
    let op = RetryableOperation::new(FlakyDeploy::new(
        "network timeout: no response from subnet",
        2,
    ));
    println!(">> start deployment (id={})", op.id());

    let mut status = drive(&op).await;
    render(&status);

    while status.state == OperationState::Failed
        && status
            .classification
            .as_ref()
            .is_some_and(|c| c.is_safe_to_retry)
    {
        println!(">> retry deployment (attempt {})", status.attempts + 1);
        let handle = op.clone();
        let run = tokio::spawn(async move { handle.retry().await });
        while !op.state().await.is_terminal() {
            sleep(Duration::from_millis(50)).await;
        }
        let _ = run.await;
        status = op.status().await;
        render(&status);
    }

    // (B) Reset returns the panel to its initial state.
    op.reset().await;
    println!(">> reset: state={:?} attempts={}", op.state().await, op.attempts().await);
    println!();

    // (C) A deterministic failure: classification says a blind retry
    //     cannot succeed, so the panel offers no retry button.
    let op = RetryableOperation::new(FlakyDeploy::new(
        "build failed: compilation error in module X",
        u32::MAX,
    ));
    println!(">> start deployment (id={})", op.id());

    let status = drive(&op).await;
    render(&status);

    if let Some(classification) = &status.classification
        && !classification.is_safe_to_retry
    {
        println!(">> not retrying: failure is not safe to retry");
    }
}
