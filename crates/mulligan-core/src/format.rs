//! Error formatter: classification -> human-readable explanation bundle.
//!
//! Every failure gets a title, a plain-language description, an action
//! recommendation, and the raw technical details for an expandable
//! "advanced" view. A bare raw error is never surfaced alone.

use serde::{Deserialize, Serialize};

use crate::domain::{FailureCategory, FailureClassification};

/// User-facing rendering of one classified failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedError {
    /// Short headline, e.g. "Network Connection Issue".
    pub title: String,

    /// Plain-language explanation of what went wrong.
    pub description: String,

    /// Recommended next step (retry vs. fix-and-retry vs. contact support).
    pub action_message: String,

    /// The original error message, verbatim.
    pub technical_details: String,
}

const RETRY_IS_SAFE: &str =
    "You can safely retry this deployment. Retrying will not change your application \
     functionality or data.";

/// Render a classification into its display bundle.
///
/// Pure function of `(category, is_safe_to_retry)`; `technical_details`
/// always carries `original_error` unchanged. One fixed template per
/// category; `Network`, `Deploy`, and `Unknown` branch their action
/// message on retry-safety, while `Build` and `Parsing` always direct the
/// user to fix the underlying issue first.
pub fn format_failure(classification: &FailureClassification) -> FormattedError {
    let FailureClassification {
        category,
        is_safe_to_retry,
        original_error,
    } = classification;

    match category {
        FailureCategory::Network => FormattedError {
            title: "Network Connection Issue".to_string(),
            description: "The deployment failed due to a network connectivity problem. This is \
                          usually a temporary issue with the deployment network or your internet \
                          connection."
                .to_string(),
            action_message: if *is_safe_to_retry {
                RETRY_IS_SAFE.to_string()
            } else {
                "Please check your network connection and try again later.".to_string()
            },
            technical_details: original_error.clone(),
        },

        FailureCategory::Deploy => FormattedError {
            title: "Deployment Step Failed".to_string(),
            description: "The deployment process encountered an issue while deploying to the \
                          target network. This could be related to canister management, wallet \
                          configuration, or deployment infrastructure."
                .to_string(),
            action_message: if *is_safe_to_retry {
                RETRY_IS_SAFE.to_string()
            } else {
                "Please review the deployment configuration and try again.".to_string()
            },
            technical_details: original_error.clone(),
        },

        FailureCategory::Build => FormattedError {
            title: "Build Failed".to_string(),
            description: "The deployment failed during the build step. This typically indicates \
                          a code compilation or bundling issue that needs to be fixed before \
                          deployment can succeed."
                .to_string(),
            action_message: "Please review the build diagnostics below and fix any code issues \
                             before retrying."
                .to_string(),
            technical_details: original_error.clone(),
        },

        FailureCategory::Parsing => FormattedError {
            title: "Message Parsing Error".to_string(),
            description: "The system encountered an error while parsing the deployment response. \
                          This may indicate an unexpected format in the deployment process \
                          output."
                .to_string(),
            action_message: "Please ensure the deployment message format is correct. If this \
                             persists, contact support."
                .to_string(),
            technical_details: original_error.clone(),
        },

        FailureCategory::Unknown => FormattedError {
            title: "Unexpected Error".to_string(),
            description: "An unexpected error occurred during deployment. The system could not \
                          automatically classify this error."
                .to_string(),
            action_message: if *is_safe_to_retry {
                "You can try retrying this deployment. If the issue persists, please contact \
                 support with the technical details below."
                    .to_string()
            } else {
                "Please contact support with the technical details below.".to_string()
            },
            technical_details: original_error.clone(),
        },
    }
}
