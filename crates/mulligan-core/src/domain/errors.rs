//! Error type for wrapped operations.

use thiserror::Error;

/// Failure raised by a wrapped operation.
///
/// This is the uniform coercion target for whatever the operation failed
/// with: the runner stores it, the classifier inspects its rendered
/// message, and the formatter carries that message through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationError {
    message: String,
}

impl OperationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Coerce an arbitrary error value into an `OperationError`.
    ///
    /// Keeps the rendered message only; the source is not retained because
    /// classification and display both operate on the message string.
    pub fn from_display(err: impl std::fmt::Display) -> Self {
        Self::new(err.to_string())
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for OperationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for OperationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_raw_message() {
        let err = OperationError::new("network timeout: no response from subnet");
        assert_eq!(err.to_string(), "network timeout: no response from subnet");
    }

    #[test]
    fn from_display_keeps_the_rendered_message() {
        let io = std::io::Error::other("connection refused by peer");
        let err = OperationError::from_display(&io);
        assert_eq!(err.message(), "connection refused by peer");
    }
}
