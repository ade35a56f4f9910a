//! Domain model (ids, states, failure taxonomy, errors).

pub mod classification;
pub mod errors;
pub mod ids;
pub mod state;

pub use classification::{FailureCategory, FailureClassification};
pub use errors::OperationError;
pub use ids::OperationId;
pub use state::OperationState;
