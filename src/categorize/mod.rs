//! Categorization service
//!
//! Reads the current category map, asks the classifier for a verdict,
//! appends the answer and persists the result.

pub mod service;

pub use service::{CategorizationOutcome, CategorizationService};
