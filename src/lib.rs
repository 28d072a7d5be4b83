//! Audience response categorizer
//!
//! Collects free-text answers per presentation and question, asks a
//! generative AI classifier to file each one under an existing or new
//! category, and stores the resulting category maps.

pub mod api;
pub mod categorize;
pub mod classifier;
pub mod config;
pub mod error;
pub mod locks;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod store;

pub use categorize::{CategorizationOutcome, CategorizationService};
pub use classifier::{Classification, Classifier, ClassifierError, GeminiClassifier};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use store::{CategoryMap, FileStore, MemoryStore, PresentationStore};
