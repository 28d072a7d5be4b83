//! Presentation/question store
//!
//! Key-value persistence addressed by presentation id (question list) and by
//! presentation id plus normalized question id (category map). Two backends:
//! - [`MemoryStore`] keeps documents in process memory
//! - [`FileStore`] writes one JSON document per presentation to disk

pub mod file;
pub mod memory;
pub mod models;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use models::{
    ascii_slug, presentation_id, question_id, question_text, CategoryMap, PresentationDocument,
    DEFAULT_PRESENTATION, DEFAULT_QUESTION,
};

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Storage operations needed by the categorizer
#[async_trait]
pub trait PresentationStore: Send + Sync {
    /// Registered questions in first-insertion order; empty if unknown
    async fn questions(&self, presentation: &str) -> Result<Vec<String>>;

    /// Category map for one question; empty if unknown
    async fn categories(&self, presentation: &str, question_id: &str) -> Result<CategoryMap>;

    /// Merge `categories` over the stored map for this question
    async fn save_categories(
        &self,
        presentation: &str,
        question_id: &str,
        categories: &CategoryMap,
    ) -> Result<()>;

    /// Register a question; returns false if it was already present
    async fn add_question(&self, presentation: &str, question: &str) -> Result<bool>;

    /// Full document for export; a fresh empty document if unknown
    async fn snapshot(&self, presentation: &str) -> Result<PresentationDocument>;
}

/// Build the configured store backend
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn PresentationStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreBackend::File => Ok(Arc::new(FileStore::open(&config.data_dir).await?)),
    }
}
