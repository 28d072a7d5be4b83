//! In-memory store backend

use super::models::{CategoryMap, PresentationDocument};
use super::PresentationStore;
use crate::error::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

/// Documents held in process memory; lost on restart
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: DashMap<String, PresentationDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of presentations with a document
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl PresentationStore for MemoryStore {
    async fn questions(&self, presentation: &str) -> Result<Vec<String>> {
        Ok(self
            .documents
            .get(presentation)
            .map(|doc| doc.questions.clone())
            .unwrap_or_default())
    }

    async fn categories(&self, presentation: &str, question_id: &str) -> Result<CategoryMap> {
        Ok(self
            .documents
            .get(presentation)
            .map(|doc| doc.categories_for(question_id))
            .unwrap_or_default())
    }

    async fn save_categories(
        &self,
        presentation: &str,
        question_id: &str,
        categories: &CategoryMap,
    ) -> Result<()> {
        debug!(
            "Saving {} categories for {}/{}",
            categories.len(),
            presentation,
            question_id
        );
        self.documents
            .entry(presentation.to_string())
            .or_insert_with(|| PresentationDocument::new(presentation))
            .merge_categories(question_id, categories);
        Ok(())
    }

    async fn add_question(&self, presentation: &str, question: &str) -> Result<bool> {
        Ok(self
            .documents
            .entry(presentation.to_string())
            .or_insert_with(|| PresentationDocument::new(presentation))
            .register_question(question))
    }

    async fn snapshot(&self, presentation: &str) -> Result<PresentationDocument> {
        Ok(self
            .documents
            .get(presentation)
            .map(|doc| doc.value().clone())
            .unwrap_or_else(|| PresentationDocument::new(presentation)))
    }
}
