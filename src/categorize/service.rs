//! Categorization service implementation

use crate::classifier::{Classifier, ClassifierError};
use crate::error::{Error, Result};
use crate::locks::KeyedLocks;
use crate::metrics::METRICS;
use crate::store::{
    presentation_id, question_id, question_text, CategoryMap, PresentationDocument,
    PresentationStore,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of categorizing one answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizationOutcome {
    pub presentation: String,
    pub question: String,
    pub category: String,
    /// Novelty as reported by the classifier
    pub is_new: bool,
    /// Whether the category was absent from the store before this answer
    pub created: bool,
    pub categories: CategoryMap,
}

/// Orchestrates store reads, classifier calls and store writes
pub struct CategorizationService {
    store: Arc<dyn PresentationStore>,
    classifier: Arc<dyn Classifier>,
    in_flight: KeyedLocks,
}

impl CategorizationService {
    pub fn new(store: Arc<dyn PresentationStore>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            store,
            classifier,
            in_flight: KeyedLocks::new(),
        }
    }

    /// Classify an answer and record it under the returned category.
    ///
    /// Requests for the same presentation and question run one at a time, so
    /// the read-modify-write of the category map cannot lose updates within
    /// this process. A persistence failure after classification drops the
    /// classification; nothing is retried.
    pub async fn categorize(
        &self,
        presentation: Option<&str>,
        question: Option<&str>,
        answer: &str,
    ) -> Result<CategorizationOutcome> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Err(Error::invalid_input("Answer cannot be empty."));
        }

        let presentation = presentation_id(presentation);
        let question = question_text(question);
        let qid = question_id(&question);

        let _guard = self
            .in_flight
            .lock(&format!("{}\u{0}{}", presentation, qid))
            .await;

        let mut categories = self.store.categories(&presentation, &qid).await?;
        let existing: Vec<String> = categories.keys().cloned().collect();

        debug!(
            "Classifying answer for {}/{} against {} categories",
            presentation,
            qid,
            existing.len()
        );

        let verdict = self.classifier.classify(answer, &existing).await?;
        let category = verdict.category_name.trim().to_string();
        if category.is_empty() {
            return Err(ClassifierError::EmptyCategory.into());
        }

        let created = !categories.contains_key(&category);
        if created != verdict.is_new {
            warn!(
                "Classifier novelty flag disagrees with store: category={}, is_new={}, present={}",
                category, verdict.is_new, !created
            );
        }

        categories
            .entry(category.clone())
            .or_default()
            .push(answer.to_string());

        self.store
            .save_categories(&presentation, &qid, &categories)
            .await?;
        if self.store.add_question(&presentation, &question).await? {
            METRICS.questions_registered.inc();
        }

        info!(
            "Answer categorized: presentation={}, question={}, category={}, new={}",
            presentation, qid, category, created
        );

        Ok(CategorizationOutcome {
            presentation,
            question,
            category,
            is_new: verdict.is_new,
            created,
            categories,
        })
    }

    /// Questions registered for a presentation
    pub async fn questions(&self, presentation: Option<&str>) -> Result<Vec<String>> {
        self.store.questions(&presentation_id(presentation)).await
    }

    /// Category map for one question
    pub async fn categories(
        &self,
        presentation: Option<&str>,
        question: Option<&str>,
    ) -> Result<CategoryMap> {
        let qid = question_id(&question_text(question));
        self.store.categories(&presentation_id(presentation), &qid).await
    }

    /// Register a question; returns false if it was already listed
    pub async fn add_question(&self, presentation: Option<&str>, question: &str) -> Result<bool> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::invalid_input("Question cannot be empty."));
        }

        let presentation = presentation_id(presentation);
        let added = self.store.add_question(&presentation, question).await?;
        if added {
            METRICS.questions_registered.inc();
            info!("Question registered: presentation={}, question={}", presentation, question);
        }
        Ok(added)
    }

    /// Full presentation document for export
    pub async fn export(&self, presentation: Option<&str>) -> Result<PresentationDocument> {
        self.store.snapshot(&presentation_id(presentation)).await
    }
}
