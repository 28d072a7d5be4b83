//! Data models for presentations and their category maps

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Presentation used when the caller does not name one
pub const DEFAULT_PRESENTATION: &str = "default";

/// Question text used when the caller does not supply one
pub const DEFAULT_QUESTION: &str = "General";

/// Question id used when normalization leaves nothing behind
pub const FALLBACK_QUESTION_ID: &str = "general";

/// Maximum length of a normalized question id
pub const MAX_QUESTION_ID_LEN: usize = 120;

/// Maximum length of a file name slug
pub const MAX_SLUG_LEN: usize = 64;

/// Category name -> answers classified under it, in arrival order
pub type CategoryMap = IndexMap<String, Vec<String>>;

/// Resolve a caller-supplied presentation id
pub fn presentation_id(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => DEFAULT_PRESENTATION.to_string(),
    }
}

/// Resolve a caller-supplied question text
pub fn question_text(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => DEFAULT_QUESTION.to_string(),
    }
}

/// Normalize question text into a stable storage key.
///
/// Lowercases, collapses every run of non-alphanumeric characters into a
/// single `-`, trims dashes at both ends and truncates to
/// [`MAX_QUESTION_ID_LEN`] characters. Letters and digits of any script
/// count as alphanumeric.
pub fn question_id(question: &str) -> String {
    let mut id = String::with_capacity(question.len());
    let mut pending_dash = false;

    for ch in question.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            id.extend(ch.to_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    let id: String = id.chars().take(MAX_QUESTION_ID_LEN).collect();
    if id.is_empty() {
        FALLBACK_QUESTION_ID.to_string()
    } else {
        id
    }
}

/// ASCII-only slug for file names and download names.
///
/// Not unique: callers that need uniqueness add a hash.
pub fn ascii_slug(raw: &str) -> String {
    let slug: String = question_id(raw)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(MAX_SLUG_LEN)
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        FALLBACK_QUESTION_ID.to_string()
    } else {
        slug.to_string()
    }
}

/// Merge `updates` over `target`: each updated category replaces the stored
/// list wholesale, categories not mentioned are left alone.
pub fn merge_categories(target: &mut CategoryMap, updates: &CategoryMap) {
    for (category, answers) in updates {
        target.insert(category.clone(), answers.clone());
    }
}

/// Everything stored for one presentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationDocument {
    pub presentation: String,
    #[serde(default)]
    pub questions: Vec<String>,
    /// Keyed by normalized question id
    #[serde(default)]
    pub categories: IndexMap<String, CategoryMap>,
    pub updated_at: DateTime<Utc>,
}

impl PresentationDocument {
    pub fn new(presentation: impl Into<String>) -> Self {
        Self {
            presentation: presentation.into(),
            questions: Vec::new(),
            categories: IndexMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Append a question unless it is already registered
    pub fn register_question(&mut self, question: &str) -> bool {
        if self.questions.iter().any(|q| q == question) {
            return false;
        }
        self.questions.push(question.to_string());
        self.updated_at = Utc::now();
        true
    }

    pub fn categories_for(&self, question_id: &str) -> CategoryMap {
        self.categories.get(question_id).cloned().unwrap_or_default()
    }

    pub fn merge_categories(&mut self, question_id: &str, updates: &CategoryMap) {
        let target = self.categories.entry(question_id.to_string()).or_default();
        merge_categories(target, updates);
        self.updated_at = Utc::now();
    }

    /// Display text for a stored question id.
    ///
    /// Falls back to the id itself when no registered question maps to it.
    pub fn question_label(&self, question_id: &str) -> String {
        self.questions
            .iter()
            .find(|q| self::question_id(q) == question_id)
            .cloned()
            .unwrap_or_else(|| question_id.to_string())
    }
}
