//! File store backend: one JSON document per presentation

use super::models::{ascii_slug, CategoryMap, PresentationDocument};
use super::PresentationStore;
use crate::error::{Error, Result};
use crate::locks::KeyedLocks;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Persists each presentation as `<data_dir>/<slug>-<hash>.json`
#[derive(Debug)]
pub struct FileStore {
    data_dir: PathBuf,
    writers: KeyedLocks,
}

impl FileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("File store ready at {}", data_dir.display());

        Ok(Self {
            data_dir,
            writers: KeyedLocks::new(),
        })
    }

    /// Document path for a presentation.
    ///
    /// The slug keeps file names readable; the hash keeps ids that normalize
    /// to the same slug apart.
    pub fn document_path(&self, presentation: &str) -> PathBuf {
        let digest = hex::encode(Sha256::digest(presentation.as_bytes()));
        let slug = ascii_slug(presentation);
        self.data_dir
            .join(format!("{}-{}.json", slug, &digest[..16]))
    }

    async fn load(&self, presentation: &str) -> Result<Option<PresentationDocument>> {
        let path = self.document_path(presentation);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&raw).map(Some).map_err(|e| {
            Error::Storage(format!(
                "Corrupt presentation document {}: {}",
                path.display(),
                e
            ))
        })
    }

    async fn load_or_new(&self, presentation: &str) -> Result<PresentationDocument> {
        Ok(self
            .load(presentation)
            .await?
            .unwrap_or_else(|| PresentationDocument::new(presentation)))
    }

    /// Write via a temp file and rename so readers never see a partial document
    async fn write(&self, document: &PresentationDocument) -> Result<()> {
        let path = self.document_path(&document.presentation);
        let tmp = path.with_extension(format!("{}.tmp", uuid::Uuid::new_v4()));
        let body = serde_json::to_vec_pretty(document)?;

        tokio::fs::write(&tmp, body).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        debug!("Wrote presentation document {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl PresentationStore for FileStore {
    async fn questions(&self, presentation: &str) -> Result<Vec<String>> {
        Ok(self
            .load(presentation)
            .await?
            .map(|doc| doc.questions)
            .unwrap_or_default())
    }

    async fn categories(&self, presentation: &str, question_id: &str) -> Result<CategoryMap> {
        Ok(self
            .load(presentation)
            .await?
            .map(|doc| doc.categories_for(question_id))
            .unwrap_or_default())
    }

    async fn save_categories(
        &self,
        presentation: &str,
        question_id: &str,
        categories: &CategoryMap,
    ) -> Result<()> {
        let _guard = self.writers.lock(presentation).await;
        let mut document = self.load_or_new(presentation).await?;
        document.merge_categories(question_id, categories);
        self.write(&document).await
    }

    async fn add_question(&self, presentation: &str, question: &str) -> Result<bool> {
        let _guard = self.writers.lock(presentation).await;
        let mut document = self.load_or_new(presentation).await?;
        if !document.register_question(question) {
            return Ok(false);
        }
        self.write(&document).await?;
        Ok(true)
    }

    async fn snapshot(&self, presentation: &str) -> Result<PresentationDocument> {
        self.load_or_new(presentation).await
    }
}
