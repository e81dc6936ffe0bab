//! Single-slot local draft for sessions not attached to a stored résumé.
//!
//! One fixed file (`resume-data.json`) under the configured directory holds
//! `{template_id, data, step, saved_at}`. Every save overwrites it wholesale
//! through a temp file + rename, so a crash mid-write leaves the previous
//! draft intact. There is no history.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::model::ResumeDocument;
use crate::document::normalize::parse_stored_document;
use crate::render::templates::TemplateId;
use crate::store::StoreError;

pub const DRAFT_FILE_NAME: &str = "resume-data.json";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalDraft {
    pub template_id: TemplateId,
    pub data: ResumeDocument,
    pub step: usize,
    pub saved_at: DateTime<Utc>,
}

/// On-disk shape as written by this and older clients.
#[derive(Debug, Deserialize)]
struct RawDraft {
    #[serde(default, alias = "templateId", alias = "template", alias = "selectedTemplate")]
    template_id: Option<String>,
    #[serde(default, alias = "documentJson", alias = "resumeData")]
    data: Value,
    #[serde(default, alias = "currentStep")]
    step: Option<usize>,
    #[serde(default, alias = "savedAt")]
    saved_at: Option<DateTime<Utc>>,
}

impl TryFrom<RawDraft> for LocalDraft {
    type Error = serde_json::Error;

    fn try_from(raw: RawDraft) -> Result<Self, Self::Error> {
        Ok(LocalDraft {
            template_id: raw
                .template_id
                .as_deref()
                .map(TemplateId::parse_or_default)
                .unwrap_or_default(),
            // One slot, so one seed for derived ids.
            data: parse_stored_document(raw.data, Uuid::nil())?,
            step: raw.step.unwrap_or(1).max(1),
            saved_at: raw.saved_at.unwrap_or_else(Utc::now),
        })
    }
}

#[derive(Debug, Clone)]
pub struct LocalDraftStore {
    dir: PathBuf,
}

impl LocalDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(DRAFT_FILE_NAME)
    }

    /// Reads the draft, if one exists. A corrupt file is logged and treated as
    /// absent so a bad draft never blocks starting a fresh session.
    pub async fn load(&self) -> Result<Option<LocalDraft>, StoreError> {
        let path = self.path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let parsed = serde_json::from_slice::<RawDraft>(&bytes).and_then(LocalDraft::try_from);
        match parsed {
            Ok(draft) => Ok(Some(draft)),
            Err(e) => {
                warn!(path = %path.display(), "Ignoring unreadable local draft: {e}");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, draft: &LocalDraft) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(draft)?;
        let dir = self.dir.clone();
        let path = self.path();

        tokio::task::spawn_blocking(move || write_atomically(&dir, &path, &bytes))
            .await
            .map_err(|e| StoreError::Task(format!("spawn_blocking failed in draft save: {e}")))??;

        debug!(step = draft.step, template = %draft.template_id, "Local draft saved");
        Ok(())
    }

    /// Removes the draft. Clearing an absent draft is not an error.
    pub async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_atomically(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::PersonalDetails;

    fn draft(first: &str, step: usize) -> LocalDraft {
        LocalDraft {
            template_id: TemplateId::Classic,
            data: ResumeDocument {
                personal_details: PersonalDetails {
                    first_name: first.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            },
            step,
            saved_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_draft_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDraftStore::new(dir.path());
        assert!(store.load().await.unwrap().is_none());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_save_overwrites_single_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDraftStore::new(dir.path().join("nested"));

        store.save(&draft("Ada", 2)).await.unwrap();
        store.save(&draft("Grace", 4)).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.data.personal_details.first_name, "Grace");
        assert_eq!(loaded.step, 4);
        assert_eq!(loaded.template_id, TemplateId::Classic);

        let entries = std::fs::read_dir(dir.path().join("nested")).unwrap().count();
        assert_eq!(entries, 1);

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_legacy_draft_shape_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDraftStore::new(dir.path());
        let legacy = serde_json::json!({
            "templateId": "minimal",
            "documentJson": {
                "personalDetails": {"firstName": "Ada"},
                "education": [{"id": "1", "collegeName": "State University"}]
            },
            "currentStep": 3
        });
        std::fs::write(store.path(), legacy.to_string()).unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.template_id, TemplateId::Minimal);
        assert_eq!(loaded.step, 3);
        assert_eq!(loaded.data.education[0].institution, "State University");
    }

    #[tokio::test]
    async fn test_draft_items_without_ids_load_with_the_same_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDraftStore::new(dir.path());
        let legacy = serde_json::json!({
            "resumeData": {"projects": [{"projectName": "Vitae"}, {"projectName": "Loom"}]}
        });
        std::fs::write(store.path(), legacy.to_string()).unwrap();

        let first = store.load().await.unwrap().unwrap();
        let second = store.load().await.unwrap().unwrap();
        assert_eq!(first.data, second.data);
        assert_ne!(first.data.projects[0].id, first.data.projects[1].id);
    }

    #[tokio::test]
    async fn test_corrupt_draft_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalDraftStore::new(dir.path());
        std::fs::write(store.path(), b"{not json").unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
