// Persistence collaborator: résumé rows keyed by (id, user_id), plus the
// single-slot local draft used when no remote record is attached.

pub mod local_draft;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::{NewResume, ResumePatch, ResumeRecord};

pub use local_draft::{LocalDraft, LocalDraftStore};
pub use memory::MemoryResumeStore;
pub use postgres::PgResumeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("draft file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored document is malformed: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("resume {0} no longer exists")]
    Gone(Uuid),

    #[error("background task failed: {0}")]
    Task(String),
}

/// Row store for résumés. Every call names the acting user; a record owned by
/// someone else behaves exactly like a missing one.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn create(&self, user_id: Uuid, new: NewResume) -> Result<ResumeRecord, StoreError>;

    /// Newest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<ResumeRecord>, StoreError>;

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<ResumeRecord>, StoreError>;

    /// Applies the patch and returns the updated record, or `None` when no such
    /// record exists. `updated_at` only moves when something actually changed.
    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: ResumePatch,
    ) -> Result<Option<ResumeRecord>, StoreError>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
}
