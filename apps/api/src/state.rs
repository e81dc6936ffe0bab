use std::sync::Arc;

use crate::config::Config;
use crate::store::{LocalDraftStore, ResumeStore};
use crate::wizard::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Résumé records. Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn ResumeStore>,
    /// Fallback for wizard sessions not attached to a record.
    pub drafts: LocalDraftStore,
    pub sessions: Arc<SessionRegistry>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn ResumeStore>, config: Config) -> Self {
        Self {
            store,
            drafts: LocalDraftStore::new(config.local_draft_dir.clone()),
            sessions: Arc::new(SessionRegistry::new()),
            config,
        }
    }
}
