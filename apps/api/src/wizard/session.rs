use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::wizard::autosave::{Autosaver, DraftSink, SaveOutcome, SaveStatus};
use crate::wizard::state::WizardState;

/// One open wizard: its state, where it saves to, and its autosave task.
pub struct WizardSession {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    /// Stored record this session saves into; `None` for the local draft.
    pub resume_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    state: Arc<Mutex<WizardState>>,
    autosaver: Arc<Autosaver>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WizardSession {
    pub fn new(
        user_id: Option<Uuid>,
        resume_id: Option<Uuid>,
        state: WizardState,
        sink: Arc<dyn DraftSink>,
    ) -> Self {
        let state = Arc::new(Mutex::new(state));
        let autosaver = Arc::new(Autosaver::new(Arc::clone(&state), sink));
        Self {
            id: Uuid::new_v4(),
            user_id,
            resume_id,
            started_at: Utc::now(),
            state,
            autosaver,
            task: Mutex::new(None),
        }
    }

    /// Starts periodic saving. Calling it again replaces the previous task.
    pub fn start_autosave(&self, period: Duration) {
        let handle = self.autosaver.spawn(period);
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = task.replace(handle) {
            old.abort();
        }
    }

    /// Runs `f` with the state locked. Never hold the result across an await.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut WizardState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    pub async fn save(&self) -> SaveOutcome {
        self.autosaver.save_now().await
    }

    pub fn save_status(&self) -> SaveStatus {
        self.autosaver.status()
    }

    /// Final flush, then stops the autosave task.
    pub async fn close(&self) -> SaveOutcome {
        let outcome = self.autosaver.save_now().await;
        let handle = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
        info!(session_id = %self.id, ?outcome, "Wizard session closed");
        outcome
    }
}

impl Drop for WizardSession {
    fn drop(&mut self) {
        if let Some(handle) = self.task.get_mut().ok().and_then(Option::take) {
            handle.abort();
        }
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<WizardSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: WizardSession) -> Arc<WizardSession> {
        let session = Arc::new(session);
        self.sessions
            .write()
            .await
            .insert(session.id, Arc::clone(&session));
        session
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<WizardSession>> {
        self.sessions.read().await.get(&id).cloned()
    }

    pub async fn remove(&self, id: Uuid) -> Option<Arc<WizardSession>> {
        self.sessions.write().await.remove(&id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
