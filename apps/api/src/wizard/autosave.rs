//! Periodic, non-overlapping persistence of a wizard session.
//!
//! Saves are snapshot-then-send: the state is copied under the session lock,
//! the lock is released, and only then does I/O start. At most one save is
//! in flight per session; a save requested while another is running is
//! dropped (coalesced) rather than queued.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::resume::ResumePatch;
use crate::store::{LocalDraft, LocalDraftStore, ResumeStore, StoreError};
use crate::wizard::state::{WizardSnapshot, WizardState};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);

/// Destination of wizard saves.
#[async_trait]
pub trait DraftSink: Send + Sync {
    async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), StoreError>;

    /// Short label for logs.
    fn describe(&self) -> String;
}

/// Saves into a stored résumé record.
pub struct RemoteSink {
    store: Arc<dyn ResumeStore>,
    resume_id: Uuid,
    user_id: Uuid,
}

impl RemoteSink {
    pub fn new(store: Arc<dyn ResumeStore>, resume_id: Uuid, user_id: Uuid) -> Self {
        Self { store, resume_id, user_id }
    }
}

#[async_trait]
impl DraftSink for RemoteSink {
    async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), StoreError> {
        let patch = ResumePatch {
            template_id: Some(snapshot.template_id),
            data: Some(snapshot.document.clone()),
            ..Default::default()
        };
        self.store
            .update(self.resume_id, self.user_id, patch)
            .await?
            .ok_or(StoreError::Gone(self.resume_id))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("resume {}", self.resume_id)
    }
}

/// Saves into the single-slot local draft. A revision and step already on
/// disk are not written again.
pub struct LocalSink {
    drafts: LocalDraftStore,
    last_written: Mutex<Option<(u64, usize)>>,
}

impl LocalSink {
    pub fn new(drafts: LocalDraftStore) -> Self {
        Self {
            drafts,
            last_written: Mutex::new(None),
        }
    }
}

#[async_trait]
impl DraftSink for LocalSink {
    async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), StoreError> {
        let written = *self.last_written.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (snapshot.revision, snapshot.step);
        if written == Some(key) {
            debug!(revision = snapshot.revision, "Local draft already current");
            return Ok(());
        }

        let draft = LocalDraft {
            template_id: snapshot.template_id,
            data: snapshot.document.clone(),
            step: snapshot.step,
            saved_at: Utc::now(),
        };
        self.drafts.save(&draft).await?;
        *self.last_written.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);
        Ok(())
    }

    fn describe(&self) -> String {
        "local draft".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved { revision: u64 },
    /// Another save was already in flight.
    Coalesced,
    Failed { message: String },
}

/// Last known persistence state of a session, for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaveStatus {
    pub last_saved_revision: Option<u64>,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Clears the in-flight flag when the save finishes or its future is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Autosaver {
    state: Arc<Mutex<WizardState>>,
    sink: Arc<dyn DraftSink>,
    in_flight: AtomicBool,
    coalesced: AtomicU64,
    status: Mutex<SaveStatus>,
}

impl Autosaver {
    pub fn new(state: Arc<Mutex<WizardState>>, sink: Arc<dyn DraftSink>) -> Self {
        Self {
            state,
            sink,
            in_flight: AtomicBool::new(false),
            coalesced: AtomicU64::new(0),
            status: Mutex::new(SaveStatus::default()),
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of save requests dropped because one was already running.
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }

    /// Saves the current state unless a save is already running. Failures are
    /// recorded in [`SaveStatus`] and never touch the wizard state.
    pub async fn save_now(&self) -> SaveOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            self.coalesced.fetch_add(1, Ordering::Relaxed);
            debug!(sink = %self.sink.describe(), "Save already in flight, coalescing");
            return SaveOutcome::Coalesced;
        }
        let _flight = InFlight(&self.in_flight);

        let snapshot = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();

        let result = self.sink.save(&snapshot).await;

        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        match result {
            Ok(()) => {
                status.last_saved_revision = Some(snapshot.revision);
                status.last_saved_at = Some(Utc::now());
                status.last_error = None;
                debug!(sink = %self.sink.describe(), revision = snapshot.revision, "Saved");
                SaveOutcome::Saved { revision: snapshot.revision }
            }
            Err(e) => {
                warn!(sink = %self.sink.describe(), "Save failed: {e}");
                let message = e.to_string();
                status.last_error = Some(message.clone());
                SaveOutcome::Failed { message }
            }
        }
    }

    /// Starts the periodic save task. Each tick launches its save separately,
    /// so a slow save never delays the ticker and overlapping ticks coalesce.
    pub fn spawn(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let saver = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; nothing to save yet.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let saver = Arc::clone(&saver);
                tokio::spawn(async move {
                    saver.save_now().await;
                });
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    use crate::document::model::{PersonalDetails, SectionValue};
    use crate::models::resume::NewResume;
    use crate::store::MemoryResumeStore;

    /// Counts calls and takes `delay` to finish each.
    struct SlowSink {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl DraftSink for SlowSink {
        async fn save(&self, _snapshot: &WizardSnapshot) -> Result<(), StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(())
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    /// Records what it was asked to save, after being released.
    struct GatedSink {
        entered: Notify,
        release: Notify,
        seen: Mutex<Vec<WizardSnapshot>>,
    }

    #[async_trait]
    impl DraftSink for GatedSink {
        async fn save(&self, snapshot: &WizardSnapshot) -> Result<(), StoreError> {
            self.entered.notify_one();
            self.release.notified().await;
            self.seen.lock().unwrap().push(snapshot.clone());
            Ok(())
        }

        fn describe(&self) -> String {
            "gated".to_string()
        }
    }

    struct BrokenSink;

    #[async_trait]
    impl DraftSink for BrokenSink {
        async fn save(&self, _snapshot: &WizardSnapshot) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    fn named(first: &str) -> SectionValue {
        SectionValue::PersonalDetails(PersonalDetails {
            first_name: first.to_string(),
            ..Default::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_during_inflight_save_coalesce() {
        let state = Arc::new(Mutex::new(WizardState::default()));
        let sink = Arc::new(SlowSink {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(12),
        });
        let saver = Arc::new(Autosaver::new(state, sink.clone()));
        let task = saver.spawn(Duration::from_secs(5));

        // Ticks at 5s (starts the save) and 10s (in flight, dropped).
        tokio::time::sleep(Duration::from_secs(14)).await;
        assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
        assert!(saver.coalesced_count() >= 1);
        task.abort();
    }

    #[tokio::test]
    async fn test_save_sends_snapshot_not_live_state() {
        let state = Arc::new(Mutex::new(WizardState::default()));
        state.lock().unwrap().update_section(named("Ada"));
        let sink = Arc::new(GatedSink {
            entered: Notify::new(),
            release: Notify::new(),
            seen: Mutex::new(Vec::new()),
        });
        let saver = Arc::new(Autosaver::new(state.clone(), sink.clone()));

        let running = {
            let saver = Arc::clone(&saver);
            tokio::spawn(async move { saver.save_now().await })
        };
        sink.entered.notified().await;

        // Typing continues while the save is in flight.
        state.lock().unwrap().update_section(named("Grace"));
        assert_eq!(saver.save_now().await, SaveOutcome::Coalesced);

        sink.release.notify_one();
        assert_eq!(running.await.unwrap(), SaveOutcome::Saved { revision: 1 });
        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].document.personal_details.first_name, "Ada");
    }

    #[tokio::test]
    async fn test_failed_save_is_recorded_and_state_untouched() {
        let state = Arc::new(Mutex::new(WizardState::default()));
        state.lock().unwrap().update_section(named("Ada"));
        let before = state.lock().unwrap().clone();

        let saver = Autosaver::new(state.clone(), Arc::new(BrokenSink));
        match saver.save_now().await {
            SaveOutcome::Failed { message } => assert!(message.contains("disk full")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(*state.lock().unwrap(), before);
        assert!(saver.status().last_error.is_some());

        // The flag is released after a failure; the next save runs.
        assert!(matches!(saver.save_now().await, SaveOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_remote_sink_writes_record_and_repeats_are_noops() {
        let store: Arc<dyn ResumeStore> = Arc::new(MemoryResumeStore::new());
        let user = Uuid::new_v4();
        let record = store.create(user, NewResume::default()).await.unwrap();

        let state = Arc::new(Mutex::new(WizardState::default()));
        state.lock().unwrap().update_section(named("Ada"));
        let sink = Arc::new(RemoteSink::new(store.clone(), record.id, user));
        let saver = Autosaver::new(state, sink);

        assert_eq!(saver.save_now().await, SaveOutcome::Saved { revision: 1 });
        let first = store.get(record.id, user).await.unwrap().unwrap();
        assert_eq!(first.data.personal_details.first_name, "Ada");

        saver.save_now().await;
        let second = store.get(record.id, user).await.unwrap().unwrap();
        assert_eq!(second.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_local_sink_skips_unchanged_revision() {
        let dir = tempfile::tempdir().unwrap();
        let drafts = LocalDraftStore::new(dir.path());
        let sink = LocalSink::new(drafts.clone());
        let mut state = WizardState::default();

        sink.save(&state.snapshot()).await.unwrap();
        let first = std::fs::read(drafts.path()).unwrap();
        sink.save(&state.snapshot()).await.unwrap();
        assert_eq!(std::fs::read(drafts.path()).unwrap(), first);

        // Nothing is rewritten for the same revision and step, even if the file went away.
        drafts.clear().await.unwrap();
        sink.save(&state.snapshot()).await.unwrap();
        assert!(drafts.load().await.unwrap().is_none());

        state.go_to_step(3);
        sink.save(&state.snapshot()).await.unwrap();
        assert_eq!(drafts.load().await.unwrap().unwrap().step, 3);
    }

    #[tokio::test]
    async fn test_remote_sink_reports_missing_record() {
        let store: Arc<dyn ResumeStore> = Arc::new(MemoryResumeStore::new());
        let sink = RemoteSink::new(store, Uuid::new_v4(), Uuid::new_v4());
        let err = sink.save(&WizardState::default().snapshot()).await.unwrap_err();
        assert!(matches!(err, StoreError::Gone(_)));
    }
}
