use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::resume::{NewResume, ResumePatch, ResumeRecord};
use crate::store::{ResumeStore, StoreError};

/// Process-local store used when no database is configured, and in tests.
#[derive(Default)]
pub struct MemoryResumeStore {
    rows: RwLock<HashMap<Uuid, ResumeRecord>>,
}

impl MemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for MemoryResumeStore {
    async fn create(&self, user_id: Uuid, new: NewResume) -> Result<ResumeRecord, StoreError> {
        let now = Utc::now();
        let record = ResumeRecord {
            id: Uuid::new_v4(),
            user_id,
            title: new.title,
            template_id: new.template_id,
            data: new.data,
            is_public: false,
            created_at: now,
            updated_at: now,
        };
        self.rows.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<ResumeRecord>, StoreError> {
        let rows = self.rows.read().await;
        let mut owned: Vec<ResumeRecord> = rows
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(owned)
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<ResumeRecord>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|r| r.user_id == user_id).cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: ResumePatch,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        let mut rows = self.rows.write().await;
        let Some(record) = rows.get_mut(&id).filter(|r| r.user_id == user_id) else {
            return Ok(None);
        };

        let mut changed = false;
        if let Some(title) = patch.title {
            changed |= record.title != title;
            record.title = title;
        }
        if let Some(template_id) = patch.template_id {
            changed |= record.template_id != template_id;
            record.template_id = template_id;
        }
        if let Some(data) = patch.data {
            changed |= record.data != data;
            record.data = data;
        }
        if let Some(is_public) = patch.is_public {
            changed |= record.is_public != is_public;
            record.is_public = is_public;
        }
        if changed {
            record.updated_at = Utc::now();
        }
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get(&id) {
            Some(r) if r.user_id == user_id => {
                rows.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{PersonalDetails, ResumeDocument};
    use crate::render::templates::TemplateId;

    fn named(first: &str) -> ResumeDocument {
        ResumeDocument {
            personal_details: PersonalDetails {
                first_name: first.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_records_are_scoped_to_owner() {
        let store = MemoryResumeStore::new();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let record = store
            .create(owner, NewResume { title: "CV".to_string(), ..Default::default() })
            .await
            .unwrap();

        assert!(store.get(record.id, owner).await.unwrap().is_some());
        assert!(store.get(record.id, stranger).await.unwrap().is_none());
        assert!(store.list(stranger).await.unwrap().is_empty());
        assert!(!store.delete(record.id, stranger).await.unwrap());
        assert!(store.delete(record.id, owner).await.unwrap());
        assert!(store.get(record.id, owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_identical_update_keeps_timestamp() {
        let store = MemoryResumeStore::new();
        let user = Uuid::new_v4();
        let record = store
            .create(user, NewResume { data: named("Ada"), ..Default::default() })
            .await
            .unwrap();

        let patch = ResumePatch {
            data: Some(named("Ada")),
            template_id: Some(TemplateId::Modern),
            ..Default::default()
        };
        let same = store.update(record.id, user, patch).await.unwrap().unwrap();
        assert_eq!(same.updated_at, record.updated_at);
        assert_eq!(same, record);

        let patch = ResumePatch {
            data: Some(named("Grace")),
            ..Default::default()
        };
        let changed = store.update(record.id, user, patch).await.unwrap().unwrap();
        assert_eq!(changed.data.personal_details.first_name, "Grace");
        assert!(changed.updated_at >= record.updated_at);
    }

    #[tokio::test]
    async fn test_update_of_missing_record_is_none() {
        let store = MemoryResumeStore::new();
        let out = store
            .update(Uuid::new_v4(), Uuid::new_v4(), ResumePatch::default())
            .await
            .unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = MemoryResumeStore::new();
        let user = Uuid::new_v4();
        let first = store.create(user, NewResume::default()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create(user, NewResume::default()).await.unwrap();

        let ids: Vec<Uuid> = store.list(user).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}
