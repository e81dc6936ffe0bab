use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::document::model::ResumeDocument;
use crate::document::normalize::parse_stored_document;
use crate::render::templates::TemplateId;

/// A row of the `resumes` table, as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub template: String,
    pub data: Value,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored résumé with its document in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub template_id: TemplateId,
    pub data: ResumeDocument,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ResumeRow> for ResumeRecord {
    type Error = serde_json::Error;

    /// Rows written by older clients carry legacy field names; they are
    /// normalised here, on the way out of the database.
    fn try_from(row: ResumeRow) -> Result<Self, Self::Error> {
        Ok(ResumeRecord {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            template_id: TemplateId::parse_or_default(&row.template),
            data: parse_stored_document(row.data, row.id)?,
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewResume {
    pub title: String,
    pub template_id: TemplateId,
    pub data: ResumeDocument,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ResumePatch {
    pub title: Option<String>,
    pub template_id: Option<TemplateId>,
    pub data: Option<ResumeDocument>,
    pub is_public: Option<bool>,
}

impl ResumePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.template_id.is_none()
            && self.data.is_none()
            && self.is_public.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_with_legacy_data_converts() {
        let row = ResumeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "My Resume".to_string(),
            template: "retro".to_string(),
            data: json!({
                "personalDetails": {"firstName": "Ada"},
                "education": [{"id": "1", "collegeName": "State University", "degreeName": "B.S."}]
            }),
            is_public: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let record = ResumeRecord::try_from(row).unwrap();
        assert_eq!(record.template_id, TemplateId::Modern);
        assert_eq!(record.data.personal_details.first_name, "Ada");
        assert_eq!(record.data.education[0].institution, "State University");
    }

    #[test]
    fn test_legacy_items_without_ids_read_back_identically() {
        let row = ResumeRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Old".to_string(),
            template: "modern".to_string(),
            data: json!({"education": [{"collegeName": "MIT"}], "hobbies": ["Chess"]}),
            is_public: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let first = ResumeRecord::try_from(row.clone()).unwrap();
        let second = ResumeRecord::try_from(row).unwrap();
        assert_eq!(first.data.education[0].id, second.data.education[0].id);
    }
}
