use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::resume::{NewResume, ResumePatch, ResumeRecord, ResumeRow};
use crate::store::{ResumeStore, StoreError};

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_record(row: ResumeRow) -> Result<ResumeRecord, StoreError> {
    Ok(ResumeRecord::try_from(row)?)
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn create(&self, user_id: Uuid, new: NewResume) -> Result<ResumeRecord, StoreError> {
        let data = serde_json::to_value(&new.data)?;
        let row: ResumeRow = sqlx::query_as(
            r#"
            INSERT INTO resumes (user_id, title, template, data)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&new.title)
        .bind(new.template_id.as_str())
        .bind(data)
        .fetch_one(&self.pool)
        .await?;
        debug!(resume_id = %row.id, %user_id, "Resume created");
        to_record(row)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<ResumeRecord>, StoreError> {
        let rows: Vec<ResumeRow> = sqlx::query_as(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC, created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(to_record).collect()
    }

    async fn get(&self, id: Uuid, user_id: Uuid) -> Result<Option<ResumeRecord>, StoreError> {
        let row: Option<ResumeRow> =
            sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(to_record).transpose()
    }

    async fn update(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: ResumePatch,
    ) -> Result<Option<ResumeRecord>, StoreError> {
        let data = patch.data.as_ref().map(serde_json::to_value).transpose()?;
        // Row comparison keeps updated_at still when the patch changes nothing,
        // so repeated autosaves of an unchanged draft are true no-ops.
        let row: Option<ResumeRow> = sqlx::query_as(
            r#"
            UPDATE resumes SET
                title      = COALESCE($3, title),
                template   = COALESCE($4, template),
                data       = COALESCE($5, data),
                is_public  = COALESCE($6, is_public),
                updated_at = CASE
                    WHEN (COALESCE($3, title), COALESCE($4, template), COALESCE($5, data), COALESCE($6, is_public))
                         IS DISTINCT FROM (title, template, data, is_public)
                    THEN NOW()
                    ELSE updated_at
                END
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(patch.title)
        .bind(patch.template_id.map(|t| t.as_str()))
        .bind(data)
        .bind(patch.is_public)
        .fetch_optional(&self.pool)
        .await?;
        row.map(to_record).transpose()
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
