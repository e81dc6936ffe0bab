use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::document::model::ResumeDocument;
use crate::document::normalize::parse_document;
use crate::document::validation::validate_structure;
use crate::errors::AppError;
use crate::export::{export_document, pdf_attachment};
use crate::models::resume::{NewResume, ResumePatch, ResumeRecord};
use crate::models::user::UserIdQuery;
use crate::render::html::to_html_page;
use crate::render::templates::{render_document, TemplateId};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "templateId")]
    pub template_id: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    #[serde(alias = "templateId")]
    pub template_id: Option<String>,
    pub data: Option<Value>,
    #[serde(alias = "isPublic")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub user_id: Uuid,
    /// Overrides the stored template for this render only.
    pub template: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub user_id: Uuid,
    pub template: Option<String>,
    pub filename: Option<String>,
}

/// Normalises an incoming document and checks its structure.
fn accept_document(raw: Value) -> Result<ResumeDocument, AppError> {
    let document = parse_document(raw)
        .map_err(|e| AppError::Validation(format!("Invalid resume data: {e}")))?;
    validate_structure(&document).map_err(AppError::InvalidDocument)?;
    Ok(document)
}

fn parse_template(raw: &str) -> Result<TemplateId, AppError> {
    raw.parse::<TemplateId>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

async fn owned_record(state: &AppState, id: Uuid, user_id: Uuid) -> Result<ResumeRecord, AppError> {
    state
        .store
        .get(id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    let new = NewResume {
        title: req
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "Untitled Resume".to_string()),
        template_id: req
            .template_id
            .as_deref()
            .map(parse_template)
            .transpose()?
            .unwrap_or_default(),
        data: req.data.map(accept_document).transpose()?.unwrap_or_default(),
    };
    let record = state.store.create(params.user_id, new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeRecord>>, AppError> {
    Ok(Json(state.store.list(params.user_id).await?))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeRecord>, AppError> {
    Ok(Json(owned_record(&state, id, params.user_id).await?))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
    Json(req): Json<UpdateResumeRequest>,
) -> Result<Json<ResumeRecord>, AppError> {
    let patch = ResumePatch {
        title: req.title,
        template_id: req.template_id.as_deref().map(parse_template).transpose()?,
        data: req.data.map(accept_document).transpose()?,
        is_public: req.is_public,
    };
    if patch.is_empty() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    let record = state
        .store
        .update(id, params.user_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(record))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    if state.store.delete(id, params.user_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Resume {id} not found")))
    }
}

/// GET /api/v1/resumes/:id/preview
pub async fn handle_preview_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PreviewQuery>,
) -> Result<Html<String>, AppError> {
    let record = owned_record(&state, id, params.user_id).await?;
    let template = match params.template.as_deref() {
        Some(raw) => parse_template(raw)?,
        None => record.template_id,
    };
    let tree = render_document(&record.data, template);
    Ok(Html(to_html_page(&tree, &record.title)))
}

/// GET /api/v1/resumes/:id/export
pub async fn handle_export_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let record = owned_record(&state, id, params.user_id).await?;
    let template = match params.template.as_deref() {
        Some(raw) => parse_template(raw)?,
        None => record.template_id,
    };
    let export = export_document(
        record.data,
        template,
        state.config.export_margin_mm,
        params.filename,
    )
    .await?;
    Ok(pdf_attachment(export))
}
