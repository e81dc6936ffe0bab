use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::document::model::{ResumeDocument, Section, UnknownSection};
use crate::document::normalize::parse_section;
use crate::errors::AppError;
use crate::export::{export_document, pdf_attachment};
use crate::render::html::to_html_page;
use crate::render::templates::{render_document, TemplateId};
use crate::state::AppState;
use crate::wizard::autosave::{DraftSink, LocalSink, RemoteSink, SaveOutcome, SaveStatus};
use crate::wizard::session::WizardSession;
use crate::wizard::state::WizardState;
use crate::wizard::steps::{FlowKind, Step, WizardFlow};

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub user_id: Option<Uuid>,
    /// Stored record to edit. Without one the session works on the local draft.
    pub resume_id: Option<Uuid>,
    #[serde(default)]
    pub flow: FlowKind,
}

#[derive(Debug, Serialize)]
pub struct StepView {
    pub number: usize,
    pub step: Step,
    pub title: &'static str,
    pub section: Section,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub flow: FlowKind,
    pub current_step: usize,
    pub total_steps: usize,
    pub step: StepView,
    pub selected_template: TemplateId,
    pub revision: u64,
    pub document: ResumeDocument,
    pub save_status: SaveStatus,
}

fn view(session: &WizardSession) -> SessionView {
    let save_status = session.save_status();
    session.with_state(|s| {
        let step = s.current();
        SessionView {
            session_id: session.id,
            resume_id: session.resume_id,
            flow: s.flow().kind(),
            current_step: s.current_step(),
            total_steps: s.flow().len(),
            step: StepView {
                number: s.current_step(),
                step,
                title: step.title(),
                section: step.section(),
            },
            selected_template: s.selected_template(),
            revision: s.revision(),
            document: s.document().clone(),
            save_status,
        }
    })
}

async fn session(state: &AppState, id: Uuid) -> Result<Arc<WizardSession>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Wizard session {id} not found")))
}

/// POST /api/v1/wizard
pub async fn handle_start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let mut wizard = WizardState::new(WizardFlow::for_kind(req.flow));

    let sink: Arc<dyn DraftSink> = match req.resume_id {
        Some(resume_id) => {
            let user_id = req.user_id.ok_or_else(|| {
                AppError::Validation("user_id is required to edit a stored resume".to_string())
            })?;
            let record = state
                .store
                .get(resume_id, user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
            wizard.load(record.data, record.template_id, 1);
            Arc::new(RemoteSink::new(state.store.clone(), resume_id, user_id))
        }
        None => {
            if let Some(draft) = state.drafts.load().await? {
                wizard.load(draft.data, draft.template_id, draft.step);
            }
            Arc::new(LocalSink::new(state.drafts.clone()))
        }
    };

    let session = state
        .sessions
        .insert(WizardSession::new(req.user_id, req.resume_id, wizard, sink))
        .await;
    session.start_autosave(Duration::from_secs(state.config.autosave_interval_secs));
    info!(
        session_id = %session.id,
        resume_id = ?req.resume_id,
        flow = ?req.flow,
        "Wizard session started"
    );

    Ok((StatusCode::CREATED, Json(view(&session))))
}

/// GET /api/v1/wizard/:sid
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = session(&state, sid).await?;
    Ok(Json(view(&session)))
}

/// DELETE /api/v1/wizard/:sid
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SaveOutcome>, AppError> {
    let session = state
        .sessions
        .remove(sid)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Wizard session {sid} not found")))?;
    Ok(Json(session.close().await))
}

/// PUT /api/v1/wizard/:sid/sections/:section
pub async fn handle_update_section(
    State(state): State<AppState>,
    Path((sid, section)): Path<(Uuid, String)>,
    Json(raw): Json<Value>,
) -> Result<Json<SessionView>, AppError> {
    let section: Section = section
        .parse()
        .map_err(|e: UnknownSection| AppError::Validation(e.to_string()))?;
    let value = parse_section(section, raw)
        .map_err(|e| AppError::Validation(format!("Invalid {section} data: {e}")))?;

    let session = session(&state, sid).await?;
    session
        .with_state(|s| s.try_update_section(value))
        .map_err(AppError::InvalidDocument)?;
    Ok(Json(view(&session)))
}

/// POST /api/v1/wizard/:sid/next
pub async fn handle_next(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = session(&state, sid).await?;
    session
        .with_state(|s| s.next())
        .map_err(AppError::StepValidation)?;
    Ok(Json(view(&session)))
}

/// POST /api/v1/wizard/:sid/previous
pub async fn handle_previous(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = session(&state, sid).await?;
    session.with_state(|s| s.previous());
    Ok(Json(view(&session)))
}

/// POST /api/v1/wizard/:sid/step/:n
pub async fn handle_go_to_step(
    State(state): State<AppState>,
    Path((sid, n)): Path<(Uuid, usize)>,
) -> Result<Json<SessionView>, AppError> {
    let session = session(&state, sid).await?;
    session.with_state(|s| s.go_to_step(n));
    Ok(Json(view(&session)))
}

#[derive(Debug, Deserialize)]
pub struct SelectTemplateRequest {
    pub template_id: TemplateId,
}

/// PUT /api/v1/wizard/:sid/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    Json(req): Json<SelectTemplateRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = session(&state, sid).await?;
    session.with_state(|s| s.select_template(req.template_id));
    Ok(Json(view(&session)))
}

/// POST /api/v1/wizard/:sid/save
pub async fn handle_save(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SaveOutcome>, AppError> {
    let session = session(&state, sid).await?;
    match session.save().await {
        SaveOutcome::Failed { message } => Err(AppError::SaveFailed(message)),
        outcome => Ok(Json(outcome)),
    }
}

/// POST /api/v1/wizard/:sid/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = session(&state, sid).await?;
    session.with_state(|s| s.reset());
    if session.resume_id.is_none() {
        state.drafts.clear().await?;
    }
    Ok(Json(view(&session)))
}

/// GET /api/v1/wizard/:sid/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let session = session(&state, sid).await?;
    let (document, template) =
        session.with_state(|s| (s.document().clone(), s.selected_template()));
    let tree = render_document(&document, template);
    let title = document
        .personal_details
        .full_name()
        .unwrap_or_else(|| "Resume".to_string());
    Ok(Html(to_html_page(&tree, &title)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    pub filename: Option<String>,
}

/// POST /api/v1/wizard/:sid/export
pub async fn handle_export(
    State(state): State<AppState>,
    Path(sid): Path<Uuid>,
    body: Option<Json<ExportRequest>>,
) -> Result<Response, AppError> {
    let session = session(&state, sid).await?;
    let (document, template) =
        session.with_state(|s| (s.document().clone(), s.selected_template()));
    let filename = body.and_then(|Json(req)| req.filename);
    let export =
        export_document(document, template, state.config.export_margin_mm, filename).await?;
    Ok(pdf_attachment(export))
}
