pub mod health;
pub mod resumes;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::render::handlers::handle_list_templates;
use crate::state::AppState;
use crate::wizard::handlers as wizard;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/templates", get(handle_list_templates))
        // Stored résumés
        .route(
            "/api/v1/resumes",
            post(resumes::handle_create_resume).get(resumes::handle_list_resumes),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/preview",
            get(resumes::handle_preview_resume),
        )
        .route(
            "/api/v1/resumes/:id/export",
            get(resumes::handle_export_resume),
        )
        // Wizard sessions
        .route("/api/v1/wizard", post(wizard::handle_start_session))
        .route(
            "/api/v1/wizard/:sid",
            get(wizard::handle_get_session).delete(wizard::handle_close_session),
        )
        .route(
            "/api/v1/wizard/:sid/sections/:section",
            put(wizard::handle_update_section),
        )
        .route("/api/v1/wizard/:sid/next", post(wizard::handle_next))
        .route("/api/v1/wizard/:sid/previous", post(wizard::handle_previous))
        .route("/api/v1/wizard/:sid/step/:n", post(wizard::handle_go_to_step))
        .route("/api/v1/wizard/:sid/template", put(wizard::handle_select_template))
        .route("/api/v1/wizard/:sid/save", post(wizard::handle_save))
        .route("/api/v1/wizard/:sid/reset", post(wizard::handle_reset))
        .route("/api/v1/wizard/:sid/preview", get(wizard::handle_preview))
        .route("/api/v1/wizard/:sid/export", post(wizard::handle_export))
        .with_state(state)
}
