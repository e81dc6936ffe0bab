use axum::Json;

use crate::render::templates::{list_templates, TemplateInfo};

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateInfo>> {
    Json(list_templates())
}
