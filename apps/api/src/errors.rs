use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::document::validation::FieldError;
use crate::export::ExportError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The wizard refused to leave a step whose required fields are missing.
    #[error("Step has invalid fields")]
    StepValidation(Vec<FieldError>),

    /// A submitted document failed structural checks (ids, sizes).
    #[error("Document is malformed")]
    InvalidDocument(Vec<FieldError>),

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut fields: Option<Vec<FieldError>> = None;
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::StepValidation(errors) => {
                fields = Some(errors);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "STEP_INCOMPLETE",
                    "Please fix the highlighted fields before continuing".to_string(),
                )
            }
            AppError::InvalidDocument(errors) => {
                fields = Some(errors);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "INVALID_DOCUMENT",
                    "The resume document is malformed".to_string(),
                )
            }
            AppError::SaveFailed(msg) => {
                tracing::warn!("Save failed: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SAVE_FAILED",
                    "Could not save your resume. Your changes are kept; please try again."
                        .to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Export(e) => {
                let status = match &e {
                    ExportError::PreviewNotFound | ExportError::EmptyPreview { .. } => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    ExportError::Generation(cause) => {
                        tracing::error!("PDF generation failed: {cause}");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, "EXPORT_FAILED", e.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(fields) = fields {
            error["fields"] = json!(fields);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body(err: AppError) -> (StatusCode, Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_step_validation_lists_fields() {
        let (status, json) = body(AppError::StepValidation(vec![FieldError {
            field: "personal_details.first_name".to_string(),
            message: "First name is required".to_string(),
        }]))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"]["code"], "STEP_INCOMPLETE");
        assert_eq!(json["error"]["fields"][0]["field"], "personal_details.first_name");
    }

    #[tokio::test]
    async fn test_export_errors_keep_user_message() {
        let (status, json) = body(AppError::Export(ExportError::PreviewNotFound)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"]["message"].as_str().unwrap().contains("not found"));
    }
}
