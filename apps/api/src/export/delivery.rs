use axum::{
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::info;

use crate::document::model::ResumeDocument;
use crate::errors::AppError;
use crate::export::pipeline::{export_to_pdf, ExportOptions, PdfExport};
use crate::render::templates::{render_document, TemplateId};

/// Renders `document` with `template` and exports it off the async executor.
///
/// The blocking task owns its copy of the document and of the tree, so a
/// client that disconnects mid-export only drops a result nobody shares.
pub async fn export_document(
    document: ResumeDocument,
    template: TemplateId,
    margin_mm: f32,
    filename: Option<String>,
) -> Result<PdfExport, AppError> {
    let options = ExportOptions {
        margin_mm,
        filename,
        ..ExportOptions::at(Utc::now())
    };

    let export = tokio::task::spawn_blocking(move || {
        let mut tree = render_document(&document, template);
        export_to_pdf(&mut tree, &options)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF export: {e}")))??;

    info!(
        template = %template,
        pages = export.page_count,
        filename = %export.filename,
        "Resume exported"
    );
    Ok(export)
}

/// `200 application/pdf` with a download disposition.
pub fn pdf_attachment(export: PdfExport) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
            (
                HeaderName::from_static("x-page-count"),
                export.page_count.to_string(),
            ),
        ],
        export.bytes,
    )
        .into_response()
}
