//! Export pipeline: preview tree in, paginated PDF bytes out.
//!
//! Steps, in order:
//! 1. locate the preview root and reject a missing or near-empty preview
//! 2. pin layout-affecting styles (`StyleGuard`)
//! 3. lay the subtree out into one continuous column
//! 4. scale to the printable width and paginate onto A4
//! 5. restore styles (guard drop, on every path)
//! 6. name the file

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::export::filename::resolve_filename;
use crate::export::layout::{FlowLayout, LayoutEngine, LayoutError};
use crate::export::paginate::{paginate, PageGeometry, DEFAULT_MARGIN_MM};
use crate::export::pdf::write_pdf;
use crate::export::style_guard::StyleGuard;
use crate::render::tree::{RenderTree, PREVIEW_ROOT_ID};

/// Previews with less visible text than this are treated as empty.
pub const MIN_PREVIEW_TEXT_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Resume preview element not found. Please make sure the preview is visible.")]
    PreviewNotFound,

    #[error("Resume appears to be empty. Please fill in your information first.")]
    EmptyPreview { chars: usize },

    #[error("Failed to generate PDF. Please try again.")]
    Generation(#[from] LayoutError),
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub margin_mm: f32,
    /// Requested download name; sanitised, `.pdf` enforced.
    pub filename: Option<String>,
    /// Instant used for the default file name.
    pub timestamp: DateTime<Utc>,
}

impl ExportOptions {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            margin_mm: DEFAULT_MARGIN_MM,
            filename: None,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PdfExport {
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Height of the drawn content in the scaled column, before pagination.
    pub content_height_mm: f32,
}

/// Exports with the default flow layout engine.
pub fn export_to_pdf(tree: &mut RenderTree, options: &ExportOptions) -> Result<PdfExport, ExportError> {
    export_with_engine(tree, options, &FlowLayout)
}

pub fn export_with_engine(
    tree: &mut RenderTree,
    options: &ExportOptions,
    engine: &dyn LayoutEngine,
) -> Result<PdfExport, ExportError> {
    let root = tree
        .find_by_id_mut(PREVIEW_ROOT_ID)
        .ok_or(ExportError::PreviewNotFound)?;

    let chars = root.text_content().trim().chars().count();
    if chars < MIN_PREVIEW_TEXT_CHARS {
        return Err(ExportError::EmptyPreview { chars });
    }

    let geometry = PageGeometry::a4(options.margin_mm)?;

    let guard = StyleGuard::normalize(root);
    let layout = engine.layout(guard.node())?;
    drop(guard);

    let scale = geometry.printable_width_mm() / layout.width_mm;
    let scaled = layout.scaled(scale);
    let pages = paginate(&scaled, &geometry);
    debug!(
        fragments = scaled.fragments.len(),
        content_height_mm = scaled.drawn_height_mm(),
        "Layout complete"
    );

    let bytes = write_pdf(&pages, &geometry);
    let filename = resolve_filename(options.filename.as_deref(), options.timestamp);
    info!(
        pages = pages.len(),
        bytes = bytes.len(),
        filename = %filename,
        "PDF export complete"
    );

    Ok(PdfExport {
        filename,
        bytes,
        page_count: pages.len(),
        content_height_mm: scaled.drawn_height_mm(),
    })
}
