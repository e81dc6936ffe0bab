// PDF export: normalise the preview, lay it out, paginate onto A4, write PDF.
// Layout is CPU-bound and must run inside tokio::task::spawn_blocking.

pub mod delivery;
pub mod filename;
pub mod font_metrics;
pub mod layout;
pub mod paginate;
pub mod pdf;
pub mod pipeline;
pub mod style_guard;

pub use delivery::{export_document, pdf_attachment};
pub use pipeline::{export_to_pdf, ExportError, ExportOptions, PdfExport};
