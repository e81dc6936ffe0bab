// Template rendering: document in, layout-ready render tree out.
// Rendering is pure; no clock, no I/O, no document mutation.

pub mod handlers;
pub mod html;
pub mod sample;
pub mod templates;
pub mod tree;

pub use templates::{render_document, template_for, TemplateId};
pub use tree::{RenderTree, PREVIEW_ROOT_ID};
