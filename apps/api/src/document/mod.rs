// Résumé data model: canonical schema, item ids, legacy-shape migration and
// form-level validation rules.

pub mod ids;
pub mod model;
pub mod normalize;
pub mod validation;

pub use ids::{ensure_unique_ids, ItemId};
pub use model::{ResumeDocument, Section, SectionValue};
pub use normalize::{parse_document, parse_section};
pub use validation::{validate_section, validate_structure, FieldError};
