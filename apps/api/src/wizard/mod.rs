// Wizard: step-sequenced editing of one résumé document.
// State mutations are synchronous and never do I/O; saving happens in the
// per-session autosave task or on explicit request.

pub mod autosave;
pub mod handlers;
pub mod session;
pub mod state;
pub mod steps;

pub use session::{SessionRegistry, WizardSession};
pub use state::WizardState;
pub use steps::{FlowKind, Step, WizardFlow};
