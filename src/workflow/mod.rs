//! Guided workflows
//!
//! Step definitions, navigation, and the session that ties a wizard's
//! draft, checklist, media and submission together.

pub mod context;
pub mod navigator;
pub mod presets;
pub mod session;
pub mod step;

pub use context::SessionContext;
pub use navigator::{Advance, NavigationError, StepNavigator};
pub use presets::WorkflowKind;
pub use session::{SessionServices, StepOutcome, WorkflowPhase, WorkflowSession};
pub use step::{
    FieldError, Guard, GuardContext, Step, StepGuard, StepKind, ValidationError, ValidationReport,
};
