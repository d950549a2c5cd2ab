//! Capture Wizard - guided multi-step workflows with video capture.
//!
//! This is the library crate behind the job-posting, study-abroad and
//! video-profile wizards. It provides step navigation, draft persistence,
//! camera recording and playback, and submission to the backend.

pub mod capture;
pub mod checklist;
pub mod config;
pub mod draft;
pub mod media;
pub mod playback;
pub mod recorder;
pub mod submission;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use config::WorkflowConfig;
pub use utils::error::{ErrorResponse, WorkflowError, WorkflowResult};
pub use workflow::{SessionContext, SessionServices, WorkflowKind, WorkflowSession};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging
///
/// Honors `RUST_LOG`, defaulting to debug output for this crate. Calling it
/// again after a subscriber is installed does nothing.
pub fn init_tracing() {
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "capture_wizard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if installed.is_ok() {
        tracing::info!("Capture Wizard v{}", env!("CARGO_PKG_VERSION"));
    }
}
