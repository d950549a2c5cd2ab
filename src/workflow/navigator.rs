//! Step navigation
//!
//! Ordered steps, guarded forward moves, free backward moves, and sidebar
//! jumps to any step already reached. Jumps skip the destination's guard.

use super::step::{GuardContext, Step, StepKind, ValidationError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Step '{step}' has not been reached yet")]
    NotYetReached { step: String },

    #[error("A workflow needs at least one step")]
    NoSteps,

    #[error("Duplicate step id: {0}")]
    DuplicateStep(String),
}

/// Result of a successful forward move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved from one index to the next
    Moved { from: usize, to: usize },
    /// The last step's guard passed; the caller submits
    Terminal,
}

/// Tracks the current step and how far the user has got
#[derive(Debug, Clone)]
pub struct StepNavigator {
    steps: Vec<Step>,
    current: usize,
    highest_reached: usize,
}

impl StepNavigator {
    pub fn new(steps: Vec<Step>) -> Result<Self, NavigationError> {
        if steps.is_empty() {
            return Err(NavigationError::NoSteps);
        }
        for (i, step) in steps.iter().enumerate() {
            if steps[..i].iter().any(|s| s.id == step.id) {
                return Err(NavigationError::DuplicateStep(step.id.clone()));
            }
        }
        Ok(Self {
            steps,
            current: 0,
            highest_reached: 0,
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn current(&self) -> &Step {
        &self.steps[self.current]
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn highest_reached(&self) -> usize {
        self.highest_reached
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    pub fn kind_at(&self, index: usize) -> Option<StepKind> {
        self.steps.get(index).map(|s| s.kind)
    }

    /// Check the current step's guard and move forward if it passes
    pub fn advance(&mut self, ctx: &GuardContext<'_>) -> Result<Advance, NavigationError> {
        let step = self.current();
        if let Err(e) = step.check(ctx) {
            tracing::warn!("Refused to leave step '{}': {}", step.id, e.report);
            return Err(e.into());
        }

        if self.is_last() {
            return Ok(Advance::Terminal);
        }

        let from = self.current;
        self.current += 1;
        self.highest_reached = self.highest_reached.max(self.current);
        tracing::info!("Advanced to step '{}'", self.current().id);
        Ok(Advance::Moved {
            from,
            to: self.current,
        })
    }

    /// Move one step back without checking anything. Returns false on the first step.
    pub fn back(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        tracing::info!("Went back to step '{}'", self.current().id);
        true
    }

    /// Jump to a step already reached, without evaluating any guard
    pub fn jump_to(&mut self, step_id: &str) -> Result<usize, NavigationError> {
        let index = self
            .steps
            .iter()
            .position(|s| s.id == step_id)
            .ok_or_else(|| NavigationError::UnknownStep(step_id.to_string()))?;
        if index > self.highest_reached {
            return Err(NavigationError::NotYetReached {
                step: step_id.to_string(),
            });
        }
        self.current = index;
        tracing::info!("Jumped to step '{}'", step_id);
        Ok(index)
    }
}
