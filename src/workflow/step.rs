//! Step definitions and guards
//!
//! Steps are immutable configuration. A guard decides whether the user may
//! move forward from a step, and explains why not when they may not.

use crate::checklist::Checklist;
use crate::draft::{Draft, PostingKind};
use crate::media::MediaSource;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// What a step shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Form,
    Capture,
    Checklist,
    Review,
}

/// Field-level validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of evaluating a guard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// A guard refused the transition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Step '{step}' is incomplete: {report}")]
pub struct ValidationError {
    pub step: String,
    pub report: ValidationReport,
}

/// What a guard can see
pub struct GuardContext<'a> {
    pub draft: &'a Draft,
    pub checklist: &'a Checklist,
    pub media: Option<&'a dyn MediaSource>,
}

/// Application-defined guard
pub trait StepGuard: Send + Sync {
    fn check(&self, ctx: &GuardContext<'_>) -> ValidationReport;
}

/// Declarative transition guard
#[derive(Clone)]
pub enum Guard {
    /// Dotted draft paths that must hold a non-blank value
    RequiredFields(Vec<String>),
    /// Every required checklist item is ticked
    ChecklistSatisfied,
    /// The active media source has an accepted clip
    MediaAccepted,
    /// The user picked job or internship
    PostingKindChosen,
    /// Branch on the stored posting kind
    ByPostingKind {
        job: Box<Guard>,
        internship: Box<Guard>,
    },
    /// Every inner guard must pass; all failures are reported
    All(Vec<Guard>),
    Custom(Arc<dyn StepGuard>),
}

impl Guard {
    pub fn required<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Guard::RequiredFields(fields.into_iter().map(Into::into).collect())
    }

    pub fn evaluate(&self, ctx: &GuardContext<'_>) -> ValidationReport {
        let mut report = ValidationReport::default();
        match self {
            Guard::RequiredFields(fields) => {
                for field in fields {
                    if !has_value(ctx.draft, field) {
                        report.push(field.as_str(), "This field is required");
                    }
                }
            }
            Guard::ChecklistSatisfied => {
                for item in ctx.checklist.missing_required() {
                    report.push(format!("checklist.{item}"), "Please confirm this item");
                }
            }
            Guard::MediaAccepted => {
                if ctx.media.and_then(|m| m.accepted_clip()).is_none() {
                    report.push("media", "Record or upload a video first");
                }
            }
            Guard::PostingKindChosen => {
                if ctx.draft.posting_kind().is_none() {
                    report.push(PostingKind::DRAFT_PATH, "Choose job or internship");
                }
            }
            Guard::ByPostingKind { job, internship } => match ctx.draft.posting_kind() {
                Some(PostingKind::Job) => report.extend(job.evaluate(ctx)),
                Some(PostingKind::Internship) => report.extend(internship.evaluate(ctx)),
                None => report.push(PostingKind::DRAFT_PATH, "Choose job or internship"),
            },
            Guard::All(guards) => {
                for guard in guards {
                    report.extend(guard.evaluate(ctx));
                }
            }
            Guard::Custom(guard) => report.extend(guard.check(ctx)),
        }
        report
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::RequiredFields(fields) => f.debug_tuple("RequiredFields").field(fields).finish(),
            Guard::ChecklistSatisfied => f.write_str("ChecklistSatisfied"),
            Guard::MediaAccepted => f.write_str("MediaAccepted"),
            Guard::PostingKindChosen => f.write_str("PostingKindChosen"),
            Guard::ByPostingKind { job, internship } => f
                .debug_struct("ByPostingKind")
                .field("job", job)
                .field("internship", internship)
                .finish(),
            Guard::All(guards) => f.debug_tuple("All").field(guards).finish(),
            Guard::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn has_value(draft: &Draft, path: &str) -> bool {
    use serde_json::Value;
    match draft.get_path(path) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// One screen of a wizard
#[derive(Debug, Clone)]
pub struct Step {
    pub id: String,
    pub title: String,
    pub kind: StepKind,
    pub guard: Option<Guard>,
}

impl Step {
    pub fn new(id: &str, title: &str, kind: StepKind) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            kind,
            guard: None,
        }
    }

    pub fn guarded(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Evaluate this step's guard; steps without one always pass
    pub fn check(&self, ctx: &GuardContext<'_>) -> Result<(), ValidationError> {
        let Some(guard) = &self.guard else {
            return Ok(());
        };
        let report = guard.evaluate(ctx);
        if report.is_ok() {
            Ok(())
        } else {
            Err(ValidationError {
                step: self.id.clone(),
                report,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(value: serde_json::Value) -> Draft {
        Draft::from_value(value).unwrap()
    }

    #[test]
    fn test_required_fields_reports_each_missing() {
        let draft = draft(json!({ "personal": { "firstName": "Sam", "lastName": " " } }));
        let checklist = Checklist::new();
        let ctx = GuardContext { draft: &draft, checklist: &checklist, media: None };

        let report = Guard::required(["personal.firstName", "personal.lastName", "personal.email"])
            .evaluate(&ctx);
        assert_eq!(report.fields(), vec!["personal.lastName", "personal.email"]);
    }

    #[test]
    fn test_media_guard_without_source() {
        let draft = Draft::new();
        let checklist = Checklist::new();
        let ctx = GuardContext { draft: &draft, checklist: &checklist, media: None };
        let report = Guard::MediaAccepted.evaluate(&ctx);
        assert_eq!(report.fields(), vec!["media"]);
    }

    #[test]
    fn test_branch_on_posting_kind() {
        let guard = Guard::ByPostingKind {
            job: Box::new(Guard::required(["posting.salary"])),
            internship: Box::new(Guard::required(["posting.durationWeeks"])),
        };
        let checklist = Checklist::new();

        let internship = draft(json!({ "posting": { "kind": "internship", "durationWeeks": 12 } }));
        let ctx = GuardContext { draft: &internship, checklist: &checklist, media: None };
        assert!(guard.evaluate(&ctx).is_ok());

        // A job titled like an internship is still a job
        let job = draft(json!({ "posting": { "kind": "job", "title": "Intern Program Manager" } }));
        let ctx = GuardContext { draft: &job, checklist: &checklist, media: None };
        assert_eq!(guard.evaluate(&ctx).fields(), vec!["posting.salary"]);
    }

    #[test]
    fn test_all_collects_every_failure() {
        let draft = Draft::new();
        let checklist = Checklist::new().required("terms", "I accept");
        let ctx = GuardContext { draft: &draft, checklist: &checklist, media: None };
        let report = Guard::All(vec![Guard::ChecklistSatisfied, Guard::PostingKindChosen]).evaluate(&ctx);
        assert_eq!(report.fields(), vec!["checklist.terms", "posting.kind"]);
    }

    #[test]
    fn test_custom_guard() {
        struct EmailLooksValid;
        impl StepGuard for EmailLooksValid {
            fn check(&self, ctx: &GuardContext<'_>) -> ValidationReport {
                let mut report = ValidationReport::default();
                if !ctx.draft.str_at("email").is_some_and(|e| e.contains('@')) {
                    report.push("email", "Enter a valid email address");
                }
                report
            }
        }

        let step = Step::new("contact", "Contact", StepKind::Form)
            .guarded(Guard::Custom(Arc::new(EmailLooksValid)));
        let checklist = Checklist::new();
        let bad = draft(json!({ "email": "nope" }));
        let err = step
            .check(&GuardContext { draft: &bad, checklist: &checklist, media: None })
            .unwrap_err();
        assert_eq!(err.step, "contact");
        assert_eq!(err.report.fields(), vec!["email"]);
    }
}
