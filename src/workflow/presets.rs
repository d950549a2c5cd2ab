//! Built-in wizards
//!
//! Step lists and checklists for the three guided workflows.

use super::step::{Guard, Step, StepKind};
use crate::checklist::Checklist;
use serde::{Deserialize, Serialize};

/// Which wizard a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
    JobPosting,
    StudyAbroad,
    VideoProfile,
}

impl WorkflowKind {
    /// Stable identifier, used in store keys and payloads
    pub fn slug(self) -> &'static str {
        match self {
            WorkflowKind::JobPosting => "job-posting",
            WorkflowKind::StudyAbroad => "study-abroad",
            WorkflowKind::VideoProfile => "video-profile",
        }
    }

    /// Whether submission needs an accepted clip
    pub fn requires_media(self) -> bool {
        matches!(self, WorkflowKind::VideoProfile)
    }

    pub fn checklist(self) -> Checklist {
        match self {
            WorkflowKind::VideoProfile => Checklist::video_profile(),
            WorkflowKind::JobPosting => Checklist::new()
                .required("accurate", "The posting describes the role accurately")
                .required("terms", "I accept the employer terms of service"),
            WorkflowKind::StudyAbroad => Checklist::new()
                .required("transcript", "I have an official transcript ready")
                .required("passport", "My passport is valid for the whole stay")
                .optional("languageTest", "I have a language test score"),
        }
    }

    pub fn steps(self) -> Vec<Step> {
        match self {
            WorkflowKind::VideoProfile => vec![
                Step::new("personal", "Personal details", StepKind::Form).guarded(Guard::required([
                    "personal.firstName",
                    "personal.lastName",
                    "personal.email",
                ])),
                Step::new("introduction", "Introduce yourself", StepKind::Form)
                    .guarded(Guard::required(["introduction.title"])),
                Step::new("tips", "Before you record", StepKind::Checklist)
                    .guarded(Guard::ChecklistSatisfied),
                Step::new("record", "Record your video", StepKind::Capture)
                    .guarded(Guard::MediaAccepted),
                Step::new("review", "Review and submit", StepKind::Review),
            ],
            WorkflowKind::JobPosting => vec![
                Step::new("posting-type", "Job or internship", StepKind::Form)
                    .guarded(Guard::PostingKindChosen),
                Step::new("basics", "The basics", StepKind::Form).guarded(Guard::required([
                    "posting.title",
                    "posting.company",
                    "posting.location",
                ])),
                Step::new("details", "Role details", StepKind::Form).guarded(Guard::ByPostingKind {
                    job: Box::new(Guard::required(["posting.salary", "posting.employmentType"])),
                    internship: Box::new(Guard::required([
                        "posting.durationWeeks",
                        "posting.stipend",
                    ])),
                }),
                Step::new("confirm", "Confirm", StepKind::Checklist)
                    .guarded(Guard::ChecklistSatisfied),
                Step::new("review", "Review and publish", StepKind::Review),
            ],
            WorkflowKind::StudyAbroad => vec![
                Step::new("personal", "Personal details", StepKind::Form).guarded(Guard::required([
                    "personal.firstName",
                    "personal.lastName",
                    "personal.email",
                ])),
                Step::new("academics", "Academic background", StepKind::Form).guarded(
                    Guard::required(["academics.institution", "academics.degree"]),
                ),
                Step::new("destination", "Destination", StepKind::Form).guarded(Guard::required([
                    "destination.country",
                    "destination.program",
                    "destination.intake",
                ])),
                Step::new("documents", "Documents", StepKind::Checklist)
                    .guarded(Guard::ChecklistSatisfied),
                Step::new("review", "Review and apply", StepKind::Review),
            ],
        }
    }
}
