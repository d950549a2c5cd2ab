//! Submission
//!
//! Delivery of a finished workflow to the external endpoint.

pub mod http;
pub mod job;
pub mod payload;
pub mod pipeline;
pub mod transfer;

pub use http::HttpTransfer;
pub use job::{JobState, SubmissionJob};
pub use payload::SubmissionPayload;
pub use pipeline::{
    SubmissionError, SubmissionEvent, SubmissionPipeline, SubmissionReport, SubmissionRequest,
};
pub use transfer::{ProgressSink, Transfer, TransferError, TransferReceipt};
