//! Media sources
//!
//! Live capture and file upload behind one capability interface.

pub mod live;
pub mod slot;
pub mod source;
pub mod upload;

pub use live::LiveCaptureSource;
pub use slot::{ActiveMedia, MediaSlot};
pub use source::{MediaError, MediaKind, MediaSource};
pub use upload::FileUploadSource;
