//! Live capture plumbing
//!
//! Device seams supplied by the host and the scoped session that owns a stream.

pub mod device;
pub mod traits;

pub use device::DeviceSession;
pub use traits::{
    AudioDeviceInfo, CameraInfo, CaptureConstraints, CaptureDevice, DeviceError, FilePicker,
    PickedFile, Resolution, StreamHandle,
};
