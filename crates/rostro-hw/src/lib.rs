//! rostro-hw — Webcam capture for the demo pipelines.
//!
//! V4L2-based frame acquisition plus the small amount of pixel plumbing the
//! pipelines need: grayscale conversion, horizontal mirroring, box drawing.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, DeviceInfo};
pub use frame::Frame;
