//! Session lifetime for a pipeline run.
//!
//! A `Session` owns the camera handle, the store connection, and the loaded
//! detector. One is opened per mode entry and dropped on every exit path,
//! so the camera and the database are released even when a pipeline errors.

use crate::config::Config;
use anyhow::Result;
use rostro_core::FaceDetector;
use rostro_hw::Camera;
use rostro_store::FaceStore;

pub struct Session {
    pub camera: Camera,
    pub detector: FaceDetector,
    pub store: FaceStore,
}

impl Session {
    /// Acquire store, detector, and camera, failing fast on the first
    /// unavailable resource. Warmup frames are discarded so the camera's
    /// auto-exposure settles before the first real capture.
    pub fn open(config: &Config) -> Result<Self> {
        let store = FaceStore::open(&config.db_path)?;
        let detector = FaceDetector::load(&config.model_path.to_string_lossy())?;
        let camera = Camera::open(&config.camera_device)?;

        if config.warmup_frames > 0 {
            tracing::debug!(count = config.warmup_frames, "discarding warmup frames");
            for _ in 0..config.warmup_frames {
                let _ = camera.capture_frame();
            }
        }

        Ok(Self {
            camera,
            detector,
            store,
        })
    }
}
