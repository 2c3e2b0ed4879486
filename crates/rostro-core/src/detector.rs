//! Frontal-face detection via a pretrained funnel-structured cascade.
//!
//! Wraps the SeetaFace cascade from the `rustface` crate. The model is an
//! external read-only asset; all tuning lives in fixed constants here and
//! callers get no configuration surface.

use crate::types::Region;
use rustface::ImageData;
use std::path::Path;
use thiserror::Error;

// --- Fixed cascade tuning (no caller configuration) ---
const CASCADE_MIN_FACE_SIZE: u32 = 20;
const CASCADE_SCORE_THRESHOLD: f64 = 2.0;
const CASCADE_PYRAMID_SCALE: f32 = 0.8;
const CASCADE_SLIDE_STEP: u32 = 4;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("cascade model not found: {0} — place seeta_fd_frontal_v1.0.bin there")]
    ModelNotFound(String),
    #[error("cascade model failed to load: {0}")]
    ModelLoad(String),
}

/// Source of face detections for a grayscale frame.
///
/// Implemented by [`FaceDetector`]; pipelines take this seam so they can be
/// exercised with scripted detections and no model file.
pub trait Detect {
    fn detect(&mut self, frame: &[u8], width: u32, height: u32) -> Vec<Region>;
}

/// Pretrained frontal-face cascade detector.
pub struct FaceDetector {
    inner: Box<dyn rustface::Detector>,
}

impl std::fmt::Debug for FaceDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceDetector").finish_non_exhaustive()
    }
}

impl FaceDetector {
    /// Load the cascade model from the given path.
    pub fn load(model_path: &str) -> Result<Self, DetectorError> {
        if !Path::new(model_path).exists() {
            return Err(DetectorError::ModelNotFound(model_path.to_string()));
        }

        let mut inner = rustface::create_detector(model_path)
            .map_err(|e| DetectorError::ModelLoad(e.to_string()))?;

        inner.set_min_face_size(CASCADE_MIN_FACE_SIZE);
        inner.set_score_thresh(CASCADE_SCORE_THRESHOLD);
        inner.set_pyramid_scale_factor(CASCADE_PYRAMID_SCALE);
        inner.set_slide_window_step(CASCADE_SLIDE_STEP, CASCADE_SLIDE_STEP);

        tracing::info!(path = model_path, "loaded frontal-face cascade");

        Ok(Self { inner })
    }
}

impl Detect for FaceDetector {
    /// Detect faces in a grayscale frame.
    ///
    /// Returns zero or more regions in cascade order (highest score first).
    /// A malformed or empty frame yields no detections, never an error.
    fn detect(&mut self, frame: &[u8], width: u32, height: u32) -> Vec<Region> {
        if !is_legal_frame(frame, width, height) {
            return Vec::new();
        }

        let mut image = ImageData::new(frame, width, height);
        self.inner
            .detect(&mut image)
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                Region {
                    x: bbox.x(),
                    y: bbox.y(),
                    width: bbox.width(),
                    height: bbox.height(),
                }
            })
            .collect()
    }
}

/// The cascade rejects degenerate input by panicking; guard before handing
/// a frame over so bad frames degrade to "no detections" instead.
fn is_legal_frame(frame: &[u8], width: u32, height: u32) -> bool {
    width > 0 && height > 0 && frame.len() >= (width as usize) * (height as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_model() {
        let err = FaceDetector::load("/nonexistent/cascade.bin").unwrap_err();
        assert!(matches!(err, DetectorError::ModelNotFound(_)));
    }

    #[test]
    fn test_legal_frame() {
        let frame = vec![0u8; 64 * 48];
        assert!(is_legal_frame(&frame, 64, 48));
    }

    #[test]
    fn test_empty_frame_is_illegal() {
        assert!(!is_legal_frame(&[], 0, 0));
        assert!(!is_legal_frame(&[], 64, 48));
    }

    #[test]
    fn test_short_buffer_is_illegal() {
        let frame = vec![0u8; 100];
        assert!(!is_legal_frame(&frame, 64, 48));
    }
}
