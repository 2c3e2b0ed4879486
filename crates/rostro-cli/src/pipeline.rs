//! Shared enrollment and recognition pipelines.
//!
//! Every entry point drives these; they are plain functions of
//! (frame, state) so they run without a camera or a display surface.

use rostro_core::{normalize_face, Detect, KnownFace, MatchOutcome, Matcher, Region};
use rostro_hw::Frame;
use rostro_store::{FaceStore, StoreError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("no face detected in the captured frame")]
    NoFaceDetected,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One matched face in a processed frame.
pub struct Annotation {
    pub region: Region,
    pub outcome: MatchOutcome,
}

/// Enroll a face from a single captured frame.
///
/// Requires a non-empty name and at least one detection; aborts without
/// touching the store otherwise. Only the first detected region is kept —
/// any other faces in the frame are ignored.
pub fn capture_face<D: Detect>(
    detector: &mut D,
    store: &FaceStore,
    frame: &Frame,
    name: &str,
) -> Result<i64, CaptureError> {
    if name.trim().is_empty() {
        return Err(CaptureError::EmptyName);
    }

    let regions = detector.detect(&frame.data, frame.width, frame.height);
    let Some(region) = regions.first() else {
        return Err(CaptureError::NoFaceDetected);
    };
    let Some(face) = normalize_face(&frame.data, frame.width, frame.height, region) else {
        return Err(CaptureError::NoFaceDetected);
    };

    let id = store.insert(name, &face)?;
    Ok(id)
}

/// Run recognition over one frame.
///
/// Detects all regions, normalizes and matches each against the gallery,
/// then draws a box per matched region into the frame. Drawing happens
/// after matching so annotations never feed back into the crops. The last
/// annotation is the frame's summary status; earlier ones are overwritten,
/// as in the desktop demo's status label.
pub fn recognize_frame<D: Detect, M: Matcher>(
    detector: &mut D,
    matcher: &M,
    gallery: &[KnownFace],
    frame: &mut Frame,
) -> Vec<Annotation> {
    let regions = detector.detect(&frame.data, frame.width, frame.height);

    let mut annotations = Vec::with_capacity(regions.len());
    for region in regions {
        let Some(face) = normalize_face(&frame.data, frame.width, frame.height, &region) else {
            continue;
        };
        let outcome = matcher.compare(&face, gallery);
        annotations.push(Annotation { region, outcome });
    }

    for annotation in &annotations {
        let r = &annotation.region;
        frame.draw_box(r.x, r.y, r.width, r.height);
    }

    annotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use rostro_core::{FaceImage, NearestNeighborMatcher};

    /// Detector returning a fixed script of regions for every frame.
    struct StubDetector(Vec<Region>);

    impl Detect for StubDetector {
        fn detect(&mut self, _frame: &[u8], _width: u32, _height: u32) -> Vec<Region> {
            self.0.clone()
        }
    }

    fn frame_with_patches() -> Frame {
        // 64x64 frame, region A (0..16, 0..16) at value 7, region B
        // (32..48, 32..48) at value 200, background 0.
        let mut data = vec![0u8; 64 * 64];
        for y in 0..16 {
            for x in 0..16 {
                data[y * 64 + x] = 7;
            }
        }
        for y in 32..48 {
            for x in 32..48 {
                data[y * 64 + x] = 200;
            }
        }
        Frame {
            data,
            width: 64,
            height: 64,
            timestamp: std::time::Instant::now(),
            sequence: 0,
        }
    }

    fn region_a() -> Region {
        Region { x: 0, y: 0, width: 16, height: 16 }
    }

    fn region_b() -> Region {
        Region { x: 32, y: 32, width: 16, height: 16 }
    }

    fn uniform(value: u8) -> FaceImage {
        FaceImage::from_pixels(vec![value; FaceImage::PIXEL_COUNT]).unwrap()
    }

    #[test]
    fn test_capture_rejects_empty_name() {
        let mut detector = StubDetector(vec![region_a()]);
        let store = FaceStore::open_in_memory().unwrap();
        let frame = frame_with_patches();

        let err = capture_face(&mut detector, &store, &frame, "  ").unwrap_err();
        assert!(matches!(err, CaptureError::EmptyName));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_capture_without_detection_leaves_store_untouched() {
        let mut detector = StubDetector(vec![]);
        let store = FaceStore::open_in_memory().unwrap();
        let frame = frame_with_patches();

        let err = capture_face(&mut detector, &store, &frame, "alice").unwrap_err();
        assert!(matches!(err, CaptureError::NoFaceDetected));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_capture_stores_first_region_only() {
        let mut detector = StubDetector(vec![region_a(), region_b()]);
        let store = FaceStore::open_in_memory().unwrap();
        let frame = frame_with_patches();

        capture_face(&mut detector, &store, &frame, "alice").unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        // Region A is uniform value 7; region B (value 200) was ignored.
        assert!(loaded[0].image.pixels().iter().all(|&p| p == 7));
    }

    #[test]
    fn test_recognize_empty_gallery_reads_unknown() {
        let mut detector = StubDetector(vec![region_a()]);
        let matcher = NearestNeighborMatcher::default();
        let mut frame = frame_with_patches();

        let annotations = recognize_frame(&mut detector, &matcher, &[], &mut frame);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].outcome.display_name(), "unknown");
    }

    #[test]
    fn test_recognize_matches_each_region() {
        let mut detector = StubDetector(vec![region_a(), region_b()]);
        let matcher = NearestNeighborMatcher::default();
        let gallery = vec![
            KnownFace { name: "alice".into(), image: uniform(7) },
            KnownFace { name: "bob".into(), image: uniform(200) },
        ];
        let mut frame = frame_with_patches();

        let annotations = recognize_frame(&mut detector, &matcher, &gallery, &mut frame);

        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[0].outcome.name.as_deref(), Some("alice"));
        assert_eq!(annotations[1].outcome.name.as_deref(), Some("bob"));
        // Status is whatever came last.
        assert_eq!(annotations.last().unwrap().outcome.display_name(), "bob");
    }

    #[test]
    fn test_recognize_annotates_frame() {
        let mut detector = StubDetector(vec![region_b()]);
        let matcher = NearestNeighborMatcher::default();
        let gallery = vec![KnownFace { name: "bob".into(), image: uniform(200) }];
        let mut frame = frame_with_patches();

        recognize_frame(&mut detector, &matcher, &gallery, &mut frame);

        // Box outline painted at region B's top-left corner.
        assert_eq!(frame.data[32 * 64 + 32], 255);
    }

    #[test]
    fn test_boxes_do_not_contaminate_crops() {
        // Two overlapping-in-row regions: the box drawn for the first must
        // not alter the second crop, since drawing happens after matching.
        let mut detector = StubDetector(vec![region_a(), region_b()]);
        let matcher = NearestNeighborMatcher::default();
        let gallery = vec![
            KnownFace { name: "alice".into(), image: uniform(7) },
            KnownFace { name: "bob".into(), image: uniform(200) },
        ];
        let mut frame = frame_with_patches();

        let annotations = recognize_frame(&mut detector, &matcher, &gallery, &mut frame);
        assert_eq!(annotations[1].outcome.distance, 0.0);
    }
}
