use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bounding box of a detected face, in source-frame pixel coordinates.
///
/// Transient: produced by the detector for one frame and never persisted.
/// `x`/`y` may be negative when the cascade's size regression pushes a box
/// past the frame edge; the normalizer clamps before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Error, Debug)]
#[error("face image has {actual} pixels, expected {expected} (128×128 grayscale)")]
pub struct WrongPixelCount {
    pub expected: usize,
    pub actual: usize,
}

/// A face crop normalized to the canonical 128×128 grayscale grid.
///
/// Every `FaceImage` holds exactly [`FaceImage::PIXEL_COUNT`] samples in
/// row-major order, so any two can be compared directly. The normalizer and
/// the store's decoder are the only producers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceImage {
    pixels: Vec<u8>,
}

impl FaceImage {
    /// Side length of the canonical grid.
    pub const SIDE: u32 = 128;
    /// Total samples per face: 128 × 128.
    pub const PIXEL_COUNT: usize = (Self::SIDE * Self::SIDE) as usize;

    /// Wrap a row-major pixel buffer, rejecting anything but 128×128.
    pub fn from_pixels(pixels: Vec<u8>) -> Result<Self, WrongPixelCount> {
        if pixels.len() != Self::PIXEL_COUNT {
            return Err(WrongPixelCount {
                expected: Self::PIXEL_COUNT,
                actual: pixels.len(),
            });
        }
        Ok(Self { pixels })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Euclidean distance between the flattened pixel vectors.
    pub fn distance(&self, other: &FaceImage) -> f32 {
        self.pixels
            .iter()
            .zip(other.pixels.iter())
            .map(|(&a, &b)| {
                let d = a as f32 - b as f32;
                d * d
            })
            .sum::<f32>()
            .sqrt()
    }
}

/// An enrolled face loaded into memory for a recognition session.
///
/// Rebuilt from the store at session start; inserts made while a session is
/// running are invisible until the next session.
#[derive(Debug, Clone)]
pub struct KnownFace {
    pub name: String,
    pub image: FaceImage,
}

/// Result of matching a query face against the loaded gallery.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Name of the nearest enrolled face, or `None` when nothing matched.
    pub name: Option<String>,
    /// Distance to the nearest enrolled face (infinity for an empty gallery).
    pub distance: f32,
}

impl MatchOutcome {
    /// The label to show for this outcome; unmatched queries read "unknown".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unknown")
    }
}

/// Strategy for assigning an identity to a normalized query face.
pub trait Matcher {
    fn compare(&self, query: &FaceImage, gallery: &[KnownFace]) -> MatchOutcome;
}

/// Brute-force nearest neighbor over raw pixel vectors.
///
/// Scans the entire gallery per query, keeping the entry with the smallest
/// Euclidean distance under strict `<`, so the earliest entry wins ties.
/// With no `max_distance` the nearest name is returned no matter how far it
/// is — "unknown" only ever means the gallery was empty. O(n·d) per query,
/// d = 16384; there is no index and no caching.
pub struct NearestNeighborMatcher {
    /// Optional distance ceiling. Queries farther than this from every
    /// enrolled face come back unmatched instead of taking the nearest name.
    pub max_distance: Option<f32>,
}

impl Default for NearestNeighborMatcher {
    fn default() -> Self {
        Self { max_distance: None }
    }
}

impl Matcher for NearestNeighborMatcher {
    fn compare(&self, query: &FaceImage, gallery: &[KnownFace]) -> MatchOutcome {
        let mut best_distance = f32::INFINITY;
        let mut best_name: Option<&str> = None;

        for known in gallery {
            let distance = query.distance(&known.image);
            if distance < best_distance {
                best_distance = distance;
                best_name = Some(&known.name);
            }
        }

        let within_ceiling = self
            .max_distance
            .map_or(true, |ceiling| best_distance <= ceiling);

        match best_name {
            Some(name) if within_ceiling => MatchOutcome {
                name: Some(name.to_owned()),
                distance: best_distance,
            },
            _ => MatchOutcome {
                name: None,
                distance: best_distance,
            },
        }
    }
}
