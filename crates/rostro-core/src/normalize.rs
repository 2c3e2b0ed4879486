//! Face crop normalization.
//!
//! Crops a detected region out of a grayscale frame and resizes it with
//! bilinear interpolation to the canonical 128×128 grid. Both the store and
//! the matcher assume this fixed size; this module is the only place frames
//! become [`FaceImage`]s.

use crate::types::{FaceImage, Region};

/// Crop `region` out of the frame and resize it to 128×128.
///
/// The region is clamped to the frame bounds first (the cascade can emit
/// boxes that overhang an edge). Returns `None` when the clamped region has
/// no area.
pub fn normalize_face(frame: &[u8], width: u32, height: u32, region: &Region) -> Option<FaceImage> {
    if width == 0 || height == 0 || frame.len() < (width as usize) * (height as usize) {
        return None;
    }

    let x0 = region.x.max(0) as u32;
    let y0 = region.y.max(0) as u32;
    let x1 = (region.x.saturating_add(region.width as i32).max(0) as u32).min(width);
    let y1 = (region.y.saturating_add(region.height as i32).max(0) as u32).min(height);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let crop_w = (x1 - x0) as usize;
    let crop_h = (y1 - y0) as usize;
    let stride = width as usize;

    let mut crop = Vec::with_capacity(crop_w * crop_h);
    for y in y0 as usize..y1 as usize {
        let row = y * stride + x0 as usize;
        crop.extend_from_slice(&frame[row..row + crop_w]);
    }

    let side = FaceImage::SIDE as usize;
    let pixels = resize_bilinear(&crop, crop_w, crop_h, side, side);

    // Length is side*side by construction.
    FaceImage::from_pixels(pixels).ok()
}

/// Bilinear resample with center-aligned sampling and edge-clamped taps.
fn resize_bilinear(src: &[u8], src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Vec<u8> {
    let scale_x = src_w as f32 / dst_w as f32;
    let scale_y = src_h as f32 / dst_h as f32;

    let mut dst = vec![0u8; dst_w * dst_h];
    for y in 0..dst_h {
        let src_y = (y as f32 + 0.5) * scale_y - 0.5;
        let y0 = (src_y.floor() as i32).clamp(0, src_h as i32 - 1) as usize;
        let y1 = (y0 + 1).min(src_h - 1);
        let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

        for x in 0..dst_w {
            let src_x = (x as f32 + 0.5) * scale_x - 0.5;
            let x0 = (src_x.floor() as i32).clamp(0, src_w as i32 - 1) as usize;
            let x1 = (x0 + 1).min(src_w - 1);
            let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

            let tl = src[y0 * src_w + x0] as f32;
            let tr = src[y0 * src_w + x1] as f32;
            let bl = src[y1 * src_w + x0] as f32;
            let br = src[y1 * src_w + x1] as f32;

            let val = tl * (1.0 - fx) * (1.0 - fy)
                + tr * fx * (1.0 - fy)
                + bl * (1.0 - fx) * fy
                + br * fx * fy;

            dst[y * dst_w + x] = val.round().clamp(0.0, 255.0) as u8;
        }
    }

    dst
}
