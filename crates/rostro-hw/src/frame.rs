//! Frame type and pixel plumbing — YUYV conversion, mirroring, box drawing.

/// A captured grayscale camera frame.
#[derive(Clone)]
pub struct Frame {
    /// Grayscale pixel data (width * height bytes, row-major).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl Frame {
    /// Mirror the frame horizontally in place, so the image matches what a
    /// user sees of themselves.
    pub fn mirror_horizontal(&mut self) {
        let w = self.width as usize;
        if w == 0 {
            return;
        }
        for row in self.data.chunks_exact_mut(w) {
            row.reverse();
        }
    }

    /// Draw a 2-pixel white rectangle outline, clipped to the frame.
    ///
    /// Used to annotate detected faces on the displayed/saved frame.
    pub fn draw_box(&mut self, x: i32, y: i32, width: u32, height: u32) {
        const THICKNESS: i32 = 2;

        let x1 = x.saturating_add(width as i32);
        let y1 = y.saturating_add(height as i32);

        // Top and bottom edges
        for t in 0..THICKNESS {
            self.draw_hline(x, x1, y + t);
            self.draw_hline(x, x1, y1 - 1 - t);
        }
        // Left and right edges
        for t in 0..THICKNESS {
            self.draw_vline(y, y1, x + t);
            self.draw_vline(y, y1, x1 - 1 - t);
        }
    }

    fn draw_hline(&mut self, x0: i32, x1: i32, y: i32) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let start = x0.clamp(0, self.width as i32) as usize;
        let end = x1.clamp(0, self.width as i32) as usize;
        let row = y as usize * self.width as usize;
        for px in &mut self.data[row + start..row + end] {
            *px = 255;
        }
    }

    fn draw_vline(&mut self, y0: i32, y1: i32, x: i32) {
        if x < 0 || x >= self.width as i32 {
            return;
        }
        let start = y0.clamp(0, self.height as i32) as usize;
        let end = y1.clamp(0, self.height as i32) as usize;
        for y in start..end {
            self.data[y * self.width as usize + x as usize] = 255;
        }
    }
}

/// Convert packed YUYV (4:2:2) to grayscale by extracting the Y channel.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V].
/// Grayscale = every even-indexed byte.
pub fn yuyv_to_grayscale(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }
    Ok(yuyv[..expected].iter().step_by(2).copied().collect())
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid YUYV length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_from(data: Vec<u8>, width: u32, height: u32) -> Frame {
        Frame {
            data,
            width,
            height,
            timestamp: std::time::Instant::now(),
            sequence: 0,
        }
    }

    #[test]
    fn test_yuyv_to_grayscale() {
        // 2x1 image: [Y0=100, U=128, Y1=200, V=128]
        let yuyv = vec![100, 128, 200, 128];
        let gray = yuyv_to_grayscale(&yuyv, 2, 1).unwrap();
        assert_eq!(gray, vec![100, 200]);
    }

    #[test]
    fn test_yuyv_invalid_length() {
        let yuyv = vec![100, 128]; // too short for 2x1
        assert!(yuyv_to_grayscale(&yuyv, 2, 1).is_err());
    }

    #[test]
    fn test_mirror_reverses_rows() {
        let mut frame = frame_from(vec![1, 2, 3, 4, 5, 6], 3, 2);
        frame.mirror_horizontal();
        assert_eq!(frame.data, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_mirror_twice_is_identity() {
        let original: Vec<u8> = (0..20).collect();
        let mut frame = frame_from(original.clone(), 5, 4);
        frame.mirror_horizontal();
        frame.mirror_horizontal();
        assert_eq!(frame.data, original);
    }

    #[test]
    fn test_draw_box_marks_corners() {
        let mut frame = frame_from(vec![0u8; 100], 10, 10);
        frame.draw_box(2, 2, 6, 6);
        // Corners of the outline
        assert_eq!(frame.data[2 * 10 + 2], 255);
        assert_eq!(frame.data[2 * 10 + 7], 255);
        assert_eq!(frame.data[7 * 10 + 2], 255);
        // Interior untouched
        assert_eq!(frame.data[5 * 10 + 5], 0);
    }

    #[test]
    fn test_draw_box_clips_at_edges() {
        let mut frame = frame_from(vec![0u8; 64], 8, 8);
        frame.draw_box(-4, -4, 10, 10);
        // Top-left corner hangs off the frame; the visible bottom and right
        // edges are still painted without panicking.
        assert_eq!(frame.data[5 * 8 + 3], 255);
        assert_eq!(frame.data[3 * 8 + 5], 255);
        assert_eq!(frame.data[0], 0);
    }

    #[test]
    fn test_draw_box_fully_outside() {
        let mut frame = frame_from(vec![0u8; 64], 8, 8);
        frame.draw_box(100, 100, 10, 10);
        assert!(frame.data.iter().all(|&p| p == 0));
    }
}
