//! Freehand signature capture.
//!
//! Strokes are recorded as polylines and rasterized to a white PNG canvas on
//! `read()`. A blank pad reads as `None`: nothing is submitted and no error
//! is raised, exactly like tapping "confirm" on an untouched canvas.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

const DEFAULT_WIDTH: u32 = 512;
const DEFAULT_HEIGHT: u32 = 256;
/// Half-width of the pen, in pixels.
const PEN_RADIUS: i32 = 1;

pub struct SignaturePad {
    width: u32,
    height: u32,
    strokes: Vec<Vec<(f32, f32)>>,
}

impl SignaturePad {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            strokes: Vec::new(),
        }
    }

    /// Record a finished stroke. Zero-point strokes are ignored; a single
    /// point is a dot.
    pub fn add_stroke(&mut self, points: Vec<(f32, f32)>) {
        if !points.is_empty() {
            self.strokes.push(points);
        }
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Encode the pad as `data:image/png;base64,…`, or `None` when blank.
    pub fn read(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let image = self.render();
        let mut png = Vec::new();
        if let Err(e) =
            image::DynamicImage::ImageRgba8(image).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        {
            log::error!("Failed to encode signature PNG: {}", e);
            return None;
        }

        Some(format!("data:image/png;base64,{}", BASE64.encode(&png)))
    }

    fn render(&self) -> RgbaImage {
        let mut image =
            RgbaImage::from_pixel(self.width, self.height, Rgba([255, 255, 255, 255]));
        for stroke in &self.strokes {
            if stroke.len() == 1 {
                self.plot(&mut image, stroke[0]);
            }
            for pair in stroke.windows(2) {
                self.draw_segment(&mut image, pair[0], pair[1]);
            }
        }
        image
    }

    fn draw_segment(&self, image: &mut RgbaImage, from: (f32, f32), to: (f32, f32)) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.plot(image, (from.0 + dx * t, from.1 + dy * t));
        }
    }

    fn plot(&self, image: &mut RgbaImage, (x, y): (f32, f32)) {
        let cx = x.round() as i32;
        let cy = y.round() as i32;
        for oy in -PEN_RADIUS..=PEN_RADIUS {
            for ox in -PEN_RADIUS..=PEN_RADIUS {
                let px = cx + ox;
                let py = cy + oy;
                if px >= 0 && py >= 0 && (px as u32) < self.width && (py as u32) < self.height {
                    image.put_pixel(px as u32, py as u32, Rgba([0, 0, 0, 255]));
                }
            }
        }
    }
}

impl Default for SignaturePad {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn pad_with_stroke() -> SignaturePad {
        let mut pad = SignaturePad::default();
        pad.add_stroke(vec![(10.0, 10.0), (120.0, 80.0), (200.0, 40.0)]);
        pad
    }

    #[test]
    fn test_blank_pad_reads_none() {
        let pad = SignaturePad::default();
        assert!(pad.read().is_none());
    }

    #[test]
    fn test_empty_stroke_is_ignored() {
        let mut pad = SignaturePad::default();
        pad.add_stroke(vec![]);
        assert!(pad.is_empty());
        assert!(pad.read().is_none());
    }

    #[test]
    fn test_read_produces_png_data_url() {
        let payload = pad_with_stroke().read().unwrap();
        let encoded = payload.strip_prefix("data:image/png;base64,").unwrap();

        let bytes = BASE64.decode(encoded).unwrap();
        assert_eq!(&bytes[..8], &PNG_MAGIC);
    }

    #[test]
    fn test_clear_blanks_the_pad() {
        let mut pad = pad_with_stroke();
        assert!(!pad.is_empty());

        pad.clear();
        assert!(pad.is_empty());
        assert!(pad.read().is_none());
    }

    #[test]
    fn test_out_of_bounds_points_do_not_panic() {
        let mut pad = SignaturePad::new(64, 64);
        pad.add_stroke(vec![(-20.0, -20.0), (400.0, 400.0)]);
        assert!(pad.read().is_some());
    }
}
