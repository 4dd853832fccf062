use image::{imageops::FilterType, Rgb, RgbImage};

pub const PAD_VALUE: u8 = 114;

/// How an original image was placed onto the square model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxGeometry {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_w: u32,
    pub orig_h: u32,
    scaled_w: u32,
    scaled_h: u32,
}

impl LetterboxGeometry {
    pub fn new(orig_w: u32, orig_h: u32, size: u32) -> Self {
        let s = size as f32;
        let scale = (s / orig_w as f32).min(s / orig_h as f32);
        let scaled_w = ((orig_w as f32 * scale).round() as u32).min(size).max(1);
        let scaled_h = ((orig_h as f32 * scale).round() as u32).min(size).max(1);
        Self {
            scale,
            pad_x: (size.saturating_sub(scaled_w) / 2) as f32,
            pad_y: (size.saturating_sub(scaled_h) / 2) as f32,
            orig_w,
            orig_h,
            scaled_w,
            scaled_h,
        }
    }

    pub fn scaled_size(&self) -> (u32, u32) {
        (self.scaled_w, self.scaled_h)
    }

    /// Maps a letterbox x coordinate back into the original image, clipped.
    pub fn unmap_x(&self, x: f32) -> f32 {
        ((x - self.pad_x) / self.scale).clamp(0.0, self.orig_w as f32)
    }

    pub fn unmap_y(&self, y: f32) -> f32 {
        ((y - self.pad_y) / self.scale).clamp(0.0, self.orig_h as f32)
    }
}

pub struct Letterbox {
    /// NCHW f32 in [0, 1], length 3 * size * size.
    pub tensor: Vec<f32>,
    pub geometry: LetterboxGeometry,
}

/// Aspect-preserving resize onto a `size`x`size` canvas filled with `PAD_VALUE`.
pub fn letterbox(rgb: &RgbImage, size: u32) -> Letterbox {
    let geometry = LetterboxGeometry::new(rgb.width(), rgb.height(), size);
    let (new_w, new_h) = geometry.scaled_size();
    let resized = image::imageops::resize(rgb, new_w, new_h, FilterType::Triangle);

    let mut canvas = RgbImage::from_pixel(size, size, Rgb([PAD_VALUE; 3]));
    image::imageops::replace(
        &mut canvas,
        &resized,
        geometry.pad_x as i64,
        geometry.pad_y as i64,
    );

    let side = size as usize;
    let plane = side * side;
    let mut tensor = vec![0f32; 3 * plane];
    for (x, y, pixel) in canvas.enumerate_pixels() {
        let idx = y as usize * side + x as usize;
        tensor[idx] = pixel[0] as f32 / 255.0;
        tensor[plane + idx] = pixel[1] as f32 / 255.0;
        tensor[2 * plane + idx] = pixel[2] as f32 / 255.0;
    }

    Letterbox { tensor, geometry }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_pads_vertically() {
        let g = LetterboxGeometry::new(1280, 720, 640);
        assert!((g.scale - 0.5).abs() < 1e-6);
        assert_eq!(g.scaled_size(), (640, 360));
        assert_eq!(g.pad_x, 0.0);
        assert_eq!(g.pad_y, 140.0);
    }

    #[test]
    fn small_image_is_upscaled() {
        let g = LetterboxGeometry::new(320, 320, 640);
        assert!((g.scale - 2.0).abs() < 1e-6);
        assert_eq!((g.pad_x, g.pad_y), (0.0, 0.0));
    }

    #[test]
    fn unmap_inverts_and_clips() {
        let g = LetterboxGeometry::new(1280, 720, 640);
        assert!((g.unmap_x(320.0) - 640.0).abs() < 1e-3);
        assert!((g.unmap_y(140.0 + 180.0) - 360.0).abs() < 1e-3);
        assert_eq!(g.unmap_y(10.0), 0.0);
        assert_eq!(g.unmap_x(700.0), 1280.0);
    }

    #[test]
    fn tensor_layout_and_padding() {
        let img = RgbImage::from_pixel(8, 4, Rgb([255, 0, 51]));
        let lb = letterbox(&img, 8);
        let plane = 64;
        assert_eq!(lb.tensor.len(), 3 * plane);

        // Row 0 is padding, rows 2..6 hold the image.
        let pad = PAD_VALUE as f32 / 255.0;
        assert!((lb.tensor[0] - pad).abs() < 1e-6);
        let mid = 3 * 8 + 4;
        assert!((lb.tensor[mid] - 1.0).abs() < 1e-6);
        assert!(lb.tensor[plane + mid].abs() < 1e-6);
        assert!((lb.tensor[2 * plane + mid] - 0.2).abs() < 1e-6);
    }
}
