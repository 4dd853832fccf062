use image::{DynamicImage, ImageDecoder, ImageReader, Limits, RgbImage};
use std::io::Cursor;

use crate::application::ports::ImageDecoderPort;
use crate::domain::errors::{DomainError, DomainResult};

pub const MAX_IMAGE_SIDE: u32 = 16_384;
pub const MAX_DECODE_ALLOC: u64 = 512 * 1024 * 1024;

/// Decodes uploads with the `image` codecs. The format is sniffed from the
/// content, never from the file name or declared MIME type. EXIF orientation
/// is applied, so boxes refer to the upright image.
pub struct ImageCodecDecoder {
    max_side: u32,
    max_alloc: u64,
}

impl ImageCodecDecoder {
    pub fn new() -> Self {
        Self { max_side: MAX_IMAGE_SIDE, max_alloc: MAX_DECODE_ALLOC }
    }

    fn limits(&self) -> Limits {
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_side);
        limits.max_image_height = Some(self.max_side);
        limits.max_alloc = Some(self.max_alloc);
        limits
    }
}

impl Default for ImageCodecDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageDecoderPort for ImageCodecDecoder {
    fn decode(&self, bytes: &[u8]) -> DomainResult<RgbImage> {
        if bytes.is_empty() {
            return Err(DomainError::Decode("empty image field".into()));
        }

        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DomainError::Decode(e.to_string()))?;

        if reader.format().is_none() {
            return Err(DomainError::Decode("unrecognized image format".into()));
        }
        reader.limits(self.limits());

        let mut decoder = reader.into_decoder()?;
        let orientation = decoder.orientation()?;
        let mut img = DynamicImage::from_decoder(decoder)?;
        img.apply_orientation(orientation);

        Ok(img.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, Rgb};

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn decodes_png() {
        let img = RgbImage::from_pixel(32, 16, Rgb([10, 200, 30]));
        let bytes = encode(&DynamicImage::ImageRgb8(img), ImageFormat::Png);

        let out = ImageCodecDecoder::new().decode(&bytes).unwrap();
        assert_eq!(out.dimensions(), (32, 16));
        assert_eq!(out.get_pixel(5, 5), &Rgb([10, 200, 30]));
    }

    #[test]
    fn grayscale_becomes_rgb() {
        let img = GrayImage::from_pixel(8, 8, Luma([77]));
        let bytes = encode(&DynamicImage::ImageLuma8(img), ImageFormat::Png);

        let out = ImageCodecDecoder::new().decode(&bytes).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb([77, 77, 77]));
    }

    /// APP1 segment carrying a big-endian TIFF IFD with Orientation = `value`.
    fn exif_orientation_segment(value: u8) -> Vec<u8> {
        let mut tiff = b"MM\x00\x2a\x00\x00\x00\x08".to_vec();
        tiff.extend_from_slice(&[0x00, 0x01]); // one entry
        tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x00, value, 0x00, 0x00]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]); // no next IFD

        let mut payload = b"Exif\x00\x00".to_vec();
        payload.extend_from_slice(&tiff);

        let mut segment = vec![0xFF, 0xE1];
        segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        segment.extend_from_slice(&payload);
        segment
    }

    fn jpeg_with_orientation(w: u32, h: u32, value: u8) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb([90, 90, 90]));
        let jpeg = encode(&DynamicImage::ImageRgb8(img), ImageFormat::Jpeg);
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let mut out = jpeg[..2].to_vec();
        out.extend_from_slice(&exif_orientation_segment(value));
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn applies_exif_rotation() {
        let bytes = jpeg_with_orientation(40, 20, 6);
        let out = ImageCodecDecoder::new().decode(&bytes).unwrap();
        assert_eq!(out.dimensions(), (20, 40));
    }

    #[test]
    fn upright_exif_keeps_dimensions() {
        let bytes = jpeg_with_orientation(40, 20, 1);
        let out = ImageCodecDecoder::new().decode(&bytes).unwrap();
        assert_eq!(out.dimensions(), (40, 20));
    }

    #[test]
    fn rejects_garbage() {
        let err = ImageCodecDecoder::new().decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, DomainError::Decode(_)));
    }

    #[test]
    fn rejects_empty() {
        assert!(ImageCodecDecoder::new().decode(&[]).is_err());
    }

    #[test]
    fn rejects_truncated_png() {
        let img = RgbImage::from_pixel(64, 64, Rgb([1, 2, 3]));
        let bytes = encode(&DynamicImage::ImageRgb8(img), ImageFormat::Png);
        assert!(ImageCodecDecoder::new().decode(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn enforces_dimension_limit() {
        let img = RgbImage::new(40, 10);
        let bytes = encode(&DynamicImage::ImageRgb8(img), ImageFormat::Png);

        let decoder = ImageCodecDecoder { max_side: 32, max_alloc: MAX_DECODE_ALLOC };
        assert!(decoder.decode(&bytes).is_err());
    }
}
