//! Conversion of external rasters into the canonical RGB8 image buffer.

use image::{DynamicImage, RgbImage};

use crate::error::CensorError;

/// Borrowed sample data of an `H x W x C` raster in row-major order.
#[derive(Debug, Clone, Copy)]
pub enum Raster<'a> {
    /// 8-bit samples, used as-is.
    U8(&'a [u8]),
    /// 16-bit samples, truncated to their low byte.
    U16(&'a [u16]),
    /// Float samples, truncated toward zero and saturated to `0..=255`.
    F32(&'a [f32]),
}

impl Raster<'_> {
    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            Raster::U8(data) => data.len(),
            Raster::U16(data) => data.len(),
            Raster::F32(data) => data.len(),
        }
    }

    /// Returns `true` when the raster holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_u8(self) -> Vec<u8> {
        match self {
            Raster::U8(data) => data.to_vec(),
            Raster::U16(data) => data.iter().map(|&v| v as u8).collect(),
            // `as` saturates out-of-range floats and maps NaN to 0.
            Raster::F32(data) => data.iter().map(|&v| v as u8).collect(),
        }
    }
}

/// Build an RGB image from a raw `shape = [height, width, 3]` raster.
///
/// Fails with [`CensorError::InvalidImageShape`] unless the raster is rank 3
/// with exactly 3 channels and the sample count matches the shape.
pub fn rgb_from_raster(shape: &[usize], data: Raster<'_>) -> Result<RgbImage, CensorError> {
    let &[height, width, channels] = shape else {
        return Err(CensorError::InvalidImageShape(format!("{shape:?}")));
    };
    if channels != 3 {
        return Err(CensorError::InvalidImageShape(format!("{shape:?}")));
    }

    let expected = height
        .checked_mul(width)
        .and_then(|n| n.checked_mul(channels))
        .ok_or_else(|| CensorError::InvalidImageShape(format!("{shape:?}")))?;
    if expected != data.len() {
        return Err(CensorError::InvalidImageShape(format!(
            "{shape:?} with {} samples",
            data.len()
        )));
    }

    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(CensorError::InvalidImageShape(format!("{shape:?}")));
    };

    RgbImage::from_raw(width, height, data.to_u8())
        .ok_or_else(|| CensorError::InvalidImageShape(format!("{shape:?}")))
}

/// Convert any decoded image to RGB8, dropping alpha.
pub fn rgb_from_dynamic(image: &DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb.clone(),
        other => other.to_rgb8(),
    }
}

/// Decode PNG, JPEG, or WebP bytes into an RGB8 image.
pub fn decode_rgb(input: &[u8]) -> Result<RgbImage, CensorError> {
    let decoded =
        image::load_from_memory(input).map_err(|e| CensorError::DecodeError(e.to_string()))?;
    Ok(rgb_from_dynamic(&decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, Rgba, RgbaImage};

    #[test]
    fn u8_raster_round_trips_pixels() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let img = rgb_from_raster(&[1, 2, 3], Raster::U8(&data)).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(1, 0), &image::Rgb([4, 5, 6]));
    }

    #[test]
    fn rejects_wrong_rank() {
        let data = [0u8; 12];
        assert!(matches!(
            rgb_from_raster(&[2, 2], Raster::U8(&data)),
            Err(CensorError::InvalidImageShape(_))
        ));
        assert!(matches!(
            rgb_from_raster(&[1, 1, 2, 3], Raster::U8(&data)),
            Err(CensorError::InvalidImageShape(_))
        ));
    }

    #[test]
    fn rejects_non_rgb_channels() {
        let data = [0u8; 16];
        assert!(matches!(
            rgb_from_raster(&[2, 2, 4], Raster::U8(&data)),
            Err(CensorError::InvalidImageShape(_))
        ));
        assert!(matches!(
            rgb_from_raster(&[4, 4, 1], Raster::U8(&data)),
            Err(CensorError::InvalidImageShape(_))
        ));
    }

    #[test]
    fn rejects_sample_count_mismatch() {
        let data = [0u8; 11];
        assert!(matches!(
            rgb_from_raster(&[2, 2, 3], Raster::U8(&data)),
            Err(CensorError::InvalidImageShape(_))
        ));
    }

    #[test]
    fn u16_samples_keep_low_byte() {
        let data = [256u16, 257, 511];
        let img = rgb_from_raster(&[1, 1, 3], Raster::U16(&data)).unwrap();
        assert_eq!(img.get_pixel(0, 0), &image::Rgb([0, 1, 255]));
    }

    #[test]
    fn f32_samples_truncate_and_saturate() {
        let data = [12.9f32, -4.0, 300.0];
        let img = rgb_from_raster(&[1, 1, 3], Raster::F32(&data)).unwrap();
        assert_eq!(img.get_pixel(0, 0), &image::Rgb([12, 0, 255]));
    }

    #[test]
    fn dynamic_rgba_drops_alpha() {
        let mut rgba = RgbaImage::new(1, 1);
        rgba.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        let rgb = rgb_from_dynamic(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.get_pixel(0, 0), &image::Rgb([10, 20, 30]));
    }

    #[test]
    fn decode_png_bytes() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgb([9, 8, 7]));
        let mut buffer = Vec::new();
        image::codecs::png::PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), 3, 2, image::ExtendedColorType::Rgb8)
            .unwrap();

        let decoded = decode_rgb(&buffer).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(matches!(
            decode_rgb(b"not an image"),
            Err(CensorError::DecodeError(_))
        ));
    }
}
