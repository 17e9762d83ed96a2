//! Snapshot raster conversion: stretch to a fixed size and JPEG-encode.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;

use lookout_types::CaptureFrame;

use crate::CameraError;

/// Stretch a raw RGB frame to the target raster size and encode it as JPEG.
///
/// The source is resized to exactly `dst_width x dst_height` with no
/// aspect-ratio correction, matching the fixed-canvas capture behavior.
pub fn encode_jpeg_stretched(
    rgb: Vec<u8>,
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
    quality: u8,
) -> Result<CaptureFrame, CameraError> {
    let img = RgbImage::from_raw(src_width, src_height, rgb).ok_or(CameraError::InvalidFrame)?;

    let resized = if (src_width, src_height) == (dst_width, dst_height) {
        img
    } else {
        imageops::resize(&img, dst_width, dst_height, FilterType::Triangle)
    };

    let mut data = Vec::new();
    resized.write_with_encoder(JpegEncoder::new_with_quality(&mut data, quality))?;

    Ok(CaptureFrame {
        data,
        mime_type: "image/jpeg".to_string(),
        width: dst_width,
        height: dst_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_rgb(width: u32, height: u32, px: [u8; 3]) -> Vec<u8> {
        let mut buf = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..(width * height) {
            buf.extend_from_slice(&px);
        }
        buf
    }

    #[test]
    fn test_stretch_ignores_aspect_ratio() {
        let rgb = solid_rgb(16, 4, [200, 10, 10]);
        let frame = encode_jpeg_stretched(rgb, 16, 4, 8, 8, 85).unwrap();
        assert_eq!(frame.width, 8);
        assert_eq!(frame.height, 8);
        assert_eq!(frame.mime_type, "image/jpeg");

        let decoded = image::load_from_memory(&frame.data).unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 8);
    }

    #[test]
    fn test_same_size_skips_resize() {
        let rgb = solid_rgb(8, 8, [0, 128, 255]);
        let frame = encode_jpeg_stretched(rgb, 8, 8, 8, 8, 85).unwrap();
        // JPEG SOI marker
        assert_eq!(&frame.data[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&frame.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 8));
    }

    #[test]
    fn test_short_buffer_is_invalid() {
        let err = encode_jpeg_stretched(vec![0u8; 10], 16, 16, 8, 8, 85).unwrap_err();
        assert!(matches!(err, CameraError::InvalidFrame));
    }
}
