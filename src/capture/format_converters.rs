// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion to RGB24
//!
//! Detectors take tightly packed RGB24. These helpers convert whatever the
//! capture device delivers into that layout.

use super::types::RgbImage;
use crate::errors::CaptureError;

/// Convert YUYV (YUV 4:2:2) to RGB24
///
/// YUYV format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
/// Uses BT.601 coefficients for YUV to RGB conversion.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let pixel_count = (width * height) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);

    'chunks: for chunk in data.chunks_exact(4) {
        let y0 = chunk[0] as f32;
        let u = chunk[1] as f32 - 128.0;
        let y1 = chunk[2] as f32;
        let v = chunk[3] as f32 - 128.0;

        for y in [y0, y1] {
            if rgb.len() >= pixel_count * 3 {
                break 'chunks;
            }

            let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
            let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
            let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

            rgb.extend_from_slice(&[r, g, b]);
        }
    }

    rgb
}

/// Drop the alpha channel from RGBA
pub fn rgba_to_rgb(data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(data.len() / 4 * 3);
    for px in data.chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }
    rgb
}

/// Swap BGR24 into RGB24
pub fn bgr_to_rgb(data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(data.len());
    for px in data.chunks_exact(3) {
        rgb.extend_from_slice(&[px[2], px[1], px[0]]);
    }
    rgb
}

/// Decode one MJPEG frame
pub fn decode_mjpeg(data: &[u8]) -> Result<RgbImage, CaptureError> {
    let decoded = image::load_from_memory_with_format(data, image::ImageFormat::Jpeg)
        .map_err(|e| CaptureError::InvalidFormat(format!("MJPEG decode failed: {}", e)))?
        .to_rgb8();

    Ok(RgbImage {
        width: decoded.width(),
        height: decoded.height(),
        data: decoded.into_raw(),
    })
}
