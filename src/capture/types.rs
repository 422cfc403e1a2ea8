// SPDX-License-Identifier: GPL-3.0-only

//! Frame types shared by frame sources and detectors

use super::format_converters;
use crate::errors::CaptureError;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Pixel layout of a captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGB24 - 3 bytes per pixel, the format detectors receive
    RGB24,
    /// BGR24 - 3 bytes per pixel, blue first
    BGR24,
    /// RGBA - 4 bytes per pixel
    RGBA,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V), the usual raw webcam format
    YUYV,
    /// Motion JPEG - each frame is a complete JPEG image
    MJPEG,
}

impl PixelFormat {
    /// Bytes per pixel for packed formats, `None` for compressed ones
    pub fn bytes_per_pixel(&self) -> Option<u32> {
        match self {
            PixelFormat::RGB24 | PixelFormat::BGR24 => Some(3),
            PixelFormat::RGBA => Some(4),
            PixelFormat::YUYV => Some(2),
            PixelFormat::MJPEG => None,
        }
    }

    /// Map a V4L2 FourCC code to a pixel format we can convert
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        match fourcc {
            b"RGB3" => Some(PixelFormat::RGB24),
            b"BGR3" => Some(PixelFormat::BGR24),
            b"AB24" | b"RGBA" => Some(PixelFormat::RGBA),
            b"YUYV" => Some(PixelFormat::YUYV),
            b"MJPG" | b"JPEG" => Some(PixelFormat::MJPEG),
            _ => None,
        }
    }

    /// FourCC code used when requesting this format from a device
    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            PixelFormat::RGB24 => *b"RGB3",
            PixelFormat::BGR24 => *b"BGR3",
            PixelFormat::RGBA => *b"AB24",
            PixelFormat::YUYV => *b"YUYV",
            PixelFormat::MJPEG => *b"MJPG",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::RGB24 => "RGB24",
            PixelFormat::BGR24 => "BGR24",
            PixelFormat::RGBA => "RGBA",
            PixelFormat::YUYV => "YUYV",
            PixelFormat::MJPEG => "MJPEG",
        };
        f.write_str(name)
    }
}

/// One captured video frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Raw frame bytes in `format` (rows may carry stride padding)
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Bytes per row including padding; ignored for MJPEG
    pub stride: u32,
    /// When the frame was dequeued from the device
    pub captured_at: Instant,
}

/// Tightly packed RGB24 image handed to detectors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    /// Wrap tightly packed RGB24 bytes (mostly for tests and synthetic sources)
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
            format: PixelFormat::RGB24,
            stride: width * 3,
            captured_at: Instant::now(),
        }
    }

    /// Copy frame rows without stride padding
    ///
    /// Rows that run past the end of the buffer are dropped, so a short
    /// buffer yields fewer rows instead of a panic.
    pub fn packed_rows(&self) -> Vec<u8> {
        let Some(bpp) = self.format.bytes_per_pixel() else {
            return self.data.to_vec();
        };
        let row_len = (self.width * bpp) as usize;
        let stride = (self.stride as usize).max(row_len);
        let height = self.height as usize;

        let mut result = Vec::with_capacity(row_len * height);
        for y in 0..height {
            let row_start = y * stride;
            let row_end = row_start + row_len;
            if row_end <= self.data.len() {
                result.extend_from_slice(&self.data[row_start..row_end]);
            }
        }
        result
    }

    /// Convert to tightly packed RGB24
    pub fn to_rgb(&self) -> Result<RgbImage, CaptureError> {
        let Some(bpp) = self.format.bytes_per_pixel() else {
            return format_converters::decode_mjpeg(&self.data);
        };

        let packed = self.packed_rows();
        let expected = (self.width * self.height * bpp) as usize;
        if packed.len() < expected {
            return Err(CaptureError::InvalidFormat(format!(
                "{} frame {}x{} has {} bytes, expected {}",
                self.format,
                self.width,
                self.height,
                packed.len(),
                expected
            )));
        }

        let data = match self.format {
            PixelFormat::BGR24 => format_converters::bgr_to_rgb(&packed),
            PixelFormat::RGBA => format_converters::rgba_to_rgb(&packed),
            PixelFormat::YUYV => format_converters::yuyv_to_rgb(&packed, self.width, self.height),
            PixelFormat::RGB24 | PixelFormat::MJPEG => packed,
        };

        Ok(RgbImage {
            width: self.width,
            height: self.height,
            data,
        })
    }
}
