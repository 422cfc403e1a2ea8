// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 frame capture
//!
//! Opens `/dev/video{index}` with the v4l crate and streams frames from a
//! memory-mapped buffer queue. Each frame is copied out of the mmap buffer
//! before it is handed on, so the queue never waits on detection.

use super::FrameSource;
use super::types::{Frame, PixelFormat};
use crate::constants::CAPTURE_BUFFER_COUNT;
use crate::errors::CaptureError;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

/// Requested capture parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

/// Frame source backed by a V4L2 capture device
pub struct V4l2Source {
    // Field order matters: the stream must be dropped before the device.
    stream: MmapStream<'static>,
    _device: Device,
    index: usize,
    width: u32,
    height: u32,
    stride: u32,
    format: PixelFormat,
}

impl V4l2Source {
    /// Open the capture device with the given index
    ///
    /// The device may not accept the requested settings; whatever it
    /// settles on is used as long as we can convert it.
    pub fn open(index: usize, settings: CaptureSettings) -> Result<Self, CaptureError> {
        info!(
            camera = index,
            width = settings.width,
            height = settings.height,
            format = %settings.format,
            "Opening V4L2 capture device"
        );

        let device = Device::new(index)?;

        let mut format = device.format()?;
        format.width = settings.width;
        format.height = settings.height;
        format.fourcc = v4l::FourCC::new(&settings.format.fourcc());

        let applied = match device.set_format(&format) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::ResourceBusy => {
                return Err(CaptureError::Busy);
            }
            Err(e) => {
                warn!(error = %e, "Could not set format, using current device format");
                device.format()?
            }
        };

        let pixel_format = PixelFormat::from_fourcc(&applied.fourcc.repr).ok_or_else(|| {
            CaptureError::InvalidFormat(format!(
                "device {} delivers unsupported format {}",
                index, applied.fourcc
            ))
        })?;

        if applied.width != settings.width || applied.height != settings.height {
            debug!(
                requested_width = settings.width,
                requested_height = settings.height,
                width = applied.width,
                height = applied.height,
                "Device adjusted capture resolution"
            );
        }

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, CAPTURE_BUFFER_COUNT)?;

        info!(
            camera = index,
            width = applied.width,
            height = applied.height,
            format = %pixel_format,
            "V4L2 capture stream started"
        );

        Ok(Self {
            stream,
            _device: device,
            index,
            width: applied.width,
            height: applied.height,
            stride: applied.stride,
            format: pixel_format,
        })
    }
}

impl FrameSource for V4l2Source {
    fn capture_frame(&mut self) -> Result<Frame, CaptureError> {
        let (buf, meta) = self
            .stream
            .next()
            .map_err(|e| CaptureError::Disconnected(e.to_string()))?;
        let captured_at = Instant::now();

        // MJPEG buffers are only partly filled
        let used = (meta.bytesused as usize).min(buf.len());
        let bytes = if used > 0 { &buf[..used] } else { buf };

        Ok(Frame {
            width: self.width,
            height: self.height,
            data: Arc::from(bytes),
            format: self.format,
            stride: self.stride,
            captured_at,
        })
    }

    fn describe(&self) -> String {
        format!(
            "/dev/video{} ({}x{} {})",
            self.index, self.width, self.height, self.format
        )
    }
}
