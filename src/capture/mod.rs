// SPDX-License-Identifier: GPL-3.0-only

//! Frame sources
//!
//! The producer loop pulls frames through the [`FrameSource`] trait so the
//! device backend can be swapped (V4L2 in production, scripted sources in
//! tests).

pub mod format_converters;
pub mod types;
pub mod v4l2;

pub use types::{Frame, PixelFormat, RgbImage};
pub use v4l2::{CaptureSettings, V4l2Source};

use crate::errors::CaptureError;

/// Something that produces video frames on demand
pub trait FrameSource {
    /// Block until the next frame is available
    ///
    /// An error means no frame could be produced this time; the caller
    /// decides whether to try again.
    fn capture_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Human readable description for logs
    fn describe(&self) -> String {
        "frame source".to_string()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn capture_frame(&mut self) -> Result<Frame, CaptureError> {
        (**self).capture_frame()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
