// SPDX-License-Identifier: GPL-3.0-only

//! Hand detectors
//!
//! The landmark model itself lives outside this crate. A detector takes a
//! frame and reports landmarks for zero, one, or both hands.

pub mod sidecar;

pub use sidecar::SidecarDetector;

use crate::capture::Frame;
use crate::errors::DetectError;
use crate::hands::Detections;
use std::sync::Arc;

/// Unblocks a detector that is waiting on its backend
///
/// Called from another thread while `detect` may be in progress. After an
/// interrupt the detector is expected to fail every call.
pub trait Interrupt: Send + Sync {
    fn interrupt(&self);
}

/// Frame in, per-side landmarks out
pub trait HandDetector {
    /// Run detection on one frame
    ///
    /// Sides with no hand are simply missing from the result.
    fn detect(&mut self, frame: &Frame) -> Result<Detections, DetectError>;

    /// Handle for aborting a blocked [`HandDetector::detect`] call
    ///
    /// Detectors that never block for long can keep the default.
    fn interrupter(&self) -> Option<Arc<dyn Interrupt>> {
        None
    }
}

impl<D: HandDetector + ?Sized> HandDetector for Box<D> {
    fn detect(&mut self, frame: &Frame) -> Result<Detections, DetectError> {
        (**self).detect(frame)
    }

    fn interrupter(&self) -> Option<Arc<dyn Interrupt>> {
        (**self).interrupter()
    }
}
