// SPDX-License-Identifier: GPL-3.0-only

//! Capture → detect → publish loop
//!
//! [`Producer`] owns one frame source and one detector and runs single
//! cycles against a shared [`HandStore`]. [`ProducerHandle`] runs those
//! cycles on a dedicated thread until stopped, until capture fails for
//! good, or until the detector goes away.

pub mod frame_loop;

pub use frame_loop::ProducerHandle;

use crate::capture::FrameSource;
use crate::constants::{self, CYCLE_LOG_INTERVAL, MissPolicy};
use crate::detect::HandDetector;
use crate::detect::Interrupt;
use crate::errors::{AppResult, CaptureError};
use crate::hands::{HandReading, Side};
use crate::store::SharedHandStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Producer behavior knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProducerOptions {
    pub miss_policy: MissPolicy,
    /// Swap left and right before publishing
    pub mirror_handedness: bool,
    /// Consecutive capture failures tolerated; the next one is fatal
    pub capture_retries: u32,
    pub retry_delay: Duration,
}

impl Default for ProducerOptions {
    fn default() -> Self {
        Self {
            miss_policy: MissPolicy::default(),
            mirror_handedness: false,
            capture_retries: constants::DEFAULT_CAPTURE_RETRIES,
            retry_delay: constants::DEFAULT_RETRY_DELAY,
        }
    }
}

/// What a single cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Detection ran; `detected` sides had a hand, `published` readings were written
    Published { detected: usize, published: usize },
    /// Capture failed but the retry budget is not used up yet
    CaptureRetry { attempt: u32 },
    /// Detector failed on this frame but can take the next one; nothing was published
    DetectFailed,
}

/// Counters accumulated over the producer's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProducerStats {
    /// Frames that went through detection successfully
    pub cycles: u64,
    pub capture_failures: u64,
    pub detect_failures: u64,
    /// Readings written to the store
    pub publishes: u64,
}

/// One frame source and one detector feeding a store
pub struct Producer<S, D> {
    source: S,
    detector: D,
    store: SharedHandStore,
    options: ProducerOptions,
    sequence: u64,
    consecutive_failures: u32,
    stats: ProducerStats,
}

impl<S: FrameSource, D: HandDetector> Producer<S, D> {
    pub fn new(source: S, detector: D, store: SharedHandStore, options: ProducerOptions) -> Self {
        Self {
            source,
            detector,
            store,
            options,
            sequence: 0,
            consecutive_failures: 0,
            stats: ProducerStats::default(),
        }
    }

    pub fn stats(&self) -> ProducerStats {
        self.stats
    }

    /// Handle that unblocks a detector call from another thread, if the
    /// detector provides one
    pub fn interrupter(&self) -> Option<Arc<dyn Interrupt>> {
        self.detector.interrupter()
    }

    /// Run one capture → detect → publish cycle
    ///
    /// Returns `Err` when capture has failed more than `capture_retries`
    /// times in a row, or when the detector can no longer answer. The store
    /// is never touched while the detector runs.
    pub fn run_cycle(&mut self) -> AppResult<CycleOutcome> {
        let frame = match self.source.capture_frame() {
            Ok(frame) => {
                if self.consecutive_failures > 0 {
                    info!(
                        failures = self.consecutive_failures,
                        "Capture recovered"
                    );
                }
                self.consecutive_failures = 0;
                frame
            }
            Err(e) => return Ok(self.capture_failed(e)?),
        };

        self.sequence += 1;
        let sequence = self.sequence;

        let detections = match self.detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                self.stats.detect_failures += 1;
                if e.is_fatal() {
                    warn!(error = %e, sequence, "Detector is gone");
                    return Err(e.into());
                }
                warn!(error = %e, sequence, "Hand detection failed, skipping frame");
                return Ok(CycleOutcome::DetectFailed);
            }
        };

        let mut detections = if self.options.mirror_handedness {
            detections.mirrored()
        } else {
            detections
        };
        let detected = detections.len();

        let mut published = 0;
        for side in Side::ALL {
            let reading = match detections.take(side) {
                Some(landmarks) => {
                    HandReading::detected(side, landmarks, frame.captured_at, sequence)
                }
                None if self.options.miss_policy.clears_missed_sides() => {
                    HandReading::no_hand(side, frame.captured_at, sequence)
                }
                None => continue,
            };
            self.store.publish(side, reading);
            published += 1;
        }

        self.stats.cycles += 1;
        self.stats.publishes += published as u64;

        if sequence % CYCLE_LOG_INTERVAL == 0 {
            debug!(
                sequence,
                detected,
                detect_failures = self.stats.detect_failures,
                "Producer progress"
            );
        }

        Ok(CycleOutcome::Published {
            detected,
            published,
        })
    }

    fn capture_failed(&mut self, e: CaptureError) -> Result<CycleOutcome, CaptureError> {
        self.stats.capture_failures += 1;
        self.consecutive_failures += 1;

        if self.consecutive_failures > self.options.capture_retries {
            error!(
                error = %e,
                source = %self.source.describe(),
                failures = self.consecutive_failures,
                "Capture failed, giving up"
            );
            return Err(e);
        }

        warn!(
            error = %e,
            attempt = self.consecutive_failures,
            max_retries = self.options.capture_retries,
            "Capture failed, retrying"
        );
        if !self.options.retry_delay.is_zero() {
            std::thread::sleep(self.options.retry_delay);
        }

        Ok(CycleOutcome::CaptureRetry {
            attempt: self.consecutive_failures,
        })
    }
}
