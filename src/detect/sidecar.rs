// SPDX-License-Identifier: GPL-3.0-only

//! Detector that runs in a separate process
//!
//! Landmark models are usually shipped with Python bindings, so the model
//! runs as a child process and we talk to it over pipes:
//!
//! ```text
//! stdin  <- {"width":640,"height":480,"format":"rgb24","len":921600}\n
//!           <len raw RGB bytes>
//! stdout -> {"hands":[{"side":"Left","landmarks":[{"x":..,"y":..,"z":..}, ...]}]}\n
//! ```
//!
//! One response line per frame. Thresholds reach the child through the
//! `HAND_MIN_DETECTION_CONFIDENCE` and `HAND_MIN_TRACKING_CONFIDENCE`
//! environment variables.
//!
//! Killing the child through [`SidecarDetector::interrupter`] closes its
//! stdout, which ends a `detect` call blocked on the response.

use super::{HandDetector, Interrupt};
use crate::capture::Frame;
use crate::config::DetectorConfig;
use crate::constants::{DETECTOR_EXIT_GRACE, ENV_DETECTION_CONFIDENCE, ENV_TRACKING_CONFIDENCE};
use crate::errors::DetectError;
use crate::hands::{Detections, Landmark, Side};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

#[derive(Serialize)]
struct FrameHeader<'a> {
    width: u32,
    height: u32,
    format: &'a str,
    len: usize,
}

#[derive(Deserialize)]
struct DetectorResponse {
    #[serde(default)]
    hands: Vec<HandEntry>,
}

#[derive(Deserialize)]
struct HandEntry {
    side: String,
    #[serde(default)]
    landmarks: Vec<Landmark>,
}

/// Kills the detector process from outside the producer thread
struct ChildKiller {
    child: Arc<Mutex<Child>>,
}

impl Interrupt for ChildKiller {
    fn interrupt(&self) {
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(pid = child.id(), "Interrupting detector process");
        let _ = child.kill();
    }
}

/// Hand detector backed by a child process
pub struct SidecarDetector {
    child: Arc<Mutex<Child>>,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    landmark_count: usize,
    line: String,
}

impl SidecarDetector {
    /// Start the detector process described by `config`
    pub fn spawn(config: &DetectorConfig) -> Result<Self, DetectError> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| DetectError::Spawn("no detector command configured".to_string()))?;

        info!(
            program = %program,
            ?args,
            detection_confidence = config.min_detection_confidence,
            tracking_confidence = config.min_tracking_confidence,
            "Starting detector process"
        );

        let mut child = Command::new(program)
            .args(args)
            .env(
                ENV_DETECTION_CONFIDENCE,
                config.min_detection_confidence.to_string(),
            )
            .env(
                ENV_TRACKING_CONFIDENCE,
                config.min_tracking_confidence.to_string(),
            )
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| DetectError::Spawn(format!("{}: {}", program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| DetectError::Spawn("detector stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DetectError::Spawn("detector stdout not captured".to_string()))?;

        debug!(pid = child.id(), "Detector process started");

        Ok(Self {
            child: Arc::new(Mutex::new(child)),
            stdin,
            stdout: BufReader::new(stdout),
            landmark_count: config.landmark_count,
            line: String::new(),
        })
    }

    fn send_frame(&mut self, frame: &Frame) -> Result<(), DetectError> {
        let rgb = frame
            .to_rgb()
            .map_err(|e| DetectError::Frame(e.to_string()))?;

        let header = FrameHeader {
            width: rgb.width,
            height: rgb.height,
            format: "rgb24",
            len: rgb.data.len(),
        };
        let mut header_line = serde_json::to_vec(&header)?;
        header_line.push(b'\n');

        self.stdin.write_all(&header_line)?;
        self.stdin.write_all(&rgb.data)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Error for a child whose pipes have closed
    ///
    /// The exit status can lag behind the pipes closing, so it is polled
    /// for a short while before settling for an I/O error.
    fn exit_error(&self) -> DetectError {
        let deadline = Instant::now() + DETECTOR_EXIT_GRACE;
        loop {
            let status = self
                .child
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .try_wait();
            match status {
                Ok(Some(status)) => return DetectError::Exited(status.code()),
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(5));
                }
                _ => return DetectError::Io("detector closed its output".to_string()),
            }
        }
    }
}

impl HandDetector for SidecarDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Detections, DetectError> {
        if let Err(e) = self.send_frame(frame) {
            // A write failure usually means the child is gone
            return Err(match e {
                DetectError::Io(_) => self.exit_error(),
                other => other,
            });
        }

        self.line.clear();
        let read = self.stdout.read_line(&mut self.line)?;
        if read == 0 {
            return Err(self.exit_error());
        }

        trace!(bytes = read, "Detector response received");
        parse_response(&self.line, self.landmark_count)
    }

    fn interrupter(&self) -> Option<Arc<dyn Interrupt>> {
        Some(Arc::new(ChildKiller {
            child: Arc::clone(&self.child),
        }))
    }
}

impl Drop for SidecarDetector {
    fn drop(&mut self) {
        let mut child = self.child.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(pid = child.id(), "Stopping detector process");
        let _ = child.kill();
        let _ = child.wait();
    }
}

/// Parse one detector response line
///
/// Entries with an unknown side or the wrong number of landmarks are
/// dropped. When a side appears twice the first entry wins.
pub fn parse_response(line: &str, landmark_count: usize) -> Result<Detections, DetectError> {
    let response: DetectorResponse = serde_json::from_str(line.trim())?;
    let mut detections = Detections::new();

    for entry in response.hands {
        let side = match entry.side.parse::<Side>() {
            Ok(side) => side,
            Err(e) => {
                warn!(error = %e, "Ignoring detection with unknown side");
                continue;
            }
        };

        if entry.landmarks.len() != landmark_count {
            warn!(
                side = %side,
                got = entry.landmarks.len(),
                expected = landmark_count,
                "Ignoring detection with unexpected landmark count"
            );
            continue;
        }

        if !detections.insert(side, entry.landmarks) {
            debug!(side = %side, "Duplicate detection for side, keeping first");
        }
    }

    Ok(detections)
}
