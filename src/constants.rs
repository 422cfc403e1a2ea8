// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the producer publishes for a side the detector did not see this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Overwrite the side with an explicit no-hand reading (default)
    #[default]
    Clear,
    /// Leave whatever was last published for that side in place
    KeepLast,
}

impl MissPolicy {
    /// Get display name for the policy
    pub fn display_name(&self) -> &'static str {
        match self {
            MissPolicy::Clear => "Clear",
            MissPolicy::KeepLast => "Keep last",
        }
    }

    /// Whether a missed side should be overwritten with a no-hand reading
    pub fn clears_missed_sides(&self) -> bool {
        matches!(self, MissPolicy::Clear)
    }
}

/// Camera index used when none is given on the command line
pub const DEFAULT_CAMERA_ID: u32 = 0;

/// Address the HTTP server binds to by default
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Minimum confidence for the detector to report a new hand
pub const DEFAULT_DETECTION_CONFIDENCE: f32 = 0.75;

/// Minimum confidence for the detector to keep tracking a hand
pub const DEFAULT_TRACKING_CONFIDENCE: f32 = 0.5;

/// Number of landmarks the detector reports per hand
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Requested capture resolution
pub const DEFAULT_CAPTURE_WIDTH: u32 = 640;
pub const DEFAULT_CAPTURE_HEIGHT: u32 = 480;

/// Number of mmap buffers for the V4L2 stream
pub const CAPTURE_BUFFER_COUNT: u32 = 4;

/// Consecutive capture failures tolerated before the producer gives up
pub const DEFAULT_CAPTURE_RETRIES: u32 = 3;

/// Pause between capture retries
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Environment variables the sidecar detector reads its thresholds from
pub const ENV_DETECTION_CONFIDENCE: &str = "HAND_MIN_DETECTION_CONFIDENCE";
pub const ENV_TRACKING_CONFIDENCE: &str = "HAND_MIN_TRACKING_CONFIDENCE";

/// How long to wait for a detector's exit status once its pipes close
pub const DETECTOR_EXIT_GRACE: Duration = Duration::from_millis(100);

/// Directory name under the user config dir
pub const CONFIG_DIR_NAME: &str = "hand-server";

/// Config file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Name of the producer thread (shows up in logs and debuggers)
pub const PRODUCER_THREAD_NAME: &str = "hand-producer";

/// Log a throughput line every this many producer cycles
pub const CYCLE_LOG_INTERVAL: u64 = 300;
