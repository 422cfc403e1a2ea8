// SPDX-License-Identifier: GPL-3.0-only

//! Server configuration
//!
//! Everything has a built-in default. A JSON file can override any subset of
//! fields, and command-line flags override the file.

use crate::capture::{CaptureSettings, PixelFormat};
use crate::constants::{self, MissPolicy};
use crate::errors::ConfigError;
use crate::producer::ProducerOptions;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Capture device settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Requested resolution width
    pub width: u32,
    /// Requested resolution height
    pub height: u32,
    /// Requested V4L2 FourCC (e.g., "YUYV", "MJPG")
    pub pixel_format: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: constants::DEFAULT_CAPTURE_WIDTH,
            height: constants::DEFAULT_CAPTURE_HEIGHT,
            pixel_format: "YUYV".to_string(),
        }
    }
}

impl CaptureConfig {
    /// Resolve into settings for the frame source
    pub fn settings(&self) -> Result<CaptureSettings, ConfigError> {
        let fourcc: [u8; 4] = self
            .pixel_format
            .as_bytes()
            .try_into()
            .map_err(|_| invalid_pixel_format(&self.pixel_format))?;
        let format =
            PixelFormat::from_fourcc(&fourcc).ok_or_else(|| invalid_pixel_format(&self.pixel_format))?;

        Ok(CaptureSettings {
            width: self.width,
            height: self.height,
            format,
        })
    }
}

fn invalid_pixel_format(value: &str) -> ConfigError {
    ConfigError::Invalid(format!("unsupported capture pixel format '{}'", value))
}

/// External detector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Program and arguments of the detector process
    pub command: Vec<String>,
    /// Minimum confidence for reporting a new hand (0.0 to 1.0)
    pub min_detection_confidence: f32,
    /// Minimum confidence for keeping a tracked hand (0.0 to 1.0)
    pub min_tracking_confidence: f32,
    /// Landmarks expected per hand; other counts are discarded
    pub landmark_count: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            min_detection_confidence: constants::DEFAULT_DETECTION_CONFIDENCE,
            min_tracking_confidence: constants::DEFAULT_TRACKING_CONFIDENCE,
            landmark_count: constants::HAND_LANDMARK_COUNT,
        }
    }
}

/// Producer loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProducerConfig {
    /// What to publish for a side that was not detected in a frame
    pub miss_policy: MissPolicy,
    /// Swap left and right before publishing
    pub mirror_handedness: bool,
    /// Consecutive capture failures tolerated before the loop stops
    pub capture_retries: u32,
    /// Delay between capture retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            miss_policy: MissPolicy::default(),
            mirror_handedness: false,
            capture_retries: constants::DEFAULT_CAPTURE_RETRIES,
            retry_delay_ms: constants::DEFAULT_RETRY_DELAY.as_millis() as u64,
        }
    }
}

impl ProducerConfig {
    pub fn options(&self) -> ProducerOptions {
        ProducerOptions {
            miss_policy: self.miss_policy,
            mirror_handedness: self.mirror_handedness,
            capture_retries: self.capture_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Capture device index (`/dev/video{camera_id}`)
    pub camera_id: u32,
    /// Address the HTTP server listens on
    pub bind_addr: String,
    pub capture: CaptureConfig,
    pub detector: DetectorConfig,
    pub producer: ProducerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_id: constants::DEFAULT_CAMERA_ID,
            bind_addr: constants::DEFAULT_BIND_ADDR.to_string(),
            capture: CaptureConfig::default(),
            detector: DetectorConfig::default(),
            producer: ProducerConfig::default(),
        }
    }
}

impl Config {
    /// Default config file location (`~/.config/hand-server/config.json` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(constants::CONFIG_DIR_NAME)
                .join(constants::CONFIG_FILE_NAME)
        })
    }

    /// Parse a config from JSON text
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load `explicit` if given, else the default path if it exists, else defaults
    ///
    /// A missing file is only an error when the path was given explicitly.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            other => {
                debug!(path = ?other, "No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("min_detection_confidence", self.detector.min_detection_confidence),
            ("min_tracking_confidence", self.detector.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "detector.{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }

        if self.detector.landmark_count == 0 {
            return Err(ConfigError::Invalid(
                "detector.landmark_count must be positive".to_string(),
            ));
        }

        self.socket_addr()?;
        self.capture.settings()?;
        Ok(())
    }

    /// Parsed listen address
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr.parse().map_err(|e| {
            ConfigError::Invalid(format!("bind_addr '{}': {}", self.bind_addr, e))
        })
    }
}
