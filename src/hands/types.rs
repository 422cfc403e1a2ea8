// SPDX-License-Identifier: GPL-3.0-only

//! Core types for hand detection results
//!
//! These types flow from the detector through the producer loop into the
//! latest-value store, and from there out to HTTP readers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Which hand a reading belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, in slot order
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    /// Slot index used by fixed-size per-side storage
    pub const fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    /// Lowercase name, as used in URLs and JSON
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    /// Accepts `left`/`right` in any case (detectors commonly emit `Left`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("left") {
            Ok(Side::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Ok(Side::Right)
        } else {
            Err(format!("unknown hand side '{}'", s))
        }
    }
}

/// A single hand keypoint
///
/// Coordinates are whatever the detector produces; for the usual detectors
/// `x`/`y` are normalized to the frame (0.0 to 1.0) and `z` is relative
/// depth with the wrist as origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Likelihood of the landmark being visible (not occluded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
    /// Likelihood of the landmark being inside the frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<f32>,
}

impl Landmark {
    /// Create a landmark from coordinates only
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            visibility: None,
            presence: None,
        }
    }
}

/// Most recent observation of one hand
///
/// An empty `landmarks` list is the no-hand marker: the producer ran and
/// saw nothing for this side. It is distinct from the store having no
/// reading at all.
#[derive(Debug, Clone, PartialEq)]
pub struct HandReading {
    pub side: Side,
    pub landmarks: Vec<Landmark>,
    /// When the frame this reading came from was captured
    pub captured_at: Instant,
    /// Producer cycle that produced this reading
    pub sequence: u64,
}

impl HandReading {
    /// Reading for a hand that was detected
    pub fn detected(
        side: Side,
        landmarks: Vec<Landmark>,
        captured_at: Instant,
        sequence: u64,
    ) -> Self {
        Self {
            side,
            landmarks,
            captured_at,
            sequence,
        }
    }

    /// No-hand marker for a side the detector did not see
    pub fn no_hand(side: Side, captured_at: Instant, sequence: u64) -> Self {
        Self {
            side,
            landmarks: Vec::new(),
            captured_at,
            sequence,
        }
    }

    pub fn is_detected(&self) -> bool {
        !self.landmarks.is_empty()
    }

    /// Time since the source frame was captured
    pub fn age(&self) -> Duration {
        self.captured_at.elapsed()
    }
}

/// Detector output for one frame: zero, one, or two hands
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detections {
    slots: [Option<Vec<Landmark>>; 2],
}

impl Detections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record landmarks for a side
    ///
    /// Returns `false` and keeps the existing entry if the side was already
    /// filled.
    pub fn insert(&mut self, side: Side, landmarks: Vec<Landmark>) -> bool {
        let slot = &mut self.slots[side.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(landmarks);
        true
    }

    /// Builder-style [`Detections::insert`]
    pub fn with(mut self, side: Side, landmarks: Vec<Landmark>) -> Self {
        self.insert(side, landmarks);
        self
    }

    pub fn get(&self, side: Side) -> Option<&[Landmark]> {
        self.slots[side.index()].as_deref()
    }

    /// Remove and return the landmarks for a side
    pub fn take(&mut self, side: Side) -> Option<Vec<Landmark>> {
        self.slots[side.index()].take()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Swap left and right
    pub fn mirrored(mut self) -> Self {
        self.slots.swap(0, 1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parse_is_case_insensitive() {
        assert_eq!("Left".parse::<Side>(), Ok(Side::Left));
        assert_eq!("RIGHT".parse::<Side>(), Ok(Side::Right));
        assert!("middle".parse::<Side>().is_err());
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), "\"left\"");
        assert_eq!(Side::Right.to_string(), "right");
    }

    #[test]
    fn test_landmark_omits_missing_scores() {
        let json = serde_json::to_value(Landmark::new(0.1, 0.2, 0.0)).unwrap();
        assert!(json.get("visibility").is_none());

        let parsed: Landmark = serde_json::from_str(r#"{"x":1,"y":2,"z":3,"presence":0.5}"#).unwrap();
        assert_eq!(parsed.presence, Some(0.5));
        assert_eq!(parsed.visibility, None);
    }

    #[test]
    fn test_no_hand_reading_is_not_detected() {
        let reading = HandReading::no_hand(Side::Left, Instant::now(), 3);
        assert!(!reading.is_detected());
        assert_eq!(reading.sequence, 3);
    }

    #[test]
    fn test_detections_keep_first_entry_per_side() {
        let mut detections = Detections::new();
        assert!(detections.insert(Side::Left, vec![Landmark::new(1.0, 0.0, 0.0)]));
        assert!(!detections.insert(Side::Left, vec![Landmark::new(2.0, 0.0, 0.0)]));
        assert_eq!(detections.len(), 1);
        assert_eq!(detections.get(Side::Left).unwrap()[0].x, 1.0);
        assert!(detections.get(Side::Right).is_none());
    }

    #[test]
    fn test_detections_mirrored_swaps_sides() {
        let detections = Detections::new()
            .with(Side::Left, vec![Landmark::new(1.0, 0.0, 0.0)])
            .mirrored();
        assert!(detections.get(Side::Left).is_none());
        assert!(detections.get(Side::Right).is_some());
    }
}
