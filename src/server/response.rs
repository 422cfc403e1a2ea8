// SPDX-License-Identifier: GPL-3.0-only

//! JSON bodies returned by the HTTP endpoints

use crate::hands::{HandReading, Landmark, Side};
use crate::store::HandsSnapshot;
use serde::{Deserialize, Serialize};

/// Body for a side that has a reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandResponse {
    pub side: Side,
    /// `false` for the no-hand marker
    pub detected: bool,
    /// Producer cycle that produced the reading
    pub sequence: u64,
    /// Milliseconds since the source frame was captured
    pub age_ms: u64,
    pub landmarks: Vec<Landmark>,
}

impl From<&HandReading> for HandResponse {
    fn from(reading: &HandReading) -> Self {
        Self {
            side: reading.side,
            detected: reading.is_detected(),
            sequence: reading.sequence,
            age_ms: reading.age().as_millis() as u64,
            landmarks: reading.landmarks.clone(),
        }
    }
}

/// Body for a side that was never published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoReadingResponse {
    pub side: Side,
    pub error: String,
}

impl NoReadingResponse {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            error: "no reading available".to_string(),
        }
    }
}

/// Body for `/hands`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandsResponse {
    /// Wall-clock time the response was built (RFC 3339)
    pub generated_at: String,
    pub left: Option<HandResponse>,
    pub right: Option<HandResponse>,
}

impl From<&HandsSnapshot> for HandsResponse {
    fn from(snapshot: &HandsSnapshot) -> Self {
        Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            left: snapshot.left.as_deref().map(HandResponse::from),
            right: snapshot.right.as_deref().map(HandResponse::from),
        }
    }
}
