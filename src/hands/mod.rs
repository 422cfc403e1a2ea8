// SPDX-License-Identifier: GPL-3.0-only

//! Hand detection data model

pub mod types;

pub use types::{Detections, HandReading, Landmark, Side};
