// SPDX-License-Identifier: GPL-3.0-only

//! Hand Server - serves the latest hand landmarks from a camera over HTTP
//!
//! A producer thread captures frames, hands them to an external landmark
//! detector, and publishes the newest reading per hand into a latest-value
//! store. HTTP handlers read that store without ever waiting on the
//! producer.
//!
//! # Architecture
//!
//! - [`capture`]: frame sources (V4L2) and pixel format conversion
//! - [`detect`]: the detector trait and the sidecar process detector
//! - [`producer`]: the capture → detect → publish loop and its thread
//! - [`store`]: the per-side latest-value store
//! - [`server`]: axum router and response bodies
//! - [`config`]: JSON configuration with defaults
//!
//! # Example
//!
//! ```
//! use hand_server::{HandReading, HandStore, Landmark, Side};
//! use std::time::Instant;
//!
//! let store = HandStore::shared();
//! assert!(store.read(Side::Left).is_none());
//!
//! let landmarks = vec![Landmark::new(0.1, 0.2, 0.0); 21];
//! store.publish(Side::Left, HandReading::detected(Side::Left, landmarks, Instant::now(), 1));
//! assert_eq!(store.read(Side::Left).unwrap().landmarks.len(), 21);
//! ```

pub mod capture;
pub mod config;
pub mod constants;
pub mod detect;
pub mod errors;
pub mod hands;
pub mod producer;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use constants::MissPolicy;
pub use errors::{AppError, AppResult, CaptureError, DetectError};
pub use hands::{Detections, HandReading, Landmark, Side};
pub use producer::{Producer, ProducerHandle, ProducerOptions};
pub use store::{HandStore, SharedHandStore};
