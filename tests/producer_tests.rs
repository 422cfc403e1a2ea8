// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the producer cycle

use hand_server::capture::{Frame, FrameSource};
use hand_server::config::DetectorConfig;
use hand_server::detect::{HandDetector, SidecarDetector};
use hand_server::producer::CycleOutcome;
use hand_server::{
    AppError, CaptureError, DetectError, Detections, HandStore, Landmark, MissPolicy, Producer,
    ProducerOptions, Side,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Frame source that replays a fixed script of results
struct ScriptedSource {
    script: VecDeque<Result<(), CaptureError>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<(), CaptureError>>) -> Self {
        Self {
            script: script.into(),
        }
    }

    fn always_ok(count: usize) -> Self {
        Self::new((0..count).map(|_| Ok(())).collect())
    }
}

impl FrameSource for ScriptedSource {
    fn capture_frame(&mut self) -> Result<Frame, CaptureError> {
        match self.script.pop_front() {
            Some(Ok(())) => Ok(Frame::from_rgb(2, 2, vec![0; 12])),
            Some(Err(e)) => Err(e),
            None => Err(CaptureError::Disconnected("script exhausted".to_string())),
        }
    }
}

/// Detector that replays a fixed script of detections
struct ScriptedDetector {
    script: VecDeque<Result<Detections, DetectError>>,
}

impl ScriptedDetector {
    fn new(script: Vec<Result<Detections, DetectError>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl HandDetector for ScriptedDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Detections, DetectError> {
        self.script.pop_front().unwrap_or_else(|| Ok(Detections::new()))
    }
}

fn hand(marker: f32) -> Vec<Landmark> {
    vec![Landmark::new(marker, marker, 0.0); 21]
}

fn options(miss_policy: MissPolicy) -> ProducerOptions {
    ProducerOptions {
        miss_policy,
        retry_delay: Duration::ZERO,
        ..ProducerOptions::default()
    }
}

#[test]
fn test_cycle_publishes_detected_hands() {
    let store = HandStore::shared();
    let detector = ScriptedDetector::new(vec![Ok(Detections::new()
        .with(Side::Left, hand(0.1))
        .with(Side::Right, hand(0.9)))]);
    let mut producer = Producer::new(
        ScriptedSource::always_ok(1),
        detector,
        Arc::clone(&store),
        options(MissPolicy::Clear),
    );

    let outcome = producer.run_cycle().unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Published {
            detected: 2,
            published: 2
        }
    );
    assert_eq!(store.read(Side::Left).unwrap().landmarks, hand(0.1));
    assert_eq!(store.read(Side::Right).unwrap().landmarks, hand(0.9));
    assert_eq!(store.read(Side::Left).unwrap().sequence, 1);
}

#[test]
fn test_clear_policy_overwrites_missed_side() {
    let store = HandStore::shared();
    let detector = ScriptedDetector::new(vec![
        Ok(Detections::new().with(Side::Left, hand(0.1))),
        Ok(Detections::new()),
    ]);
    let mut producer = Producer::new(
        ScriptedSource::always_ok(2),
        detector,
        Arc::clone(&store),
        options(MissPolicy::Clear),
    );

    producer.run_cycle().unwrap();
    let outcome = producer.run_cycle().unwrap();

    assert_eq!(
        outcome,
        CycleOutcome::Published {
            detected: 0,
            published: 2
        }
    );
    let left = store.read(Side::Left).unwrap();
    assert!(!left.is_detected());
    assert_eq!(left.sequence, 2);
}

#[test]
fn test_keep_last_policy_leaves_stale_reading() {
    let store = HandStore::shared();
    let detector = ScriptedDetector::new(vec![
        Ok(Detections::new().with(Side::Left, hand(0.1))),
        Ok(Detections::new()),
    ]);
    let mut producer = Producer::new(
        ScriptedSource::always_ok(2),
        detector,
        Arc::clone(&store),
        options(MissPolicy::KeepLast),
    );

    producer.run_cycle().unwrap();
    producer.run_cycle().unwrap();

    let left = store.read(Side::Left).unwrap();
    assert!(left.is_detected());
    assert_eq!(left.sequence, 1);
    // Never detected and never cleared
    assert!(store.read(Side::Right).is_none());
}

#[test]
fn test_detector_failure_skips_cycle() {
    let store = HandStore::shared();
    let detector = ScriptedDetector::new(vec![
        Ok(Detections::new().with(Side::Right, hand(0.5))),
        Err(DetectError::Protocol("garbled".to_string())),
    ]);
    let mut producer = Producer::new(
        ScriptedSource::always_ok(2),
        detector,
        Arc::clone(&store),
        options(MissPolicy::Clear),
    );

    producer.run_cycle().unwrap();
    assert_eq!(producer.run_cycle().unwrap(), CycleOutcome::DetectFailed);

    assert!(store.read(Side::Right).unwrap().is_detected());
    assert_eq!(store.publish_count(), 2);
    assert_eq!(producer.stats().detect_failures, 1);
}

#[test]
fn test_detector_protocol_errors_do_not_stop_producer() {
    let store = HandStore::shared();
    let detector = ScriptedDetector::new(
        (0..10)
            .map(|_| Err(DetectError::Protocol("garbled".to_string())))
            .collect(),
    );
    let mut producer = Producer::new(
        ScriptedSource::always_ok(11),
        detector,
        Arc::clone(&store),
        options(MissPolicy::Clear),
    );

    for _ in 0..10 {
        assert_eq!(producer.run_cycle().unwrap(), CycleOutcome::DetectFailed);
    }
    assert!(matches!(
        producer.run_cycle().unwrap(),
        CycleOutcome::Published { .. }
    ));
}

#[test]
fn test_detector_that_is_gone_stops_producer() {
    let store = HandStore::shared();
    let detector = ScriptedDetector::new(vec![
        Ok(Detections::new().with(Side::Left, hand(0.2))),
        Err(DetectError::Exited(Some(1))),
    ]);
    let mut producer = Producer::new(
        ScriptedSource::always_ok(2),
        detector,
        Arc::clone(&store),
        options(MissPolicy::Clear),
    );

    producer.run_cycle().unwrap();
    assert!(matches!(
        producer.run_cycle(),
        Err(AppError::Detect(DetectError::Exited(Some(1))))
    ));
    // The last good reading stays readable
    assert!(store.read(Side::Left).unwrap().is_detected());
}

#[cfg(unix)]
#[test]
fn test_sidecar_that_exits_immediately_stops_producer() {
    let config = DetectorConfig {
        command: vec!["true".to_string()],
        ..DetectorConfig::default()
    };
    let detector = SidecarDetector::spawn(&config).unwrap();
    let mut producer = Producer::new(
        ScriptedSource::always_ok(1000),
        detector,
        HandStore::shared(),
        options(MissPolicy::Clear),
    );

    let mut cycles = 0;
    let result = loop {
        cycles += 1;
        match producer.run_cycle() {
            Ok(outcome) => assert!(cycles < 1000, "still running: {:?}", outcome),
            Err(e) => break e,
        }
    };

    assert_eq!(cycles, 1);
    assert!(matches!(
        result,
        AppError::Detect(DetectError::Exited(_) | DetectError::Io(_))
    ));
}

#[test]
fn test_capture_retries_then_gives_up() {
    let store = HandStore::shared();
    let source = ScriptedSource::new(vec![
        Err(CaptureError::Busy),
        Ok(()),
        Err(CaptureError::Busy),
        Err(CaptureError::Busy),
        Err(CaptureError::Busy),
    ]);
    let mut producer = Producer::new(
        source,
        ScriptedDetector::new(Vec::new()),
        Arc::clone(&store),
        ProducerOptions {
            capture_retries: 2,
            ..options(MissPolicy::Clear)
        },
    );

    assert_eq!(
        producer.run_cycle().unwrap(),
        CycleOutcome::CaptureRetry { attempt: 1 }
    );
    // A good frame resets the failure count
    assert!(matches!(
        producer.run_cycle().unwrap(),
        CycleOutcome::Published { .. }
    ));
    assert_eq!(
        producer.run_cycle().unwrap(),
        CycleOutcome::CaptureRetry { attempt: 1 }
    );
    assert_eq!(
        producer.run_cycle().unwrap(),
        CycleOutcome::CaptureRetry { attempt: 2 }
    );
    assert!(matches!(
        producer.run_cycle(),
        Err(AppError::Capture(CaptureError::Busy))
    ));
    assert_eq!(producer.stats().capture_failures, 4);
}

#[test]
fn test_mirror_handedness_swaps_sides() {
    let store = HandStore::shared();
    let detector = ScriptedDetector::new(vec![Ok(Detections::new().with(Side::Left, hand(0.3)))]);
    let mut producer = Producer::new(
        ScriptedSource::always_ok(1),
        detector,
        Arc::clone(&store),
        ProducerOptions {
            mirror_handedness: true,
            ..options(MissPolicy::KeepLast)
        },
    );

    producer.run_cycle().unwrap();

    assert!(store.read(Side::Left).is_none());
    let right = store.read(Side::Right).unwrap();
    assert_eq!(right.side, Side::Right);
    assert_eq!(right.landmarks, hand(0.3));
}
