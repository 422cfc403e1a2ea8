// SPDX-License-Identifier: GPL-3.0-only
//! Thread lifecycle management for the producer loop
//!
//! The producer runs on its own OS thread because frame capture and
//! detection both block. The handle owns the thread, a stop flag, and the
//! detector's interrupter once the thread has published it. Stopping sets
//! the flag and then interrupts the detector, so a cycle stuck waiting on
//! the detector ends right away.

use super::{Producer, ProducerStats};
use crate::capture::FrameSource;
use crate::detect::{HandDetector, Interrupt};
use crate::errors::{AppError, AppResult};
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Handle to a running producer loop
///
/// # Example
///
/// ```ignore
/// let store = HandStore::shared();
/// let mut handle = ProducerHandle::start_with_init("hand-producer", move || {
///     let source = V4l2Source::open(0, settings)?;
///     let detector = SidecarDetector::spawn(&detector_config)?;
///     Ok(Producer::new(source, detector, store, options))
/// })?;
///
/// // Later, stop the loop
/// let stats = handle.stop()?;
/// ```
pub struct ProducerHandle {
    /// Thread handle for joining
    thread_handle: Option<JoinHandle<AppResult<ProducerStats>>>,
    /// Signal to stop the loop
    stop_signal: Arc<AtomicBool>,
    /// Set by the thread after init when the detector can be interrupted
    interrupter: Arc<Mutex<Option<Arc<dyn Interrupt>>>>,
    /// Name for logging
    name: String,
}

impl ProducerHandle {
    /// Run an already built producer on a new thread
    pub fn start<S, D>(name: &str, producer: Producer<S, D>) -> AppResult<Self>
    where
        S: FrameSource + Send + 'static,
        D: HandDetector + Send + 'static,
    {
        Self::start_with_init(name, move || Ok(producer))
    }

    /// Build the producer on the new thread, then run it
    ///
    /// Device handles and child processes are created by `init_fn` on the
    /// producer thread itself, so they never have to cross threads. If
    /// initialization fails the thread exits and [`ProducerHandle::join`]
    /// returns the error.
    pub fn start_with_init<S, D, I>(name: &str, init_fn: I) -> AppResult<Self>
    where
        S: FrameSource + 'static,
        D: HandDetector + 'static,
        I: FnOnce() -> AppResult<Producer<S, D>> + Send + 'static,
    {
        let stop_signal = Arc::new(AtomicBool::new(false));
        let stop_signal_clone = Arc::clone(&stop_signal);
        let interrupter: Arc<Mutex<Option<Arc<dyn Interrupt>>>> = Arc::new(Mutex::new(None));
        let interrupter_clone = Arc::clone(&interrupter);
        let name_clone = name.to_string();

        info!(name = %name, "Starting producer loop");

        let thread_handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(name = %name_clone, "Producer thread started, initializing...");

                let mut producer = match init_fn() {
                    Ok(p) => p,
                    Err(e) => {
                        error!(name = %name_clone, error = %e, "Producer initialization failed");
                        return Err(e);
                    }
                };

                // Published before the first stop check, so a stop requested
                // from here on either sees the interrupter or is seen by the loop
                *interrupter_clone
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = producer.interrupter();

                loop {
                    if stop_signal_clone.load(Ordering::SeqCst) {
                        debug!(name = %name_clone, "Stop signal received");
                        break;
                    }

                    if let Err(e) = producer.run_cycle() {
                        let stats = producer.stats();
                        if stop_signal_clone.load(Ordering::SeqCst) {
                            debug!(name = %name_clone, error = %e, "Cycle interrupted by stop");
                            return Ok(stats);
                        }
                        error!(
                            name = %name_clone,
                            error = %e,
                            cycles = stats.cycles,
                            "Producer loop stopped; readers keep the last published hands"
                        );
                        return Err(e);
                    }
                }

                let stats = producer.stats();
                info!(
                    name = %name_clone,
                    cycles = stats.cycles,
                    publishes = stats.publishes,
                    "Producer thread exiting"
                );
                Ok(stats)
            })
            .map_err(|e| AppError::Other(format!("failed to spawn producer thread: {}", e)))?;

        Ok(Self {
            thread_handle: Some(thread_handle),
            stop_signal,
            interrupter,
            name: name.to_string(),
        })
    }

    /// Check if the loop is still running
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    /// Signal the loop to stop (non-blocking)
    ///
    /// The loop checks the flag between cycles. A detector call in progress
    /// is interrupted; a cycle blocked on the device finishes first.
    pub fn request_stop(&self) {
        debug!(name = %self.name, "Requesting producer stop");
        self.stop_signal.store(true, Ordering::SeqCst);

        let interrupter = self
            .interrupter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(interrupter) = interrupter {
            interrupter.interrupt();
        }
    }

    /// Stop the loop and wait for the thread to finish
    pub fn stop(&mut self) -> AppResult<ProducerStats> {
        self.request_stop();
        self.join()
    }

    /// Wait for the thread to finish without sending the stop signal
    ///
    /// Returns the stats on a clean stop, or the error that ended the loop.
    pub fn join(&mut self) -> AppResult<ProducerStats> {
        let handle = self.thread_handle.take().ok_or_else(|| {
            AppError::Other(format!("producer '{}' was already joined", self.name))
        })?;

        debug!(name = %self.name, "Waiting for producer thread to finish");
        match handle.join() {
            Ok(result) => result,
            Err(e) => {
                warn!(name = %self.name, "Producer thread panicked: {:?}", e);
                Err(AppError::Other(format!("producer '{}' panicked", self.name)))
            }
        }
    }
}

impl Drop for ProducerHandle {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            debug!(name = %self.name, "ProducerHandle dropped, stopping loop");
            let _ = self.stop();
        }
    }
}
