// SPDX-License-Identifier: GPL-3.0-only

//! Startup wiring for the server binary
//!
//! Resolves the configuration, starts the producer thread, and runs the
//! HTTP server until Ctrl-C.

use hand_server::capture::V4l2Source;
use hand_server::constants::{DEFAULT_CAMERA_ID, MissPolicy, PRODUCER_THREAD_NAME};
use hand_server::detect::SidecarDetector;
use hand_server::errors::{AppError, ConfigError};
use hand_server::{Config, HandStore, Producer, ProducerHandle, server};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Command-line values that take precedence over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub camera: Option<String>,
    pub bind: Option<String>,
    pub keep_last: bool,
    pub mirror: bool,
    pub detector: Vec<String>,
}

/// Load the config file (if any) and apply command-line overrides
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<Config, ConfigError> {
    let mut config = Config::load_or_default(path)?;
    apply_overrides(&mut config, overrides);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, overrides: Overrides) {
    if let Some(camera) = overrides.camera {
        config.camera_id = match camera.trim().parse::<u32>() {
            Ok(id) => id,
            Err(_) => {
                warn!(value = %camera, "Invalid camera ID passed, using default");
                DEFAULT_CAMERA_ID
            }
        };
    }
    if let Some(bind) = overrides.bind {
        config.bind_addr = bind;
    }
    if overrides.keep_last {
        config.producer.miss_policy = MissPolicy::KeepLast;
    }
    if overrides.mirror {
        config.producer.mirror_handedness = true;
    }
    if !overrides.detector.is_empty() {
        config.detector.command = overrides.detector;
    }
}

/// Run the producer and the HTTP server until Ctrl-C
pub fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    if config.detector.command.is_empty() {
        return Err(
            "No detector command configured; pass one after `--` or set detector.command".into(),
        );
    }

    let addr = config.socket_addr()?;
    let settings = config.capture.settings()?;
    let store = HandStore::shared();

    info!(
        version = env!("GIT_VERSION"),
        camera = config.camera_id,
        %addr,
        miss_policy = config.producer.miss_policy.display_name(),
        mirror = config.producer.mirror_handedness,
        "Starting hand server"
    );

    let producer_store = Arc::clone(&store);
    let detector_config = config.detector.clone();
    let options = config.producer.options();
    let camera_id = config.camera_id as usize;

    let mut producer = ProducerHandle::start_with_init(PRODUCER_THREAD_NAME, move || {
        let source = V4l2Source::open(camera_id, settings)?;
        let detector = SidecarDetector::spawn(&detector_config)?;
        Ok(Producer::new(source, detector, producer_store, options))
    })?;

    let rt = tokio::runtime::Runtime::new()?;
    let served = rt.block_on(async {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Server(format!("failed to bind {}: {}", addr, e)))?;
        server::serve(listener, store, shutdown_signal()).await
    });

    match producer.stop() {
        Ok(stats) => info!(
            cycles = stats.cycles,
            capture_failures = stats.capture_failures,
            detect_failures = stats.detect_failures,
            "Producer stopped"
        ),
        // Already logged by the producer thread when it ended
        Err(e) => warn!(error = %e, "Producer had ended with an error"),
    }

    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
