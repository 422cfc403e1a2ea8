// SPDX-License-Identifier: GPL-3.0-only

use clap::Parser;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "hand-server")]
#[command(about = "Detects hand landmarks from a camera and serves them over HTTP")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Camera index to capture from (/dev/videoN)
    camera: Option<String>,

    /// Config file (default: ~/.config/hand-server/config.json if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to serve on (e.g. 127.0.0.1:5000)
    #[arg(short, long)]
    bind: Option<String>,

    /// Leave the last reading in place when a hand disappears
    #[arg(long)]
    keep_last: bool,

    /// Swap left and right hand labels
    #[arg(long)]
    mirror: bool,

    /// Detector command and arguments, given after `--`
    #[arg(last = true)]
    detector: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=hand_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,hand_server=info")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let args = Cli::parse();

    let overrides = cli::Overrides {
        camera: args.camera,
        bind: args.bind,
        keep_last: args.keep_last,
        mirror: args.mirror,
        detector: args.detector,
    };

    let config = cli::load_config(args.config.as_deref(), overrides)?;
    cli::run_server(config)
}
