//! Image processing service (v1)
//!
//! Accepts one uploaded file per request, applies the deployment's transform,
//! and returns the result as an attachment.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌───────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ http server ─▶ upload ─▶ transform          │
//!                              │   (request id,    (field,    (flip, thumbnail, │
//!                              │    trace, panic)   ceiling)   passthrough)     │
//!     Client Response          │                                   │          │
//!     ◀────────────────────────┼── attachment / JSON error ◀───────┘          │
//!                              │                                               │
//!                              │  config · lifecycle · observability · security │
//!                              └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use image_processor::config::load_config;
use image_processor::lifecycle::{signals, startup, Shutdown};
use image_processor::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "image-processor")]
#[command(version, about = "Upload-transform-download image service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "IMGPROC_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_logging(&config.observability)?;

    tracing::info!("image-processor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        transform = config.transform.variant.as_str(),
        grace_secs = config.shutdown.grace_secs,
        "Configuration loaded"
    );

    let ready = startup::start(config).await?;
    tracing::info!(address = %ready.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let _signals = signals::spawn_signal_handler(shutdown.clone());

    if let Err(e) = ready.server.run(ready.listener, &shutdown).await {
        tracing::error!(error = %e, "Server forced to shut down");
        return Err(e.into());
    }

    tracing::info!("Server exited cleanly");
    Ok(())
}
