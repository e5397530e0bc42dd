//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Install process-wide resources (metrics recorder, transform)
//! - Bind the listener last, once everything else is ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The transform is built once here and shared by every request

use std::net::SocketAddr;

use metrics_exporter_prometheus::BuildError;
use tokio::net::TcpListener;

use crate::config::validation::validate_config;
use crate::config::{ServiceConfig, ValidationError};
use crate::http::HttpServer;
use crate::observability::metrics::init_metrics;

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    Config(Vec<ValidationError>),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// A bound listener and the server that will serve it.
pub struct Ready {
    pub listener: TcpListener,
    pub server: HttpServer,
}

impl Ready {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Bring the service up to the point of accepting connections.
pub async fn start(config: ServiceConfig) -> Result<Ready, StartupError> {
    validate_config(&config).map_err(StartupError::Config)?;

    if config.observability.metrics_enabled {
        let metrics_address = &config.observability.metrics_address;
        let addr = metrics_address.parse().map_err(|_| {
            StartupError::Config(vec![ValidationError::MetricsAddress(metrics_address.clone())])
        })?;
        init_metrics(addr)?;
    }

    let address = config.listener.bind_address();
    let server = HttpServer::new(config);
    tracing::info!(
        transform = server.config().transform.variant.as_str(),
        route = %server.config().upload_route(),
        field = %server.config().upload_field(),
        max_upload_bytes = ?server.config().upload_limit(),
        "Transform ready"
    );

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    Ok(Ready { listener, server })
}
