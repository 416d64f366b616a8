//! Log output setup for binaries and tests embedding the client

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Install a global fmt subscriber. `RUST_LOG` wins over the configured
/// level, which applies to the vswap crates only.
pub fn init_tracing(config: &ClientConfig) -> ClientResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(&config.log_level)))
        .map_err(|e| ClientError::Telemetry(e.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| ClientError::Telemetry(e.to_string()))
}

fn default_directives(log_level: &str) -> String {
    format!("vswap_client={log_level},vswap_overlay={log_level},vswap_math={log_level}")
}
