use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;
use vswap_overlay::OverlayConfig;

use crate::error::{ClientError, ClientResult};
use crate::receipt::WaitOptions;
use crate::settings::TradeSettings;

/// Client configuration loaded from a TOML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Level for the vswap crates when `RUST_LOG` is unset
    pub log_level: String,

    /// Slippage, deadline and expert mode
    pub settings: TradeSettings,

    /// Receipt polling
    pub receipt: ReceiptWaitConfig,

    /// Overlay presentation defaults and toast lifetime
    pub overlay: OverlayConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            settings: TradeSettings::default(),
            receipt: ReceiptWaitConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

/// Receipt polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptWaitConfig {
    /// Give up after this many seconds; 0 waits forever
    pub max_wait_secs: u64,

    /// Delay between receipt fetches in seconds
    pub interval_secs: u64,
}

impl Default for ReceiptWaitConfig {
    fn default() -> Self {
        Self {
            max_wait_secs: 60,
            interval_secs: 3,
        }
    }
}

impl ReceiptWaitConfig {
    pub fn options(&self) -> WaitOptions {
        WaitOptions {
            max_wait: Duration::from_secs(self.max_wait_secs),
            interval: Duration::from_secs(self.interval_secs),
        }
    }

    fn validate(&self) -> ClientResult<()> {
        if self.interval_secs == 0 {
            return Err(ClientError::invalid_config("receipt.interval_secs must be greater than 0"));
        }
        if self.max_wait_secs != 0 && self.max_wait_secs < self.interval_secs {
            return Err(ClientError::invalid_config(format!(
                "receipt.max_wait_secs ({}) must be 0 or at least interval_secs ({})",
                self.max_wait_secs, self.interval_secs
            )));
        }
        Ok(())
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded client configuration");
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> ClientResult<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> ClientResult<Self> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ClientResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> ClientResult<()> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ClientError::invalid_config(format!(
                "log_level must be one of trace, debug, info, warn, error; got {:?}",
                self.log_level
            )));
        }
        self.settings.validate()?;
        self.receipt.validate()?;
        Ok(())
    }
}
