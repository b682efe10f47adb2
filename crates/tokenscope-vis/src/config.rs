//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokenscope_cascade::{Brand, ColorMode, SchedulerConfig, TokenSet, FRAME_INTERVAL};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Configuration for the visualization server.
#[derive(Debug, Clone)]
pub struct VisConfig {
    /// HTTP listen address
    pub addr: SocketAddr,

    /// Initial color mode
    pub mode: ColorMode,

    /// Initial brand
    pub brand: Brand,

    /// Counter frame interval
    pub frame_interval: Duration,

    /// Cascade timing
    pub scheduler: SchedulerConfig,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            mode: ColorMode::default(),
            brand: Brand::default(),
            frame_interval: FRAME_INTERVAL,
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl VisConfig {
    /// Create config from environment variables with defaults.
    ///
    /// - `TOKENSCOPE_ADDR` (default `0.0.0.0:3000`)
    /// - `TOKENSCOPE_MODE` (`light` | `dark`)
    /// - `TOKENSCOPE_BRAND` (`indigo` | `ember`)
    /// - `TOKENSCOPE_FRAME_MS` (default 16)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`VisConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("TOKENSCOPE_ADDR") {
            config.addr = addr.parse().map_err(|e| invalid("TOKENSCOPE_ADDR", e))?;
        }
        if let Some(mode) = lookup("TOKENSCOPE_MODE") {
            config.mode = mode.parse().map_err(|e| invalid("TOKENSCOPE_MODE", e))?;
        }
        if let Some(brand) = lookup("TOKENSCOPE_BRAND") {
            config.brand = brand.parse().map_err(|e| invalid("TOKENSCOPE_BRAND", e))?;
        }
        if let Some(ms) = lookup("TOKENSCOPE_FRAME_MS") {
            let ms: u64 = ms.parse().map_err(|e| invalid("TOKENSCOPE_FRAME_MS", e))?;
            if ms == 0 {
                return Err(invalid("TOKENSCOPE_FRAME_MS", "must be positive"));
            }
            config.frame_interval = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Override the listen port, keeping the host.
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    /// Token set for the configured mode and brand.
    pub fn tokens(&self) -> TokenSet {
        TokenSet::resolve(self.mode, self.brand)
    }
}

fn invalid(var: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}
