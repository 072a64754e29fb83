//! Service configuration

use anyhow::Context;
use std::path::PathBuf;
use std::time::Duration;

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

/// How long a record lives before it is eligible for removal
pub const RECORD_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

/// Period of the background sweep
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Records closer than this to expiry are reported as "expiring soon"
pub const EXPIRING_SOON: Duration = Duration::from_secs(30 * 60);

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind the HTTP server to
    pub host: String,
    /// Port to bind the HTTP server to
    pub port: u16,
    /// Path to the JSON data file
    pub data_file: PathBuf,
    /// Record time-to-live
    pub record_lifetime: Duration,
    /// Interval between periodic sweeps
    pub sweep_interval: Duration,
    /// Window for the "expiring soon" statistic
    pub expiring_soon: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            data_file: PathBuf::from("data.json"),
            record_lifetime: RECORD_LIFETIME,
            sweep_interval: SWEEP_INTERVAL,
            expiring_soon: EXPIRING_SOON,
        }
    }
}

impl Config {
    /// Build the configuration from environment variables
    ///
    /// `PORT`, `BUILDVAULT_HOST` and `BUILDVAULT_DATA_FILE` override the
    /// defaults. Lifetimes and intervals are fixed.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value '{}'", port))?;
        }

        if let Some(host) = lookup("BUILDVAULT_HOST") {
            config.host = host;
        }

        if let Some(path) = lookup("BUILDVAULT_DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }

        Ok(config)
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
