//! Configuration loading.
//!
//! The configuration is a JSON file, optionally overridden by environment
//! variables prefixed with `FIREHOSE2INFLUXDB_` (nested keys joined with
//! `__`, e.g. `FIREHOSE2INFLUXDB_INFLUX__PASSWORD`).
//!
//! ```json
//! {
//!   "influx": {
//!     "url": "https://influx.example.com:8086",
//!     "user": "admin",
//!     "password": "secret",
//!     "database": "metrics"
//!   },
//!   "firehose": { "address": "doppler.example.com:4443" },
//!   "bolo": { "address": "bolo.example.com:2997" },
//!   "skip_ssl_validation": true
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use config::{Environment, File, FileFormat};
use serde::Deserialize;

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "firehose2influxdb.conf";

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "FIREHOSE2INFLUXDB";

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    /// InfluxDB connection settings.
    #[serde(default)]
    pub influx: InfluxConfig,

    /// Bolo aggregator to read PDUs from.
    #[serde(default)]
    pub bolo: Option<SourceConfig>,

    /// Firehose endpoint to read envelopes from.
    #[serde(default)]
    pub firehose: Option<SourceConfig>,

    /// Where points are written.
    #[serde(default)]
    pub output: OutputKind,

    /// Disable TLS certificate verification for every outbound connection.
    #[serde(default)]
    pub skip_ssl_validation: bool,

    /// Capacity of each source's message and error channels.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

/// InfluxDB connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    pub url: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub insecure_skip_verify: bool,
}

/// Address of a source to connect to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    /// `host:port` of the endpoint.
    pub address: String,
}

/// Destination for translated points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Influx,
    Stdout,
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

/// `FIREHOSE2INFLUXDB_INFLUX__URL` overrides `influx.url`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
}

impl Config {
    /// Load the configuration from a JSON file and the environment.
    ///
    /// Fails if the file does not exist or is not valid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: &Path, env: Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(File::from(path).format(FileFormat::Json))
            .add_source(env)
            .build()
            .with_context(|| format!("Unable to load config file {}", path.display()))?;

        let mut cfg: Config = settings
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        cfg.apply_overrides();
        Ok(cfg)
    }

    fn apply_overrides(&mut self) {
        if self.skip_ssl_validation {
            self.influx.insecure_skip_verify = true;
        }
    }
}
