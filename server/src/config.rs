//! Configuration for the API server
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then `HAZARD_`-prefixed environment variables (nested keys use `__`,
//! e.g. `HAZARD_CORE__VALIDATION__MAX_LOCATION_LEN`). Command-line flags
//! are applied on top by the binary.

use std::net::SocketAddr;

use config::{Config, Environment, File};
use hazard_report_core::CoreConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on
    pub host: String,

    /// TCP port to listen on
    pub port: u16,

    /// Largest accepted request body in bytes
    pub max_body_bytes: usize,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Allow cross-origin requests from any origin
    pub cors_permissive: bool,

    /// Core settings (validation limits)
    pub core: CoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            // 20 MiB photo, base64 encoded, plus the rest of the JSON body
            max_body_bytes: 28 * 1024 * 1024,
            log_level: "info".to_string(),
            cors_permissive: false,
            core: CoreConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("HAZARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(ServerError::from)
    }

    /// Create a configuration for local development
    pub fn for_development() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            log_level: "debug".to_string(),
            cors_permissive: true,
            ..Default::default()
        }
    }

    /// Create a configuration for testing
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_body_bytes: 256 * 1024,
            log_level: "debug".to_string(),
            core: CoreConfig::testing(),
            ..Default::default()
        }
    }
}
