//! # Server Configuration
//!
//! Resolution of the HTTP server settings from an optional `formfold.toml`
//! file with `FORMFOLD_*` environment overrides on top.
//!
//! Precedence, lowest to highest: built-in defaults, the TOML file, the
//! environment. The API key is deliberately NOT part of the file - secrets
//! stay in the environment (`FORMFOLD_API_KEY`, read by the auth layer).
//!
//! ```toml
//! # formfold.toml
//! host = "127.0.0.1"
//! port = 8080
//! cors_origins = "https://builder.example.org"
//! rate_limit = 100
//! ```

use formfold_core::FormError;
use serde::Deserialize;
use std::path::Path;

/// Default config file name probed in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "formfold.toml";

/// Resolved server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Allowed CORS origins: unset = localhost only, `"*"` = permissive,
    /// otherwise a comma-separated list.
    pub cors_origins: Option<String>,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: None,
            rate_limit: 100,
        }
    }
}

impl ServerConfig {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist and parse; with none, the
    /// default file is used when present and silently skipped otherwise.
    /// Environment overrides are applied last either way.
    pub fn load(path: Option<&Path>) -> Result<Self, FormError> {
        let mut config = match path {
            Some(explicit) => Self::from_file(explicit)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML config file.
    fn from_file(path: &Path) -> Result<Self, FormError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FormError::IoError(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        toml::from_str(&raw).map_err(|e| {
            FormError::InvalidDefinition(format!("config '{}': {}", path.display(), e))
        })
    }

    /// Apply `FORMFOLD_*` environment overrides.
    fn apply_env(&mut self) {
        if let Ok(host) = std::env::var("FORMFOLD_HOST") {
            if !host.is_empty() {
                self.host = host;
            }
        }
        if let Ok(port) = std::env::var("FORMFOLD_PORT") {
            if let Ok(port) = port.parse() {
                self.port = port;
            } else {
                tracing::warn!("FORMFOLD_PORT is not a valid port number, keeping {}", self.port);
            }
        }
        if let Ok(origins) = std::env::var("FORMFOLD_CORS_ORIGINS") {
            if !origins.is_empty() {
                self.cors_origins = Some(origins);
            }
        }
        if let Ok(limit) = std::env::var("FORMFOLD_RATE_LIMIT") {
            if let Ok(limit) = limit.parse() {
                self.rate_limit = limit;
            } else {
                tracing::warn!(
                    "FORMFOLD_RATE_LIMIT is not a valid number, keeping {}",
                    self.rate_limit
                );
            }
        }
    }

    /// The socket address string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================
