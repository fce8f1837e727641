use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, error};

use crate::collab::{GridBounds, ServerSettings};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Grid size shared with clients at registration
    #[serde(default = "default_grid_size")]
    pub grid_rows: u32,
    #[serde(default = "default_grid_size")]
    pub grid_cols: u32,

    /// Upper bound on simultaneously registered clients
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,

    /// Number of peer colors before they repeat
    #[serde(default = "default_palette_size")]
    pub palette_size: usize,

    /// Fixed seed for palette generation (reproducible colors)
    pub palette_seed: Option<u64>,

    /// Messages buffered per client before it counts as stalled
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,

    /// Upper bound on a single socket write
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,

    /// Seconds a registered client has to open its channel, 0 disables expiry
    #[serde(default = "default_registration_timeout_secs")]
    pub registration_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        // Load from environment variables using envy
        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }

    /// Parsed `cors_origins`, empty entries skipped
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Session tunables for the collaboration core
    pub fn server_settings(&self) -> ServerSettings {
        ServerSettings {
            bounds: GridBounds::new(self.grid_rows, self.grid_cols),
            max_clients: self.max_clients,
            outbox_capacity: self.outbox_capacity,
            delivery_timeout: Duration::from_millis(self.delivery_timeout_ms),
            registration_timeout: match self.registration_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            cors_origins: None,
            service_name: default_service_name(),
            grid_rows: default_grid_size(),
            grid_cols: default_grid_size(),
            max_clients: default_max_clients(),
            palette_size: default_palette_size(),
            palette_seed: None,
            outbox_capacity: default_outbox_capacity(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
            registration_timeout_secs: default_registration_timeout_secs(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_service_name() -> String {
    "colabri-sheet".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_grid_size() -> u32 {
    20
}

fn default_max_clients() -> usize {
    256
}

fn default_palette_size() -> usize {
    12
}

fn default_outbox_capacity() -> usize {
    64
}

fn default_delivery_timeout_ms() -> u64 {
    2_000
}

fn default_registration_timeout_secs() -> u64 {
    60
}
