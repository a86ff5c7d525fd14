use serde::{Deserialize, Serialize};

/// Environment variable overriding the configured backend base URL.
pub const BACKEND_URL_ENV: &str = "AUDIT_BACKEND_URL";

/// Top-level application configuration.
///
/// Loaded once at startup and treated as immutable afterwards; the pieces
/// each component needs are injected rather than read ambiently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub tui: TuiConfig,
}

/// Backend contract configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the audit-knowledge backend.
    pub base_url: String,
    /// User identity sent with chat and agent requests.
    /// No authentication exists; this is a plain label.
    pub user: String,
}

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds for the event loop.
    pub tick_rate_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            tui: TuiConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            user: "demo".to_string(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 50 }
    }
}

impl AppConfig {
    /// Load configuration from `~/.config/audit-assistant/config.toml`,
    /// then apply the `AUDIT_BACKEND_URL` environment override.
    /// Returns defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", config_path.display());
                    config
                }
                Err(e) => {
                    log::warn!(
                        "Failed to parse config at {}: {e}, using defaults",
                        config_path.display()
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!(
                    "No config file at {}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                config.backend.base_url = url;
            }
        }

        config
    }

    fn config_path() -> std::path::PathBuf {
        dirs::config_dir()
            .map(|d| d.join("audit-assistant").join("config.toml"))
            .unwrap_or_else(|| std::path::PathBuf::from("config.toml"))
    }
}
