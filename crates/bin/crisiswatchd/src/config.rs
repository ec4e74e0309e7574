//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `crisiswatch.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

use crisiswatch_adapter_backend_http::BackendConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Crisis backend settings.
    pub backend: BackendSection,
    /// Periodic scan settings.
    pub scanner: ScannerConfig,
    /// Workflow runner settings.
    pub runner: RunnerSection,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Which collaborators handle detection, dispatch and compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// Remote crisis backend over HTTP.
    Http,
    /// In-process demo inbox and outbox.
    #[default]
    Virtual,
}

impl std::str::FromStr for BackendMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown backend mode {other:?}"
            ))),
        }
    }
}

/// Backend selection plus the HTTP client settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub mode: BackendMode,
    #[serde(flatten)]
    pub http: BackendConfig,
}

/// Periodic scan schedule.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Start the timer at boot.
    pub enabled: bool,
    pub interval_secs: u64,
    /// Wait before the first background scan.
    pub initial_delay_secs: u64,
}

/// Workflow runner tuning.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerSection {
    /// Multiple of a step's estimate after which it times out.
    pub step_timeout_factor: u32,
    /// Percentage of the estimate the simulated steps wait for.
    pub step_pace_percent: u32,
    /// Log entries included in session snapshots by default.
    pub log_tail: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `crisiswatch.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("crisiswatch.toml")?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("CRISISWATCH_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("CRISISWATCH_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Ok(val) = std::env::var("CRISISWATCH_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("CRISISWATCH_BACKEND_MODE") {
            self.backend.mode = val.parse()?;
        }
        if let Ok(val) = std::env::var("CRISISWATCH_BACKEND_URL") {
            self.backend.http.base_url = val;
        }
        if let Ok(val) = std::env::var("CRISISWATCH_SCAN_INTERVAL")
            && let Ok(secs) = val.parse()
        {
            self.scanner.interval_secs = secs;
        }
        if let Ok(val) = std::env::var("CRISISWATCH_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scanner.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "scanner interval must be at least one second".to_string(),
            ));
        }
        if self.runner.step_timeout_factor == 0 {
            return Err(ConfigError::Validation(
                "step timeout factor must be non-zero".to_string(),
            ));
        }
        if self.backend.mode == BackendMode::Http && self.backend.http.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "backend base_url is required in http mode".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
            initial_delay_secs: 5,
        }
    }
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            step_timeout_factor: 4,
            step_pace_percent: 100,
            log_tail: 200,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "crisiswatchd=info,crisiswatch=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
