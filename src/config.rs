use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Session secret shipped in `config/default.toml`. Running with it means
/// anyone can forge session cookies.
pub const INSECURE_DEFAULT_SECRET: &str = "your-secret-key-here";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Model artifact configuration
    pub model: ModelConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the embedded defaults, an optional file and the environment.
    ///
    /// `config_path` takes precedence over `CONFIG_PATH`. `PORT` and `SECRET_KEY`
    /// override everything else.
    pub fn load(config_path: Option<&str>) -> Result<Self, config::ConfigError> {
        let config_path = config_path
            .map(str::to_string)
            .or_else(|| std::env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/local.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: TSS__)
            .add_source(
                config::Environment::with_prefix("TSS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("session.secret_key", std::env::var("SECRET_KEY").ok())?
            .build()?
            .try_deserialize()
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Serialized classifier loaded once at startup
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Key used to sign session cookies
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    /// Session cookie name
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Sessions untouched for this long are dropped (seconds)
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Upper bound on sessions held in memory
    #[serde(default = "default_max_sessions")]
    pub max_sessions: u64,
}

impl SessionConfig {
    pub fn uses_insecure_secret(&self) -> bool {
        self.secret_key == INSECURE_DEFAULT_SECRET || self.secret_key.is_empty()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            cookie_name: default_cookie_name(),
            idle_timeout_secs: default_idle_timeout(),
            max_sessions: default_max_sessions(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/satisfaction_model.json")
}

fn default_secret_key() -> String {
    INSECURE_DEFAULT_SECRET.to_string()
}

fn default_cookie_name() -> String {
    "survey_session".to_string()
}

fn default_idle_timeout() -> u64 {
    86_400 // 24 hours
}

fn default_max_sessions() -> u64 {
    100_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
