use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// State backend configuration
    pub state: StateConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// External provider configuration
    pub providers: ProvidersConfig,

    /// Training configuration
    pub training: TrainingConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: SAFEROAD_)
            .add_source(
                config::Environment::with_prefix("SAFEROAD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// State backend type
    #[serde(default)]
    pub backend: StateBackend,

    /// Path for the embedded database (sled)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StateBackend {
    Memory,
    #[default]
    Sled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding the HS256 signing secret
    #[serde(default = "default_jwt_secret_env")]
    pub jwt_secret_env: String,

    /// Development fallback secret, used only when the env var is unset
    pub dev_secret: Option<String>,
}

impl AuthConfig {
    /// Resolve the JWT secret from the environment, falling back to the
    /// configured development secret.
    pub fn jwt_secret(&self) -> Option<String> {
        std::env::var(&self.jwt_secret_env)
            .ok()
            .or_else(|| self.dev_secret.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub weather: ProviderConfig,
    pub traffic: ProviderConfig,
    pub incidents: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider endpoint
    pub base_url: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// HTTP timeout (seconds)
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Minimum record count required to train
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,

    /// Held-out fraction for accuracy reporting
    #[serde(default = "default_test_split")]
    pub test_split: f64,

    /// Seed for the split and the forest
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of trees in the forest
    #[serde(default = "default_n_trees")]
    pub n_trees: u16,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
            test_split: default_test_split(),
            seed: default_seed(),
            n_trees: default_n_trees(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON logs
    #[serde(default)]
    pub json_logs: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_jwt_secret_env() -> String {
    "SAFEROAD_JWT_SECRET".to_string()
}

fn default_provider_timeout() -> u64 {
    10
}

fn default_min_samples() -> usize {
    30
}

fn default_test_split() -> f64 {
    0.25
}

fn default_seed() -> u64 {
    42
}

fn default_n_trees() -> u16 {
    200
}

fn default_log_level() -> String {
    "info".to_string()
}
