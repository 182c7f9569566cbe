use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Pool size; bounds concurrent ingests.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// How long a request waits for a pooled connection before failing.
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory served as the web root; uploads land in `{public_root}/uploads/*`.
    #[serde(default = "default_public_root")]
    pub public_root: PathBuf,
    /// Maximum size of a single uploaded file in bytes. Default: 10 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            public_root: default_public_root(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// How price and rating fields are turned into numbers.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NumericPolicy {
    /// Strip currency symbols and separators first (`"$24,500"` -> `24500`).
    #[default]
    Lenient,
    /// Accept only plain decimal literals.
    Strict,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Number of additional image slots per color. Default: 8.
    #[serde(default = "default_max_additional_images")]
    pub max_additional_images: u32,
    #[serde(default)]
    pub numeric_policy: NumericPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_additional_images: default_max_additional_images(),
            numeric_policy: NumericPolicy::default(),
        }
    }
}

fn default_max_connections() -> u32 {
    20
}
fn default_acquire_timeout_secs() -> u64 {
    8
}
fn default_public_root() -> PathBuf {
    PathBuf::from("./public")
}
fn default_max_upload_size() -> u64 {
    10 * 1024 * 1024
}
fn default_max_additional_images() -> u32 {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., CATALOG__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("CATALOG").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
