//! Server settings: listener, limits, auth and where the pipeline config lives.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `server.{yaml,toml,json}` in the working directory (or the file named by
//!    `DOCVERIFY_SERVER_CONFIG`)
//! 3. `DOCVERIFY_SERVER__*` environment variables, e.g.
//!    `DOCVERIFY_SERVER__PORT=9000`

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_PREFIX: &str = "DOCVERIFY_SERVER";
pub const CONFIG_PATH_VAR: &str = "DOCVERIFY_SERVER_CONFIG";
/// Key installed when none are configured. Development only.
pub const DEMO_API_KEY: &str = "demo-key-12345";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Whole-request timeout. Uploads are processed in the background, so
    /// this only has to cover receiving the images.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Body limit for `/api/v1` routes. Must fit a front and a back image.
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Per API key.
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,

    #[serde(default)]
    pub api_keys: HashSet<String>,

    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// `tracing_subscriber` env-filter directive.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Pipeline YAML (see `docverify::VerificationConfig`). Defaults apply when unset.
    #[serde(default)]
    pub pipeline_config: Option<PathBuf>,

    /// YAML map of user id to `{first_name, last_name}` seeding the user directory.
    #[serde(default)]
    pub users_file: Option<PathBuf>,

    /// Run the janitor in the background.
    #[serde(default = "default_true")]
    pub janitor_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            api_keys: HashSet::new(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            metrics_enabled: default_true(),
            pipeline_config: None,
            users_file: None,
            janitor_enabled: default_true(),
        }
    }
}

impl ServerConfig {
    /// Layer file and environment over the defaults, then validate.
    pub fn load() -> anyhow::Result<Self> {
        let file = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => config::File::with_name(&path).required(true),
            Err(_) => config::File::with_name("server").required(false),
        };
        let mut config: ServerConfig = config::Config::builder()
            .add_source(file)
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        if config.api_keys.is_empty() {
            tracing::warn!(key = DEMO_API_KEY, "no_api_keys_configured");
            config.api_keys.insert(DEMO_API_KEY.to_string());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.timeout_secs > 0, "timeout_secs must be greater than 0");
        anyhow::ensure!(
            self.max_body_size_mb > 0,
            "max_body_size_mb must be greater than 0"
        );
        anyhow::ensure!(
            self.rate_limit_per_minute > 0,
            "rate_limit_per_minute must be greater than 0"
        );
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.bind_addr, self.port).parse()?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Body limit in bytes.
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_mb * 1024 * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    20
}

fn default_rate_limit_per_minute() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}
