use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use dashmap::DashMap;
use docverify::{
    Collaborators, Coordinator, InMemoryUserDirectory, LocalFileStorage, ReviewWorkflow,
    TesseractCli, UserProfile, VerificationConfig, VerificationStore,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Pipeline configuration
    pub pipeline: Arc<VerificationConfig>,

    /// Rate limit tracking: API key -> (count, window_start)
    pub rate_limiter: Arc<DashMap<String, (u32, std::time::Instant)>>,

    /// Submission intake and background processing
    pub coordinator: Coordinator,

    /// Reviews, retries, history and purge
    pub workflow: ReviewWorkflow,

    /// Prometheus renderer, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Wire state around explicit collaborators.
    pub fn new(
        config: ServerConfig,
        pipeline: VerificationConfig,
        collaborators: Collaborators,
        metrics: Option<PrometheusHandle>,
    ) -> ServerResult<Self> {
        let store = VerificationStore::open(&pipeline.storage)?;
        let coordinator = Coordinator::new(&pipeline, Arc::new(store), collaborators)?;
        let workflow = ReviewWorkflow::new(coordinator.clone());

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            rate_limiter: Arc::new(DashMap::new()),
            coordinator,
            workflow,
            metrics,
        })
    }

    /// Build state from configuration with the shipped collaborators:
    /// Tesseract OCR, local image storage and a user directory seeded from
    /// `users_file`.
    pub fn from_config(config: ServerConfig, metrics: Option<PrometheusHandle>) -> ServerResult<Self> {
        let pipeline = match &config.pipeline_config {
            Some(path) => VerificationConfig::from_file(path)
                .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?,
            None => VerificationConfig::default(),
        };

        let users = Arc::new(InMemoryUserDirectory::new());
        if let Some(path) = &config.users_file {
            let seeded = load_users(path)?;
            tracing::info!(users = seeded.len(), "user_directory_seeded");
            for (user_id, profile) in seeded {
                users.insert(user_id, profile);
            }
        }

        let collaborators = Collaborators {
            ocr: Arc::new(TesseractCli::new(&pipeline.ocr)),
            files: Arc::new(LocalFileStorage::new(&pipeline.uploads.dir)),
            users,
            identity_provider: None,
        };
        Self::new(config, pipeline, collaborators, metrics)
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }

    /// Check rate limit for API key
    pub fn check_rate_limit(&self, key: &str) -> bool {
        let now = std::time::Instant::now();
        let window = std::time::Duration::from_secs(60);
        let limit = self.config.rate_limit_per_minute;

        let mut entry = self.rate_limiter.entry(key.to_string()).or_insert((0, now));
        let (count, window_start) = entry.value_mut();

        // Reset if window has passed
        if now.duration_since(*window_start) > window {
            *count = 0;
            *window_start = now;
        }

        if *count >= limit {
            return false;
        }

        *count += 1;
        true
    }
}

fn load_users(path: &Path) -> ServerResult<HashMap<String, UserProfile>> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content)
        .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn users_file_is_yaml_map() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "u1:\n  first_name: Luz Deisy\n  last_name: Ramos Ochoa\n"
        )
        .unwrap();
        let users = load_users(file.path()).unwrap();
        assert_eq!(users["u1"].last_name, "Ramos Ochoa");
        assert!(!users["u1"].verified);
    }

    #[test]
    fn rate_limit_window() {
        let mut config = ServerConfig::default();
        config.rate_limit_per_minute = 2;
        config.api_keys.insert("k".into());
        let state = ServerState::from_config(config, None).unwrap();
        assert!(state.is_valid_api_key("k"));
        assert!(state.check_rate_limit("k"));
        assert!(state.check_rate_limit("k"));
        assert!(!state.check_rate_limit("k"));
    }
}
