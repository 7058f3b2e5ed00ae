//! YAML configuration for the verification pipeline.
//!
//! Every section is optional and falls back to its defaults, so a minimal
//! file only needs a version and the hashing salt.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "production"
//!
//! hashing:
//!   salt: "replace-with-a-long-random-secret"
//!
//! matcher:
//!   last_name_weight: 0.6
//!   first_name_weight: 0.4
//!   auto_approve_threshold: 0.7
//!   manual_review_threshold: 0.4
//!   check_digit: none
//!
//! extract:
//!   min_candidate_score: 3
//!   extra_blocklist: ["REGISTRADURIA"]
//!
//! coordinator:
//!   liveness_timeout_ms: 300000
//!   estimated_seconds: 30
//!   janitor_interval_secs: 60
//!   max_attempts_per_day: 3
//!   max_image_bytes: 8388608
//!   review_expiry_hours: 72
//!
//! retention:
//!   purge_after_days: 90
//!
//! storage:
//!   backend: redb
//!   path: "data/verifications.redb"
//!
//! uploads:
//!   dir: "uploads/verifications"
//!
//! ocr:
//!   binary: "tesseract"
//!   language: "spa"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use canonical::HashingConfig;
use extract::ExtractConfig;
use matcher::MatchConfig;
use serde::{Deserialize, Serialize};
use store::BackendConfig;
use thiserror::Error;
use tracing::warn;

/// Salt used when none is configured. Fine for tests, never for production.
pub const DEVELOPMENT_SALT: &str = "docverify-development-salt";

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration of the verification pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VerificationConfig {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_hashing")]
    pub hashing: HashingConfig,

    #[serde(default)]
    pub matcher: MatchConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub coordinator: CoordinatorConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub storage: BackendConfig,

    #[serde(default)]
    pub uploads: UploadsConfig,

    #[serde(default)]
    pub ocr: OcrConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_hashing() -> HashingConfig {
    HashingConfig::new(DEVELOPMENT_SALT)
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            hashing: default_hashing(),
            matcher: MatchConfig::default(),
            extract: ExtractConfig::default(),
            coordinator: CoordinatorConfig::default(),
            retention: RetentionConfig::default(),
            storage: BackendConfig::default(),
            uploads: UploadsConfig::default(),
            ocr: OcrConfig::default(),
        }
    }
}

impl VerificationConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: VerificationConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.hashing
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        if self.hashing.salt == DEVELOPMENT_SALT {
            warn!("hashing salt is the development default; set hashing.salt");
        }
        self.matcher
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.extract
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        self.coordinator.validate()?;
        self.retention.validate()?;
        self.ocr.validate()?;
        Ok(())
    }
}

/// Limits and timings of the processing coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoordinatorConfig {
    /// Upper bound on one processing job, also the janitor's staleness bound.
    #[serde(default = "default_liveness_timeout_ms")]
    pub liveness_timeout_ms: u64,

    /// Reported to the client on submit.
    #[serde(default = "default_estimated_seconds")]
    pub estimated_seconds: u64,

    #[serde(default = "default_janitor_interval_secs")]
    pub janitor_interval_secs: u64,

    /// Records a user may create in any rolling 24 hour window.
    #[serde(default = "default_max_attempts_per_day")]
    pub max_attempts_per_day: usize,

    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// Accepted MIME type prefix for uploads.
    #[serde(default = "default_image_mime_prefix")]
    pub image_mime_prefix: String,

    /// Expire `pending_review` records (and retries still waiting for
    /// images) untouched for this long. Disabled when unset.
    #[serde(default)]
    pub review_expiry_hours: Option<u64>,
}

fn default_liveness_timeout_ms() -> u64 {
    5 * 60 * 1000
}

fn default_estimated_seconds() -> u64 {
    30
}

fn default_janitor_interval_secs() -> u64 {
    60
}

fn default_max_attempts_per_day() -> usize {
    3
}

fn default_max_image_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_image_mime_prefix() -> String {
    "image/".to_string()
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            liveness_timeout_ms: default_liveness_timeout_ms(),
            estimated_seconds: default_estimated_seconds(),
            janitor_interval_secs: default_janitor_interval_secs(),
            max_attempts_per_day: default_max_attempts_per_day(),
            max_image_bytes: default_max_image_bytes(),
            image_mime_prefix: default_image_mime_prefix(),
            review_expiry_hours: None,
        }
    }
}

impl CoordinatorConfig {
    pub fn liveness(&self) -> Duration {
        Duration::from_millis(self.liveness_timeout_ms)
    }

    pub fn janitor_interval(&self) -> Duration {
        Duration::from_secs(self.janitor_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.liveness_timeout_ms == 0 {
            return Err(ConfigLoadError::Validation(
                "coordinator.liveness_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.janitor_interval_secs == 0 {
            return Err(ConfigLoadError::Validation(
                "coordinator.janitor_interval_secs must be greater than 0".into(),
            ));
        }
        if self.max_attempts_per_day == 0 {
            return Err(ConfigLoadError::Validation(
                "coordinator.max_attempts_per_day must be greater than 0".into(),
            ));
        }
        if self.max_image_bytes == 0 {
            return Err(ConfigLoadError::Validation(
                "coordinator.max_image_bytes must be greater than 0".into(),
            ));
        }
        if self.review_expiry_hours == Some(0) {
            return Err(ConfigLoadError::Validation(
                "coordinator.review_expiry_hours must be greater than 0 when set".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetentionConfig {
    /// Default age for the maintenance purge of terminal records.
    #[serde(default = "default_purge_after_days")]
    pub purge_after_days: u32,
}

fn default_purge_after_days() -> u32 {
    90
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            purge_after_days: default_purge_after_days(),
        }
    }
}

impl RetentionConfig {
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.purge_after_days == 0 {
            return Err(ConfigLoadError::Validation(
                "retention.purge_after_days must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadsConfig {
    #[serde(default = "default_uploads_dir")]
    pub dir: PathBuf,
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads/verifications")
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            dir: default_uploads_dir(),
        }
    }
}

/// Settings of the shipped Tesseract engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OcrConfig {
    #[serde(default = "default_ocr_binary")]
    pub binary: String,
    #[serde(default = "default_ocr_language")]
    pub language: String,
}

fn default_ocr_binary() -> String {
    "tesseract".to_string()
}

fn default_ocr_language() -> String {
    "spa".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: default_ocr_binary(),
            language: default_ocr_language(),
        }
    }
}

impl OcrConfig {
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.binary.trim().is_empty() || self.language.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "ocr.binary and ocr.language must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "staging"
hashing:
  salt: "staging-salt-0123456789"
coordinator:
  liveness_timeout_ms: 1000
  review_expiry_hours: 48
storage:
  backend: redb
  path: "/tmp/verifications.redb"
"#;

        let config = VerificationConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("staging"));
        assert_eq!(config.coordinator.liveness(), Duration::from_secs(1));
        assert_eq!(config.coordinator.review_expiry_hours, Some(48));
        assert_eq!(config.coordinator.max_attempts_per_day, 3);
        assert!(matches!(config.storage, BackendConfig::Redb { .. }));
        assert_eq!(config.matcher.auto_approve_threshold, 0.7);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1.0"
hashing:
  salt: "file-salt-0123456789"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = VerificationConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.hashing.salt, "file-salt-0123456789");
        assert_eq!(config.storage, BackendConfig::InMemory);
    }

    #[test]
    fn test_default_config() {
        let config = VerificationConfig::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.coordinator.max_image_bytes, 8 * 1024 * 1024);
        assert_eq!(config.retention.purge_after_days, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unsupported_version() {
        let result = VerificationConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"));
    }

    #[test]
    fn test_short_salt_rejected() {
        let yaml = r#"
version: "1.0"
hashing:
  salt: "short"
"#;
        assert!(matches!(
            VerificationConfig::from_yaml(yaml),
            Err(ConfigLoadError::Validation(_))
        ));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let yaml = r#"
version: "1.0"
matcher:
  auto_approve_threshold: 0.3
  manual_review_threshold: 0.5
"#;
        assert!(VerificationConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_zero_liveness_rejected() {
        let yaml = r#"
version: "1.0"
coordinator:
  liveness_timeout_ms: 0
"#;
        assert!(VerificationConfig::from_yaml(yaml).is_err());
    }
}
