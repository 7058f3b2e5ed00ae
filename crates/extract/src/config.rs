//! Configuration types for document field extraction.
//!
//! [`ExtractConfig`] controls which lines the parser treats as boilerplate,
//! how name candidates are scored and which dictionaries provide the
//! "common local name" bonus. It is cheap to clone and deserializes from the
//! pipeline's YAML configuration.
//!
//! # Quick Start
//!
//! ```rust
//! use extract::ExtractConfig;
//!
//! let config = ExtractConfig::default();
//! config.validate().expect("default configuration is valid");
//! ```
//!
//! # Extending the dictionaries
//!
//! ```rust
//! use extract::ExtractConfig;
//!
//! let mut config = ExtractConfig::default();
//! config.first_names.push("DEISY".into());
//! config.extra_blocklist.push("TARJETA DE IDENTIDAD".into());
//! assert!(config.validate().is_ok());
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boilerplate printed on national ID cards. Matching is accent- and
/// case-insensitive and works on whole words.
pub const DEFAULT_BLOCKLIST: &[&str] = &[
    "REPÚBLICA DE COLOMBIA",
    "REPUBLICA",
    "REGISTRADURÍA",
    "IDENTIFICACIÓN PERSONAL",
    "IDENTIFICACIÓN",
    "CÉDULA DE CIUDADANÍA",
    "CÉDULA",
    "DOCUMENTO DE IDENTIDAD",
    "DOCUMENTO",
    "NÚMERO",
    "APELLIDOS",
    "NOMBRES",
    "FECHA DE NACIMIENTO",
    "LUGAR DE NACIMIENTO",
    "FECHA DE EXPEDICIÓN",
    "FECHA",
    "ESTATURA",
    "SEXO",
    "FIRMA",
    "INDICE DERECHO",
    "G.S. RH",
];

/// Common given names that earn a dictionary bonus.
pub const DEFAULT_FIRST_NAMES: &[&str] = &[
    "MARIA", "JOSE", "LUIS", "CARLOS", "JUAN", "ANA", "JORGE", "ANDRES",
    "FRANCISCO", "ALEJANDRO", "RAFAEL", "MIGUEL", "PEDRO", "ANTONIO", "DIEGO",
    "FERNANDO", "RICARDO", "LUZ", "CAMILA", "VALENTINA", "DANIEL", "SANTIAGO",
];

/// Common surnames that earn a dictionary bonus.
pub const DEFAULT_LAST_NAMES: &[&str] = &[
    "RODRIGUEZ", "MARTINEZ", "GARCIA", "LOPEZ", "HERNANDEZ", "GONZALEZ",
    "PEREZ", "SANCHEZ", "RAMIREZ", "TORRES", "FLOREZ", "DIAZ", "MORALES",
    "GOMEZ", "CASTRO", "RAMOS", "OCHOA", "VARGAS", "ROJAS", "MUÑOZ",
];

/// Runtime configuration for the document parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractConfig {
    /// Minimum candidate score for a line to be accepted as a name.
    /// A role with no candidate at or above it yields an empty field.
    ///
    /// Default: `3`
    pub min_candidate_score: u32,

    /// Lines longer than this (in chars) are never name candidates.
    ///
    /// Default: `64`
    pub max_line_chars: usize,

    /// Additional boilerplate phrases appended to [`DEFAULT_BLOCKLIST`].
    pub extra_blocklist: Vec<String>,

    /// Given-name dictionary. Defaults to [`DEFAULT_FIRST_NAMES`].
    pub first_names: Vec<String>,

    /// Surname dictionary. Defaults to [`DEFAULT_LAST_NAMES`].
    pub last_names: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_candidate_score: 3,
            max_line_chars: 64,
            extra_blocklist: Vec::new(),
            first_names: DEFAULT_FIRST_NAMES.iter().map(|s| s.to_string()).collect(),
            last_names: DEFAULT_LAST_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExtractConfig {
    /// Checks the configuration for values that would make extraction
    /// meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_line_chars < 4 {
            return Err(ConfigError::LineLimitTooSmall(self.max_line_chars));
        }
        if let Some(blank) = self
            .extra_blocklist
            .iter()
            .chain(&self.first_names)
            .chain(&self.last_names)
            .find(|entry| entry.trim().is_empty())
        {
            return Err(ConfigError::BlankEntry(blank.clone()));
        }
        Ok(())
    }
}

/// Problems found by [`ExtractConfig::validate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// `max_line_chars` cannot hold even a short surname.
    #[error("max_line_chars must be at least 4 (got {0})")]
    LineLimitTooSmall(usize),
    /// A blocklist or dictionary entry is empty after trimming.
    #[error("blocklist and dictionary entries must not be blank (got {0:?})")]
    BlankEntry(String),
}
