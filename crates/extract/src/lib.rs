//! docverify extract layer.
//!
//! Turns the raw OCR text of an identity document into structured fields:
//! document number, given name(s) and surname(s).
//!
//! ## What we do here
//!
//! - **Clean the text** - split into lines, drop engine log noise and
//!   boilerplate printed on every card (jurisdiction headers, captions)
//! - **Find the number** - ordered patterns from most to least specific,
//!   first 6–10 digit run wins
//! - **Find the names** - classify lines by shape, score them per role with
//!   caption anchors and common-name dictionaries, assign roles jointly
//! - **Log everything** - structured logs via tracing; the document number
//!   itself is never logged
//!
//! ## Main entry point
//!
//! Build a [`DocumentParser`] from an [`ExtractConfig`] and call
//! [`DocumentParser::parse`] with the front (and optional back) text.
//!
//! ```
//! use extract::{DocumentParser, ExtractConfig};
//!
//! let parser = DocumentParser::new(&ExtractConfig::default()).unwrap();
//! let text = "REPÚBLICA DE COLOMBIA\nNÚMERO 1.041.970.336\nRAMOS OCHOA\nAPELLIDOS\nLUZ DEISY\nNOMBRES";
//! let parsed = parser.parse(text, None).unwrap();
//!
//! assert_eq!(parsed.document_number, "1041970336");
//! assert_eq!(parsed.first_name, "LUZ DEISY");
//! assert_eq!(parsed.last_name, "RAMOS OCHOA");
//! ```
use std::time::Instant;

use tracing::{debug, info, warn, Level};

mod config;
mod error;
mod lines;
mod names;
mod number;
mod types;

use crate::lines::{prepare_lines, Blocklist};
use crate::names::{assign_names, Dictionaries, NameLine};
use crate::number::find_document_number;

pub use crate::config::{
    ConfigError, ExtractConfig, DEFAULT_BLOCKLIST, DEFAULT_FIRST_NAMES, DEFAULT_LAST_NAMES,
};
pub use crate::error::ExtractError;
pub use crate::number::{MAX_DIGITS, MIN_DIGITS};
pub use crate::types::ParsedDocument;

/// Parser with its blocklist and dictionaries prepared once.
#[derive(Debug, Clone)]
pub struct DocumentParser {
    blocklist: Blocklist,
    dictionaries: Dictionaries,
    min_candidate_score: u32,
    max_line_chars: usize,
}

impl DocumentParser {
    /// Validates `cfg` and prepares the folded lookup tables.
    pub fn new(cfg: &ExtractConfig) -> Result<Self, ExtractError> {
        cfg.validate()?;
        let blocklist = Blocklist::new(
            DEFAULT_BLOCKLIST
                .iter()
                .copied()
                .chain(cfg.extra_blocklist.iter().map(String::as_str)),
        );
        Ok(Self {
            blocklist,
            dictionaries: Dictionaries::new(&cfg.first_names, &cfg.last_names),
            min_candidate_score: cfg.min_candidate_score,
            max_line_chars: cfg.max_line_chars,
        })
    }

    /// Parses the OCR text of the front face and, when available, the back.
    pub fn parse(&self, front: &str, back: Option<&str>) -> Result<ParsedDocument, ExtractError> {
        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "extract.parse",
            front_len = front.len(),
            has_back = back.is_some()
        );
        let _guard = span.enter();

        match self.parse_inner(front, back) {
            Ok(parsed) => {
                let elapsed_micros = start.elapsed().as_micros();
                info!(
                    has_first_name = !parsed.first_name.is_empty(),
                    has_last_name = !parsed.last_name.is_empty(),
                    elapsed_micros,
                    "extract_success"
                );
                Ok(parsed)
            }
            Err(err) => {
                let elapsed_micros = start.elapsed().as_micros();
                warn!(error = %err, elapsed_micros, "extract_failure");
                Err(err)
            }
        }
    }

    fn parse_inner(&self, front: &str, back: Option<&str>) -> Result<ParsedDocument, ExtractError> {
        let mut text = front.to_string();
        if let Some(back) = back {
            text.push('\n');
            text.push_str(back);
        }

        let lines = prepare_lines(&text);
        if lines.is_empty() {
            return Err(ExtractError::EmptyText);
        }

        let document_number = find_document_number(&lines).ok_or(ExtractError::MissingDocumentNumber)?;

        let candidates: Vec<NameLine> = lines
            .iter()
            .filter(|line| !self.blocklist.matches(&line.folded))
            .filter_map(|line| NameLine::from_line(line, self.max_line_chars))
            .collect();
        debug!(lines = lines.len(), candidates = candidates.len(), "extract_candidates");

        let names = assign_names(
            &candidates,
            &lines,
            &self.dictionaries,
            self.min_candidate_score,
        );

        Ok(ParsedDocument {
            document_number,
            first_name: names.first_name,
            last_name: names.last_name,
        })
    }
}

/// One-shot convenience over [`DocumentParser`].
pub fn parse_document(
    front: &str,
    back: Option<&str>,
    cfg: &ExtractConfig,
) -> Result<ParsedDocument, ExtractError> {
    DocumentParser::new(cfg)?.parse(front, back)
}
