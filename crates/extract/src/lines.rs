//! Line preparation: splitting, log-noise removal and boilerplate matching.

use canonical::{collapse_whitespace, fold_accents};
use once_cell::sync::Lazy;
use regex::Regex;

static TIMESTAMP_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[?\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}").expect("Invalid timestamp regex")
});

static LEVEL_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[\s*(trace|debug|info|warn|warning|error|fatal)\s*\]")
        .expect("Invalid log level regex")
});

static KEY_VALUE_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\w+=\S+\s+\w+=\S+").expect("Invalid key=value regex")
});

static STACK_FRAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^at\s+\S+").expect("Invalid stack frame regex"));

/// One surviving OCR line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Line {
    /// Position among the surviving lines, used for adjacency checks.
    pub index: usize,
    /// Trimmed text as recognized.
    pub text: String,
    /// Accent- and case-folded text with collapsed whitespace.
    pub folded: String,
}

/// Splits OCR text into trimmed, non-empty lines with log noise removed.
pub(crate) fn prepare_lines(text: &str) -> Vec<Line> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_log_noise(line))
        .enumerate()
        .map(|(index, line)| Line {
            index,
            text: line.to_string(),
            folded: collapse_whitespace(&fold_accents(line)),
        })
        .collect()
}

/// Lines that come from engine diagnostics rather than the card itself.
pub(crate) fn is_log_noise(line: &str) -> bool {
    TIMESTAMP_PREFIX.is_match(line)
        || LEVEL_TAG.is_match(line)
        || KEY_VALUE_RUN.is_match(line)
        || STACK_FRAME.is_match(line)
}

/// Folded boilerplate phrases matched on whole words.
#[derive(Debug, Clone)]
pub(crate) struct Blocklist {
    phrases: Vec<String>,
}

impl Blocklist {
    pub fn new<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Self {
        let phrases = phrases
            .into_iter()
            .map(|p| format!(" {} ", collapse_whitespace(&fold_accents(p))))
            .collect();
        Self { phrases }
    }

    pub fn matches(&self, folded_line: &str) -> bool {
        let padded = format!(" {folded_line} ");
        self.phrases.iter().any(|phrase| padded.contains(phrase.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_log_noise() {
        let text = "2024-05-01 10:22:13 INFO ocr finished\n\
                    [WARN] low contrast\n\
                    engine=tesseract psm=3\n\
                    at Object.recognize (worker.js:10:5)\n\
                    RAMOS OCHOA";
        let lines = prepare_lines(text);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "RAMOS OCHOA");
        assert_eq!(lines[0].index, 0);
    }

    #[test]
    fn blocklist_is_accent_and_case_insensitive() {
        let blocklist = Blocklist::new(["REPÚBLICA DE COLOMBIA", "NÚMERO"]);
        assert!(blocklist.matches(&fold_accents("Republica de Colombia")));
        assert!(blocklist.matches("numero 1.041.970.336"));
        assert!(!blocklist.matches("numeros"));
        assert!(!blocklist.matches("ramos ochoa"));
    }
}
