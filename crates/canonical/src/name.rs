//! Person-name normalization.
//!
//! Registered account names are typed by users with accents and mixed case,
//! while ID cards are printed in capitals and often lose diacritics in OCR.
//! Both sides go through [`normalize_name`] before any comparison.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::whitespace::collapse_whitespace;

/// Normalizes a person name for comparison.
///
/// Steps: NFKD decomposition, combining marks dropped, Unicode lowercase,
/// every non-letter mapped to a space, whitespace collapsed.
///
/// ```rust
/// use canonical::normalize_name;
///
/// assert_eq!(normalize_name("GÓMEZ  Peña"), "gomez pena");
/// assert_eq!(normalize_name("Ana-María"), "ana maria");
/// ```
pub fn normalize_name(text: &str) -> String {
    let mut letters = String::with_capacity(text.len());
    for ch in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_alphabetic() {
            letters.extend(ch.to_lowercase());
        } else {
            letters.push(' ');
        }
    }
    collapse_whitespace(&letters)
}

/// Folds accents and case but keeps every other character.
///
/// Used for caption and blocklist matching where punctuation and digits
/// still matter (`"REPÚBLICA"` and `"republica"` fold to the same string).
///
/// ```rust
/// use canonical::fold_accents;
///
/// assert_eq!(fold_accents("CÉDULA DE CIUDADANÍA"), "cedula de ciudadania");
/// assert_eq!(fold_accents("No. 123"), "no. 123");
/// ```
pub fn fold_accents(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for ch in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        folded.extend(ch.to_lowercase());
    }
    folded
}
