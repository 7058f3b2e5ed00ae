//! Document-number search over OCR text.
//!
//! Patterns are tried from most to least specific; within a pattern,
//! matches are visited in text order. The first candidate whose digit run is
//! 6 to 10 digits long wins.

use canonical::digits_only;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::lines::Line;

/// Shortest accepted digit run.
pub const MIN_DIGITS: usize = 6;
/// Longest accepted digit run.
pub const MAX_DIGITS: usize = 10;

// Runs against folded (lowercase, accent-free) text.
static PREFIXED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:numero|no\.|nuip|documento|cedula)[ \t:.#]*(\d[\d., \t]{4,16}\d)")
        .expect("Invalid prefixed number regex")
});

static GROUPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3}(?:[.,]\d{3}){2,3})\b").expect("Invalid grouped number regex")
});

static BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\D)(\d{6,10})(?:\D|$)").expect("Invalid bare number regex"));

/// Returns the digits of the first plausible document number.
pub(crate) fn find_document_number(lines: &[Line]) -> Option<String> {
    let text = lines
        .iter()
        .map(|line| line.folded.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    for (pattern, labelled) in [(&*PREFIXED, true), (&*GROUPED, false), (&*BARE, false)] {
        for caps in pattern.captures_iter(&text) {
            let Some(found) = caps.get(1) else {
                continue;
            };
            let digits = if labelled {
                leading_number(found.as_str())
            } else {
                digits_only(found.as_str())
            };
            if (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len()) {
                return Some(digits);
            }
        }
    }
    None
}

/// Digits of a labelled capture up to the first whitespace-separated group
/// that cannot continue a spaced thousands grouping ("1041 970 336").
fn leading_number(capture: &str) -> String {
    let mut groups = capture.split_whitespace();
    let mut digits = groups.next().map(digits_only).unwrap_or_default();
    for group in groups {
        let group = group.trim_matches(|c| c == '.' || c == ',');
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            break;
        }
        digits.push_str(group);
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::prepare_lines;

    fn find(text: &str) -> Option<String> {
        find_document_number(&prepare_lines(text))
    }

    #[test]
    fn prefixed_number_wins_over_bare_digits() {
        let text = "TEL 3001234567\nNÚMERO 1.041.970.336";
        assert_eq!(find(text).as_deref(), Some("1041970336"));
    }

    #[test]
    fn labelled_number_stops_before_trailing_digits() {
        let text = "TEL 3001234567\nNUIP 52345678 17";
        assert_eq!(find(text).as_deref(), Some("52345678"));
        assert_eq!(find("NÚMERO 52.345.678 12 MAR").as_deref(), Some("52345678"));
    }

    #[test]
    fn labelled_number_with_spaced_groups() {
        assert_eq!(find("NÚMERO 1041 970 336").as_deref(), Some("1041970336"));
    }

    #[test]
    fn grouped_number_without_prefix() {
        assert_eq!(find("RAMOS OCHOA\n52.345.678").as_deref(), Some("52345678"));
    }

    #[test]
    fn bare_run_bounded_by_non_digits() {
        assert_eq!(find("ID:80123456X").as_deref(), Some("80123456"));
        assert_eq!(find("12345678901234"), None);
    }

    #[test]
    fn rejects_short_runs() {
        assert_eq!(find("No. 12345\nFECHA 12-03-1990"), None);
    }

    #[test]
    fn skips_out_of_range_prefixed_candidates() {
        let text = "cedula 1.041.970.336 12 03 1990";
        assert_eq!(find(text).as_deref(), Some("1041970336"));
    }
}
