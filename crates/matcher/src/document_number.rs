//! Format gate for document numbers.

use canonical::digits_only;

use crate::types::{CheckDigitScheme, DocumentNumberError};

/// Numbers that show up in test uploads and sample cards.
pub const KNOWN_PLACEHOLDERS: &[&str] = &[
    "1234567890",
    "0123456789",
    "1111111111",
    "0000000000",
    "9999999999",
    "123456789",
    "12345678",
];

/// Validates a document number and returns its digits.
///
/// Rules: 6 to 10 digits, not a single repeated digit, not a known
/// placeholder, and the configured check digit when one is enabled.
pub fn validate_document_number(
    number: &str,
    scheme: CheckDigitScheme,
) -> Result<String, DocumentNumberError> {
    let digits = digits_only(number);
    if digits.is_empty() {
        return Err(DocumentNumberError::Empty);
    }
    if !(6..=10).contains(&digits.len()) {
        return Err(DocumentNumberError::InvalidLength(digits.len()));
    }
    let first = digits.as_bytes()[0];
    if digits.bytes().all(|b| b == first) {
        return Err(DocumentNumberError::RepeatedDigits);
    }
    if KNOWN_PLACEHOLDERS.contains(&digits.as_str()) {
        return Err(DocumentNumberError::KnownPlaceholder);
    }
    match scheme {
        CheckDigitScheme::None => {}
        CheckDigitScheme::Luhn => {
            if !luhn_valid(&digits) {
                return Err(DocumentNumberError::CheckDigitMismatch);
            }
        }
    }
    Ok(digits)
}

fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}
