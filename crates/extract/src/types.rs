use serde::{Deserialize, Serialize};

/// Fields pulled out of the OCR text of one document.
///
/// Names are upper-cased and stripped of punctuation; either may be empty
/// when no candidate line scored high enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Digits only, 6 to 10 of them.
    pub document_number: String,
    pub first_name: String,
    pub last_name: String,
}

impl ParsedDocument {
    pub fn has_names(&self) -> bool {
        !self.first_name.is_empty() || !self.last_name.is_empty()
    }
}
