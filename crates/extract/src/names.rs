//! Name-candidate classification and scoring.
//!
//! Every surviving line that looks like a person name is scored once per
//! role. Surnames are printed fully upper-case; given names are either
//! capitalized mixed case or, on ID cards, upper-case as well. An upper-case
//! given name needs a dictionary first name or a "NOMBRES" caption right
//! below it; otherwise place names and other card text would qualify.
//! Captions ("APELLIDOS", "NOMBRES") anchor the line printed right above them.
//!
//! Roles are assigned jointly: the pair of distinct lines with the highest
//! total score wins, ties going to the earliest lines. A single upper-case
//! line of four words is also considered as "GIVEN GIVEN LAST LAST".

use std::collections::HashSet;

use canonical::{collapse_whitespace, fold_accents};

use crate::lines::Line;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Surname,
    Given,
}

impl Role {
    fn caption(self) -> &'static str {
        match self {
            Role::Surname => "apellido",
            Role::Given => "nombre",
        }
    }
}

/// Folded upper-case dictionaries.
#[derive(Debug, Clone, Default)]
pub(crate) struct Dictionaries {
    first: HashSet<String>,
    last: HashSet<String>,
}

impl Dictionaries {
    pub fn new(first: &[String], last: &[String]) -> Self {
        Self {
            first: first.iter().map(|w| fold_word(w)).collect(),
            last: last.iter().map(|w| fold_word(w)).collect(),
        }
    }

    fn contains(&self, role: Role, word: &str) -> bool {
        match role {
            Role::Surname => self.last.contains(word),
            Role::Given => self.first.contains(word),
        }
    }
}

fn fold_word(word: &str) -> String {
    fold_accents(word.trim()).to_uppercase()
}

/// A line that passed the shape checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NameLine {
    pub index: usize,
    /// Cleaned, upper-cased text.
    pub text: String,
    words: Vec<String>,
    letters: usize,
    all_upper: bool,
    capitalized: bool,
}

impl NameLine {
    /// Builds a candidate from an OCR line, or `None` when it cannot be a name.
    pub fn from_line(line: &Line, max_chars: usize) -> Option<Self> {
        if line.text.chars().count() > max_chars || line.text.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        let cleaned: String = line
            .text
            .chars()
            .map(|c| {
                if c.is_alphabetic() || c == '-' || c == '\'' {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        let cleaned = collapse_whitespace(&cleaned);
        let words: Vec<&str> = cleaned.split(' ').filter(|w| !w.is_empty()).collect();
        Self::from_words(line.index, &words)
    }

    fn from_words(index: usize, words: &[&str]) -> Option<Self> {
        if words.is_empty() {
            return None;
        }
        if words
            .iter()
            .any(|w| w.chars().filter(|c| c.is_alphabetic()).count() < 2)
        {
            return None;
        }
        let letters: usize = words
            .iter()
            .map(|w| w.chars().filter(|c| c.is_alphabetic()).count())
            .sum();
        let all_upper = words
            .iter()
            .flat_map(|w| w.chars())
            .filter(|c| c.is_alphabetic())
            .all(|c| !c.is_lowercase());
        let capitalized = !all_upper
            && words.iter().all(|w| {
                w.chars().next().is_some_and(char::is_uppercase) && w.chars().any(char::is_lowercase)
            });
        if !all_upper && !capitalized {
            return None;
        }
        let text = words.join(" ").to_uppercase();
        Some(Self {
            index,
            words: words.iter().map(|w| fold_word(w)).collect(),
            text,
            letters,
            all_upper,
            capitalized,
        })
    }

    /// Splits a four-word upper-case line into (given, surname) halves.
    pub fn split_full_name(&self) -> Option<(NameLine, NameLine)> {
        if !self.all_upper || self.words.len() != 4 {
            return None;
        }
        let raw: Vec<&str> = self.text.split(' ').collect();
        let given = Self::from_words(self.index, &raw[..2])?;
        let surname = Self::from_words(self.index, &raw[2..])?;
        Some((given, surname))
    }

    /// An upper-case line is a given name only with a dictionary first name
    /// (2 to 3 words) or a "NOMBRES" caption right below it (1 to 3 words).
    fn upper_case_given(&self, dicts: &Dictionaries, lines: &[Line]) -> bool {
        let n = self.words.len();
        let known = (2..=3).contains(&n) && self.words.iter().any(|w| dicts.contains(Role::Given, w));
        let captioned = (1..=3).contains(&n) && caption_at(lines, self.index + 1, Role::Given);
        known || captioned
    }

    /// Scores this line for `role`; `None` when the shape does not fit.
    pub fn score(&self, role: Role, dicts: &Dictionaries, lines: &[Line]) -> Option<u32> {
        let n = self.words.len();
        let shape = match role {
            Role::Surname => self.all_upper && (1..=3).contains(&n),
            Role::Given => {
                (self.capitalized && (2..=4).contains(&n))
                    || (self.all_upper && self.upper_case_given(dicts, lines))
            }
        };
        if !shape {
            return None;
        }

        let mut score = 0;
        if (4..=30).contains(&self.letters) {
            score += 2;
        }
        score += if n == 2 { 2 } else { 1 };
        score += match role {
            Role::Surname if self.all_upper => 1,
            Role::Given if self.capitalized => 1,
            _ => 0,
        };
        if self.words.iter().any(|w| dicts.contains(role, w)) {
            score += 3;
        }
        if caption_at(lines, self.index + 1, role) {
            score += 4;
        } else if self.index > 0 && caption_at(lines, self.index - 1, role) {
            score += 2;
        }
        Some(score)
    }
}

fn caption_at(lines: &[Line], index: usize, role: Role) -> bool {
    lines
        .get(index)
        .is_some_and(|line| line.folded.starts_with(role.caption()))
}

/// A scored candidate for one role.
#[derive(Debug, Clone)]
struct Scored {
    line: NameLine,
    score: u32,
}

/// Winning (given, surname) texts; either may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NameAssignment {
    pub first_name: String,
    pub last_name: String,
}

/// Picks the best given-name and surname lines among `candidates`.
pub(crate) fn assign_names(
    candidates: &[NameLine],
    lines: &[Line],
    dicts: &Dictionaries,
    min_score: u32,
) -> NameAssignment {
    let scored = |role: Role| -> Vec<Scored> {
        candidates
            .iter()
            .filter_map(|line| {
                let score = line.score(role, dicts, lines)?;
                (score >= min_score).then(|| Scored {
                    line: line.clone(),
                    score,
                })
            })
            .collect()
    };
    let surnames = scored(Role::Surname);
    let givens = scored(Role::Given);

    let mut best: Option<(u32, Option<&Scored>, Option<&Scored>)> = None;
    let surname_options = surnames.iter().map(Some).chain(std::iter::once(None));
    for surname in surname_options {
        let given_options = givens.iter().map(Some).chain(std::iter::once(None));
        for given in given_options {
            if let (Some(s), Some(g)) = (surname, given) {
                if s.line.index == g.line.index {
                    continue;
                }
            }
            let total = surname.map_or(0, |s| s.score) + given.map_or(0, |g| g.score);
            if best.as_ref().map_or(true, |(t, _, _)| total > *t) {
                best = Some((total, surname, given));
            }
        }
    }

    let mut assignment = NameAssignment::default();
    let mut best_total = 0;
    if let Some((total, surname, given)) = best {
        best_total = total;
        assignment.last_name = surname.map(|s| s.line.text.clone()).unwrap_or_default();
        assignment.first_name = given.map(|g| g.line.text.clone()).unwrap_or_default();
    }

    for candidate in candidates {
        let Some((given, surname)) = candidate.split_full_name() else {
            continue;
        };
        let (Some(g), Some(s)) = (
            given.score(Role::Given, dicts, lines),
            surname.score(Role::Surname, dicts, lines),
        ) else {
            continue;
        };
        if g >= min_score && s >= min_score && g + s > best_total {
            best_total = g + s;
            assignment = NameAssignment {
                first_name: given.text,
                last_name: surname.text,
            };
        }
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_FIRST_NAMES, DEFAULT_LAST_NAMES};
    use crate::lines::prepare_lines;

    fn dicts() -> Dictionaries {
        let first: Vec<String> = DEFAULT_FIRST_NAMES.iter().map(|s| s.to_string()).collect();
        let last: Vec<String> = DEFAULT_LAST_NAMES.iter().map(|s| s.to_string()).collect();
        Dictionaries::new(&first, &last)
    }

    fn assign(text: &str) -> NameAssignment {
        let lines = prepare_lines(text);
        let candidates: Vec<NameLine> = lines
            .iter()
            .filter(|l| !l.folded.starts_with("apellido") && !l.folded.starts_with("nombre"))
            .filter_map(|l| NameLine::from_line(l, 64))
            .collect();
        assign_names(&candidates, &lines, &dicts(), 3)
    }

    #[test]
    fn captions_anchor_roles() {
        let out = assign("PINILLA ARDILA\nAPELLIDOS\nYESENIA\nNOMBRES");
        assert_eq!(out.last_name, "PINILLA ARDILA");
        assert_eq!(out.first_name, "YESENIA");
    }

    #[test]
    fn mixed_case_line_prefers_given_role() {
        let out = assign("GOMEZ TORRES\nJuan Pablo");
        assert_eq!(out.last_name, "GOMEZ TORRES");
        assert_eq!(out.first_name, "JUAN PABLO");
    }

    #[test]
    fn four_word_line_splits_into_given_and_surname() {
        let out = assign("LUZ DEISY RAMOS OCHOA");
        assert_eq!(out.first_name, "LUZ DEISY");
        assert_eq!(out.last_name, "RAMOS OCHOA");
    }

    #[test]
    fn ties_go_to_earliest_line() {
        let out = assign("ABCD EFGH\nIJKL MNOP\nQrst Uvwx\nWxyz Abcd");
        assert_eq!(out.last_name, "ABCD EFGH");
        assert_eq!(out.first_name, "QRST UVWX");
    }

    #[test]
    fn upper_case_given_name_needs_dictionary_or_caption() {
        let out = assign("RAMOS OCHOA\nAPELLIDOS\nMEDELLIN ANTIOQUIA");
        assert_eq!(out.last_name, "RAMOS OCHOA");
        assert_eq!(out.first_name, "");

        let out = assign("GOMEZ TORRES\nMARIA ELENA");
        assert_eq!(out.last_name, "GOMEZ TORRES");
        assert_eq!(out.first_name, "MARIA ELENA");
    }

    #[test]
    fn single_upper_case_word_needs_caption() {
        let out = assign("GOMEZ TORRES\nLUZ");
        assert_eq!(out.first_name, "");

        let out = assign("GOMEZ TORRES\nLUZ\nNOMBRES");
        assert_eq!(out.first_name, "LUZ");
    }

    #[test]
    fn rejects_lines_with_digits_or_single_letters() {
        let line = Line {
            index: 0,
            text: "A B".into(),
            folded: "a b".into(),
        };
        assert!(NameLine::from_line(&line, 64).is_none());
        let line = Line {
            index: 0,
            text: "RAMOS 12".into(),
            folded: "ramos 12".into(),
        };
        assert!(NameLine::from_line(&line, 64).is_none());
    }

    #[test]
    fn no_candidates_yield_empty_fields() {
        let out = assign("x");
        assert_eq!(out, NameAssignment::default());
    }
}
