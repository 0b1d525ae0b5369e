//! Field extraction: label-anchored patterns over recognised text.
//!
//! Each [`Field`] is found by a case-insensitive pattern anchored on the
//! field's printed label ("Vendor No.", "Serial Number", "S/N", "Part Name")
//! followed by an optional separator and the value. A single text can yield
//! several candidates; [`CandidatePool`] gathers them across pages and OCR
//! passes so [`crate::vote::majority_vote`] can pick one.
//!
//! Candidates are normalised before they are pooled so that two passes
//! reading `ab-12 ` and `AB-12.` vote for the same value.

use crate::output::FieldReport;
use crate::vote::majority_vote;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// The domain fields parsed from documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    VendorNumber,
    SerialNumber,
    PartName,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::VendorNumber, Field::SerialNumber, Field::PartName];

    /// JSON key for the field.
    pub fn key(self) -> &'static str {
        match self {
            Field::VendorNumber => "vendor_number",
            Field::SerialNumber => "serial_number",
            Field::PartName => "part_name",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Field::VendorNumber => &RE_VENDOR_NUMBER,
            Field::SerialNumber => &RE_SERIAL_NUMBER,
            Field::PartName => &RE_PART_NAME,
        }
    }

    fn index(self) -> usize {
        match self {
            Field::VendorNumber => 0,
            Field::SerialNumber => 1,
            Field::PartName => 2,
        }
    }
}

// ── Patterns ─────────────────────────────────────────────────────────────────

// A code is one token, optionally followed by single-space separated tokens
// that either carry a digit or are one or two capitals ("AB 12345", "4471 A").
macro_rules! code_pattern {
    ($label:literal) => {
        concat!(
            $label,
            r"\s*[:#.\-]?\s*([A-Z0-9][A-Z0-9/\-]*(?: (?:[A-Z0-9/\-]*[0-9][A-Z0-9/\-]*|(?-i:[A-Z]{1,2})\b))*)"
        )
    };
}

static RE_VENDOR_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(code_pattern!(r"(?i)\bvendor\s*(?:number|num\.?|no\.?|code|id|#)")).unwrap()
});

static RE_SERIAL_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(code_pattern!(
        r"(?i)(?:\bserial\s*(?:number|num\.?|no\.?|#)?|\bs\s*/\s*n\b)"
    ))
    .unwrap()
});

static RE_PART_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bpart\s*name\s*[:\-]?\s*([^\r\n]+)").unwrap());

/// Another label on the same line ends a part name. A bare word such as
/// "Serial" or "Vendor" is only a label when a number word or a separator
/// follows it.
static RE_NEXT_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\t| {3,}|\b(?:serial|vendor|part)\s*(?:number\b|num\b\.?|no\b\.?|code\b|id\b|#)|\bs\s*/\s*n\b|\b(?:serial|vendor|qty|quantity|rev|revision)\s*[:#]",
    )
    .unwrap()
});

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const MAX_PART_NAME_CHARS: usize = 80;

// ── Extraction ───────────────────────────────────────────────────────────────

/// Raw pattern matches for `field` in `text`, in order of appearance.
pub fn raw_candidates(text: &str, field: Field) -> Vec<String> {
    field
        .pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Normalised candidates for `field` in `text`.
pub fn extract_candidates(text: &str, field: Field) -> Vec<String> {
    raw_candidates(text, field)
        .iter()
        .filter_map(|raw| normalize(field, raw))
        .collect()
}

/// Normalise a raw match; `None` if nothing usable is left.
pub fn normalize(field: Field, raw: &str) -> Option<String> {
    match field {
        Field::VendorNumber | Field::SerialNumber => {
            let code: String = raw
                .trim()
                .trim_end_matches(|c: char| c.is_ascii_punctuation())
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_uppercase();
            // Codes always carry at least one digit; "Serial: NONE" is not one.
            if code.len() >= 3 && code.chars().any(|c| c.is_ascii_digit()) {
                Some(code)
            } else {
                None
            }
        }
        Field::PartName => {
            let line = match RE_NEXT_LABEL.find_iter(raw).find(|m| m.start() > 0) {
                Some(m) => &raw[..m.start()],
                None => raw,
            };
            let name = RE_WHITESPACE.replace_all(line.trim(), " ");
            let name = name
                .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
                .to_string();
            if name.is_empty()
                || name.chars().count() > MAX_PART_NAME_CHARS
                || !name.chars().any(char::is_alphabetic)
            {
                None
            } else {
                Some(name)
            }
        }
    }
}

// ── Pooling ──────────────────────────────────────────────────────────────────

/// Candidates for every field, gathered across pages and passes.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    by_field: [Vec<String>; 3],
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every field pattern over `text` and pool the results.
    pub fn add_text(&mut self, text: &str) {
        for field in Field::ALL {
            self.by_field[field.index()].extend(extract_candidates(text, field));
        }
    }

    pub fn candidates(&self, field: Field) -> &[String] {
        &self.by_field[field.index()]
    }

    /// Vote on every field.
    pub fn into_reports(self) -> Vec<FieldReport> {
        Field::ALL
            .iter()
            .zip(self.by_field)
            .map(|(&field, candidates)| {
                let winner = majority_vote(&candidates);
                FieldReport {
                    field,
                    value: winner.as_ref().map(|w| w.value.clone()),
                    votes: winner.map(|w| w.votes).unwrap_or(0),
                    candidates,
                }
            })
            .collect()
    }
}
