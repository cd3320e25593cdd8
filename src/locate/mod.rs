pub mod ktp;
pub mod npwp;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::classify::DocumentType;
use crate::normalize::FIELD_LABELS;

/// Why a single field has no value. Recovered locally: the field becomes
/// the sentinel and its siblings are still extracted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("FieldNotFound: {field}")]
    NotFound { field: &'static str },
    #[error("PositionalReadOutOfRange: {field} at {index} (len {len})")]
    OutOfRange {
        field: &'static str,
        index: usize,
        len: usize,
    },
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::NotFound { field } => field,
            FieldError::OutOfRange { field, .. } => field,
        }
    }
}

/// Values a locator pass found, plus one error per field it could not fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Located {
    values: Vec<(&'static str, String)>,
    missing: Vec<FieldError>,
}

impl Located {
    pub fn record(&mut self, field: &'static str, result: Result<String, FieldError>) {
        match result {
            Ok(value) if !value.trim().is_empty() => self.values.push((field, value)),
            Ok(_) => self.missing.push(FieldError::NotFound { field }),
            Err(e) => self.missing.push(e),
        }
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| *k == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn missing(&self) -> &[FieldError] {
        &self.missing
    }

    pub fn into_missing(self) -> Vec<FieldError> {
        self.missing
    }
}

/// Spelling variants OCR produces for labels, on top of the printed ones.
const LABEL_VARIANTS: &[&str] = &["Ke/Desa", "KelDesa", "RTRW", "PROPINSI"];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

pub fn locate(doc: DocumentType, tokens: &[String]) -> Located {
    match doc {
        DocumentType::Ktp => ktp::locate(tokens),
        DocumentType::Npwp => npwp::locate(tokens),
    }
}

/// True when the whole token is a field label rather than a value.
pub fn is_label(token: &str) -> bool {
    let token = token.trim();
    FIELD_LABELS
        .iter()
        .chain(LABEL_VARIANTS.iter())
        .any(|l| l.eq_ignore_ascii_case(token))
}

pub(crate) fn position_exact(tokens: &[String], labels: &[&str]) -> Option<usize> {
    tokens
        .iter()
        .position(|t| labels.iter().any(|l| l.eq_ignore_ascii_case(t.trim())))
}

pub(crate) fn position_containing(tokens: &[String], needles: &[&str]) -> Option<usize> {
    tokens.iter().position(|t| {
        let upper = t.to_uppercase();
        needles.iter().any(|n| upper.contains(&n.to_uppercase()))
    })
}

pub(crate) fn read_at(tokens: &[String], index: usize, field: &'static str) -> Result<String, FieldError> {
    tokens.get(index).cloned().ok_or(FieldError::OutOfRange {
        field,
        index,
        len: tokens.len(),
    })
}

/// Like `read_at`, but a label sitting where a value should be counts as
/// a missing value.
pub(crate) fn read_value_at(tokens: &[String], index: usize, field: &'static str) -> Result<String, FieldError> {
    let value = read_at(tokens, index, field)?;
    if is_label(&value) {
        return Err(FieldError::NotFound { field });
    }
    Ok(value)
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Join `tokens[start..]` into one whitespace-collapsed string.
pub(crate) fn join_from(tokens: &[String], start: usize, field: &'static str) -> Result<String, FieldError> {
    if start >= tokens.len() {
        return Err(FieldError::OutOfRange {
            field,
            index: start,
            len: tokens.len(),
        });
    }
    Ok(collapse_whitespace(&tokens[start..].join(" ")))
}
