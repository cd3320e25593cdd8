use once_cell::sync::Lazy;
use regex::Regex;

use super::{is_label, position_containing, position_exact, read_at, read_value_at, FieldError, Located};

pub const PROVINCE_LABELS: &[&str] = &["PROVINSI", "PROPINSI"];
pub const RT_RW_LABELS: &[&str] = &["RT/RW", "RTRW"];
pub const KEL_DESA_LABELS: &[&str] = &["Kel/Desa", "Ke/Desa"];

/// How the anchor token is recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Whole token equals one of the labels, ignoring ASCII case.
    Exact(&'static [&'static str]),
    /// Token contains one of the labels, ignoring case.
    Contains(&'static [&'static str]),
}

impl Anchor {
    pub fn find(&self, tokens: &[String]) -> Option<usize> {
        match self {
            Anchor::Exact(labels) => position_exact(tokens, labels),
            Anchor::Contains(labels) => position_containing(tokens, labels),
        }
    }
}

/// How the value is read once the anchor is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The token right after the label.
    Next,
    /// Fused into the label token, otherwise the next token.
    Province,
    /// The token after the province value.
    Regency,
    /// Fused remainder or next token, repaired as an RT/RW pair.
    RtRw,
    /// Tokens after the label up to the RT/RW label.
    AddressSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: &'static str,
    pub anchor: Anchor,
    pub strategy: Strategy,
}

pub const KTP_SCHEMA: &[FieldSpec] = &[
    FieldSpec { field: "Provinsi", anchor: Anchor::Contains(PROVINCE_LABELS), strategy: Strategy::Province },
    FieldSpec { field: "Kota/Kab", anchor: Anchor::Contains(PROVINCE_LABELS), strategy: Strategy::Regency },
    FieldSpec { field: "NIK", anchor: Anchor::Exact(&["NIK"]), strategy: Strategy::Next },
    FieldSpec { field: "Name", anchor: Anchor::Exact(&["Nama"]), strategy: Strategy::Next },
    FieldSpec { field: "Alamat", anchor: Anchor::Exact(&["Alamat"]), strategy: Strategy::AddressSpan },
    FieldSpec { field: "RT/RW", anchor: Anchor::Contains(RT_RW_LABELS), strategy: Strategy::RtRw },
    FieldSpec { field: "Kelurahan/Desa", anchor: Anchor::Exact(KEL_DESA_LABELS), strategy: Strategy::Next },
    FieldSpec { field: "Kecamatan", anchor: Anchor::Exact(&["Kecamatan"]), strategy: Strategy::Next },
];

static PROVINCE_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)PRO[VP]INSI").unwrap());
static RT_RW_KEYWORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)RT/?RW").unwrap());

/// Run every field of the KTP schema; one field failing never stops the rest.
pub fn locate(tokens: &[String]) -> Located {
    let mut located = Located::default();
    for spec in KTP_SCHEMA {
        located.record(spec.field, locate_field(spec, tokens));
    }
    located
}

pub fn locate_field(spec: &FieldSpec, tokens: &[String]) -> Result<String, FieldError> {
    let at = spec
        .anchor
        .find(tokens)
        .ok_or(FieldError::NotFound { field: spec.field })?;
    match spec.strategy {
        Strategy::Next => read_value_at(tokens, at + 1, spec.field),
        Strategy::Province => province_at(tokens, at, spec.field).map(|(value, _)| value),
        Strategy::Regency => regency_after(tokens, at, spec.field),
        Strategy::RtRw => rt_rw_at(tokens, at, spec.field),
        Strategy::AddressSpan => address_span(tokens, at, spec.field),
    }
}

/// Province value and the index of the token it was read from.
fn province_at(tokens: &[String], at: usize, field: &'static str) -> Result<(String, usize), FieldError> {
    let fused = PROVINCE_KEYWORD.replace_all(&tokens[at], "").trim().to_string();
    let (raw, index) = if fused.is_empty() {
        (read_value_at(tokens, at + 1, field)?, at + 1)
    } else {
        (fused, at)
    };
    Ok((fix_province(&raw), index))
}

/// Undo the one province merge OCR reliably produces.
pub fn fix_province(value: &str) -> String {
    let value = value.trim();
    if value.eq_ignore_ascii_case("DKIJAKARTA") {
        "DKI JAKARTA".to_string()
    } else {
        value.to_string()
    }
}

fn regency_after(tokens: &[String], at: usize, field: &'static str) -> Result<String, FieldError> {
    let (_, province_index) = province_at(tokens, at, field)?;
    let index = province_index + 1;
    let value = read_at(tokens, index, field)?;
    let bare_prefix = ["KOTA", "KABUPATEN", "KAB", "KAB."]
        .iter()
        .any(|p| p.eq_ignore_ascii_case(value.trim()));
    if bare_prefix {
        let rest = read_value_at(tokens, index + 1, field)?;
        return Ok(format!("{} {}", value.trim().to_uppercase(), rest.trim()));
    }
    if is_label(&value) {
        return Err(FieldError::NotFound { field });
    }
    Ok(value)
}

fn rt_rw_at(tokens: &[String], at: usize, field: &'static str) -> Result<String, FieldError> {
    let fused = RT_RW_KEYWORD.replace_all(&tokens[at], "").trim().to_string();
    let raw = if fused.chars().any(|c| c.is_ascii_digit()) {
        fused
    } else {
        read_value_at(tokens, at + 1, field)?
    };
    Ok(repair_rt_rw(&raw))
}

/// Re-split an RT/RW pair from its digits. Seven digits carry one spurious
/// middle digit; six split evenly; anything else is returned untouched.
pub fn repair_rt_rw(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        7 => format!("{}/{}", &digits[..3], &digits[4..]),
        6 => format!("{}/{}", &digits[..3], &digits[3..]),
        _ => raw.to_string(),
    }
}

fn address_span(tokens: &[String], at: usize, field: &'static str) -> Result<String, FieldError> {
    let start = at + 1;
    if start >= tokens.len() {
        return Err(FieldError::OutOfRange { field, index: start, len: tokens.len() });
    }
    let rest = &tokens[start..];
    let has_rt_rw = position_containing(rest, RT_RW_LABELS).is_some();
    let parts: Vec<&str> = rest
        .iter()
        .take_while(|t| {
            if has_rt_rw {
                !RT_RW_KEYWORD.is_match(t)
            } else {
                !is_label(t)
            }
        })
        .map(|t| t.trim())
        .collect();
    let address = parts.join(" ").trim().to_string();
    if address.is_empty() {
        return Err(FieldError::NotFound { field });
    }
    Ok(address)
}
