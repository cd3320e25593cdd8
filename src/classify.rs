use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    /// Kartu Tanda Penduduk, the national identity card.
    Ktp,
    /// Nomor Pokok Wajib Pajak, the taxpayer card.
    Npwp,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Ktp => write!(f, "KTP"),
            DocumentType::Npwp => write!(f, "NPWP"),
        }
    }
}

pub const KTP_KEYWORDS: &[&str] = &["NIK", "PROVINSI", "KABUPATEN", "NAMA"];

/// Compared with whitespace removed, so spaced and merged letterhead
/// variants both count.
pub const NPWP_KEYWORDS: &[&str] = &[
    "NPWP",
    "DDJP",
    "KPP",
    "KEMENTERIANKEUANGANREPUBLIKINDONESIA",
    "KEMENTERIANKEUANGANREPUBLKINDONESIA",
    "DIREKTORATJENDERALPAJAK",
];

static TAX_ID_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)\d{2}[.\-]\d{3}[.\-]\d{3}[.\-]\d[.\-]\d{3}[.\-]\d{3}(?:\D|$)").unwrap()
});

fn squash_upper(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Vote counts behind a classification, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub ktp: usize,
    pub npwp: usize,
    pub tax_id_seen: bool,
}

pub fn count_votes(tokens: &[String]) -> Votes {
    let ktp = tokens
        .iter()
        .filter(|t| KTP_KEYWORDS.contains(&t.trim().to_uppercase().as_str()))
        .count();
    let npwp = tokens
        .iter()
        .filter(|t| NPWP_KEYWORDS.contains(&squash_upper(t).as_str()))
        .count();
    let tax_id_seen = TAX_ID_SHAPE.is_match(&tokens.join(" "));
    Votes { ktp, npwp, tax_id_seen }
}

/// A tax-ID-shaped number anywhere wins; otherwise keyword votes decide and
/// ties (or silence) fall back to KTP.
pub fn classify(tokens: &[String]) -> DocumentType {
    classify_with_votes(tokens).0
}

/// [`classify`] plus the votes that decided it.
pub fn classify_with_votes(tokens: &[String]) -> (DocumentType, Votes) {
    let votes = count_votes(tokens);
    let doc = if votes.tax_id_seen || votes.npwp > votes.ktp {
        DocumentType::Npwp
    } else {
        DocumentType::Ktp
    };
    (doc, votes)
}
