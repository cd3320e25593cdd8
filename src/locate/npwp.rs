use once_cell::sync::Lazy;
use regex::Regex;

use super::{join_from, position_exact, read_value_at, FieldError, Located};
use crate::normalize::drop_office_codes;

/// Tax-office letterhead lines, compared with whitespace removed and
/// upper-cased. Includes the spellings OCR produces most often.
pub const LETTERHEAD_PHRASES: &[&str] = &[
    "KEMENTERIANKEUANGANREPUBLIKINDONESIA",
    "KEMENTERIANKEUANGANREPUBLKINDONESIA",
    "DIREKTORATJENDERALPAJAK",
    "DIREKTORATJENDERGALPAJAK",
];

static LABELED_TAX_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:NPWP|NP4P)[\s.]*(\d{2}\.?\d{3}\.?\d{3}\.?\d-?\d{3}\.?\d{3})(?:\D|$)").unwrap()
});
static DOTTED_TAX_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(\d{2}\.\d{3}\.\d{3}\.\d-\d{3}\.\d{3})(?:\D|$)").unwrap()
});
static COMPACT_TAX_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\D)(\d{15})(?:\D|$)").unwrap());
static FUSED_LABEL_TAX_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:npwp|np4p)[\s.]*(\d{2}\.\d{3}\.\d{3}\.\d-\d{3}\.\d{3})$").unwrap()
});
static FUSED_LABEL_NIK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:NP4P|NPWP)(\d{16,})$").unwrap());
static REGISTRATION_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:TGL\s*TERDAFTAR|TGL\s*DAFTAR|TCLTEROATA)").unwrap()
});

fn squash_upper(token: &str) -> String {
    token
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

pub fn is_letterhead(token: &str) -> bool {
    LETTERHEAD_PHRASES.contains(&squash_upper(token).as_str())
}

pub fn has_letterhead(tokens: &[String]) -> bool {
    tokens.iter().any(|t| is_letterhead(t))
}

/// Re-punctuate fifteen digits as `XX.XXX.XXX.X-XXX.XXX`.
pub fn canonical_tax_id(raw: &str) -> Option<String> {
    let d: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if d.len() != 15 {
        return None;
    }
    Some(format!(
        "{}.{}.{}.{}-{}.{}",
        &d[..2],
        &d[2..5],
        &d[5..8],
        &d[8..9],
        &d[9..12],
        &d[12..]
    ))
}

/// Tax ID carried by a single token, in any of its surface forms.
pub fn tax_id_in(token: &str) -> Option<String> {
    [&*LABELED_TAX_ID, &*DOTTED_TAX_ID, &*COMPACT_TAX_ID]
        .iter()
        .find_map(|re| re.captures(token))
        .and_then(|c| canonical_tax_id(&c[1]))
}

/// First token carrying a tax ID, with its index and canonical form.
pub fn find_tax_id(tokens: &[String]) -> Option<(usize, String)> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !is_letterhead(t))
        .find_map(|(i, t)| tax_id_in(t).map(|id| (i, id)))
}

pub fn locate(tokens: &[String]) -> Located {
    let tokens = drop_office_codes(tokens);
    if has_letterhead(&tokens) {
        locate_letterhead(&tokens)
    } else {
        locate_plain(&tokens)
    }
}

fn tax_label_position(tokens: &[String]) -> Option<usize> {
    tokens.iter().position(|t| {
        let upper = t.to_uppercase();
        upper.contains("NPWP") || upper.contains("NP4P")
    })
}

fn without_registration_dates(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !REGISTRATION_DATE.is_match(t.trim()))
        .cloned()
        .collect()
}

/// Certificate printed on tax-office letterhead.
pub fn locate_letterhead(tokens: &[String]) -> Located {
    let tokens: Vec<String> = without_registration_dates(
        &tokens.iter().filter(|t| !is_letterhead(t)).cloned().collect::<Vec<_>>(),
    );
    let mut located = Located::default();

    let tax_id = find_tax_id(&tokens);
    located.record(
        "NPWP",
        tax_id
            .as_ref()
            .map(|(_, id)| id.clone())
            .ok_or(FieldError::NotFound { field: "NPWP" }),
    );

    let label = tax_label_position(&tokens);
    let nik = position_exact(&tokens, &["NIK"]);

    // Anchor the name on the token holding the number when we have one;
    // otherwise fall back to fixed offsets from the label.
    let name_index = match (label, &tax_id) {
        (Some(l), Some((v, _))) if *v == l || *v == l + 1 => Some(*v + 1),
        (Some(l), _) => Some(if nik.is_some() { l + 2 } else { l + 1 }),
        (None, _) => None,
    }
    .map(|i| skip_name_label(&tokens, i));

    located.record(
        "Nama",
        name_index
            .ok_or(FieldError::NotFound { field: "Nama" })
            .and_then(|i| read_value_at(&tokens, i, "Nama")),
    );

    match nik {
        Some(n) => {
            located.record("NIK", read_value_at(&tokens, n + 1, "NIK"));
            located.record("Alamat", join_from(&tokens, n + 2, "Alamat"));
        }
        None => {
            located.record("NIK", Err(FieldError::NotFound { field: "NIK" }));
            let start = name_index.map(|i| i + 1).or(label.map(|l| l + 2));
            located.record(
                "Alamat",
                start
                    .ok_or(FieldError::NotFound { field: "Alamat" })
                    .and_then(|s| join_from(&tokens, s, "Alamat")),
            );
        }
    }
    located.record("Kel/Desa", Err(FieldError::NotFound { field: "Kel/Desa" }));
    located.record("Kota/Kab", Err(FieldError::NotFound { field: "Kota/Kab" }));
    located
}

fn skip_name_label(tokens: &[String], index: usize) -> usize {
    match tokens.get(index) {
        Some(t) if t.trim().eq_ignore_ascii_case("Nama") => index + 1,
        _ => index,
    }
}

/// `npwp12.345.678.9-012.345`, `NPWP 12.345…` or `NP4P.12.345…` ->
/// `npwp`, `12.345.678.9-012.345`.
pub fn split_fused_tax_label(tokens: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match FUSED_LABEL_TAX_ID.captures(token) {
            Some(c) => {
                out.push("npwp".to_string());
                out.push(c[1].to_string());
            }
            None => out.push(token.clone()),
        }
    }
    out
}

/// A label fused with a 16+ digit run is the NIK line: emit a `NIK` label
/// and the trailing sixteen digits as its value.
pub fn split_fused_nik(tokens: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match FUSED_LABEL_NIK.captures(token) {
            Some(c) => {
                let digits = &c[1];
                out.push("NIK".to_string());
                out.push(digits[digits.len() - 16..].to_string());
            }
            None => out.push(token.clone()),
        }
    }
    out
}

/// Plain card without letterhead. Fields sit at fixed offsets from the
/// `npwp` and `nik` labels.
pub fn locate_plain(tokens: &[String]) -> Located {
    let tokens = split_fused_nik(&split_fused_tax_label(&without_registration_dates(tokens)));
    let npwp = tokens.iter().position(|t| t.trim().eq_ignore_ascii_case("npwp"));
    let nik = tokens.iter().position(|t| t.trim().eq_ignore_ascii_case("nik"));
    let mut located = Located::default();

    let tax_id = match npwp {
        Some(p) => read_value_at(&tokens, p + 1, "NPWP").map(|raw| canonical_tax_id(&raw).unwrap_or(raw)),
        None => find_tax_id(&tokens)
            .map(|(_, id)| id)
            .ok_or(FieldError::NotFound { field: "NPWP" }),
    };
    located.record("NPWP", tax_id);
    located.record(
        "Nama",
        npwp.ok_or(FieldError::NotFound { field: "Nama" })
            .and_then(|p| read_value_at(&tokens, p + 2, "Nama")),
    );

    match nik {
        Some(n) => {
            located.record("NIK", read_value_at(&tokens, n + 1, "NIK"));
            located.record("Alamat", read_value_at(&tokens, n + 2, "Alamat"));
            located.record("Kel/Desa", read_value_at(&tokens, n + 3, "Kel/Desa"));
            located.record("Kota/Kab", read_value_at(&tokens, n + 4, "Kota/Kab"));
        }
        None => {
            located.record("NIK", Err(FieldError::NotFound { field: "NIK" }));
            located.record(
                "Alamat",
                npwp.ok_or(FieldError::NotFound { field: "Alamat" })
                    .and_then(|p| join_from(&tokens, p + 3, "Alamat")),
            );
            located.record("Kel/Desa", Err(FieldError::NotFound { field: "Kel/Desa" }));
            located.record("Kota/Kab", Err(FieldError::NotFound { field: "Kota/Kab" }));
        }
    }
    located
}
