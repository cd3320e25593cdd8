use once_cell::sync::Lazy;
use regex::Regex;

/// Delimiter used to join raw OCR tokens into one blob and to split it back.
pub const FIELD_SEPARATOR: &str = ", ";

/// Printed field labels of a KTP card. A label glued to its value gets a
/// separator inserted after it.
pub const FIELD_LABELS: &[&str] = &[
    "Provinsi",
    "Tempat/Tgl Lahir",
    "Status Perkawinan",
    "Kewarganegaraan",
    "KOTA",
    "Gol.Darah",
    "Kel/Desa",
    "Kecamatan",
    "Agama",
    "Pekerjaan",
    "Alamat",
    "RT/RW",
    "Jenis Kelamin",
    "NIK",
    "Nama",
    "Berlaku Hingga",
];

/// A single pattern-substitution applied over the whole joined blob.
#[derive(Debug, Clone)]
pub struct RepairRule {
    pub name: String,
    pub pattern: Regex,
    pub replacement: String,
}

impl RepairRule {
    fn new(name: impl Into<String>, pattern: &str, replacement: &str) -> Self {
        RepairRule {
            name: name.into(),
            pattern: Regex::new(pattern).unwrap(),
            replacement: replacement.to_string(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        self.pattern.replace_all(text, self.replacement.as_str()).into_owned()
    }
}

// Order matters: the date repair expects labels to be split off already.
static REPAIR_RULES: Lazy<Vec<RepairRule>> = Lazy::new(|| {
    let mut rules = vec![
        RepairRule::new(
            "provinsi_misread",
            r"(?i)\bPRO[VP]IN[SC][IL1](?:\s+I\b)?\s*([A-Z])",
            "PROVINSI ${1}",
        ),
        RepairRule::new("seumur_hidup", r"(?i)\bSEUMURHIDUP\b", "SEUMUR HIDUP"),
    ];

    for label in FIELD_LABELS {
        rules.push(RepairRule::new(
            format!("label_gap:{}", label),
            &format!(r"(?i)\b({})([^\s,/])", regex::escape(label)),
            "${1}, ${2}",
        ));
    }

    rules.push(RepairRule::new(
        "admin_area_gap",
        r"\b(DAERAH|KABUPATEN|KOTA)([A-Z])",
        "${1} ${2}",
    ));
    rules.push(RepairRule::new(
        "caps_mixed_boundary",
        r"(\b[A-Z]+)([A-Z][a-z])",
        "${1} ${2}",
    ));
    rules.push(RepairRule::new(
        "split_date",
        r"\b(\d{2})(\d{2}-\d{4})\b",
        "${1}-${2}",
    ));
    rules.push(RepairRule::new(
        "laki_laki",
        r"(?i)\bLAKI[LRE]LAKI\b",
        "LAKI-LAKI",
    ));
    rules
});

static OFFICE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:EPP|KPP)\w*").unwrap());

/// The ordered repair rules, exposed so each can be exercised on its own.
pub fn repair_rules() -> &'static [RepairRule] {
    &REPAIR_RULES
}

/// Remove colons, trim, and drop tokens that end up empty.
pub fn clean_raw_tokens(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|t| t.replace(':', "").trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Apply every repair rule, in order, to the joined text.
pub fn repair_text(text: &str) -> String {
    REPAIR_RULES
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Split a repaired blob back into trimmed, non-empty field candidates.
pub fn split_fields(text: &str) -> Vec<String> {
    text.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Raw OCR tokens in reading order -> normalized field candidates.
pub fn normalize_tokens(raw: &[String]) -> Vec<String> {
    let blob = clean_raw_tokens(raw).join(FIELD_SEPARATOR);
    split_fields(&repair_text(&blob))
}

/// Drop tax-office stamp codes (`KPP…`, `EPP…`) that otherwise shift
/// positional reads on NPWP cards.
pub fn drop_office_codes(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !OFFICE_CODE.is_match(t))
        .cloned()
        .collect()
}
