use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DepsResult {
    pub ok: bool,
    pub missing: Vec<String>,
}

impl DepsResult {
    pub fn can_rasterize(&self) -> bool {
        !self.missing.iter().any(|m| m == "pdftoppm")
    }
}

/// Check external CLI tools.
/// - Required: tesseract (OCR)
/// - Needed for PDF input only: pdftoppm (Poppler)
/// `ok` is true iff the required tools are present.
pub fn check_deps() -> DepsResult {
    let mut missing = Vec::new();

    let has_tesseract = which::which("tesseract").is_ok();
    if !has_tesseract {
        missing.push("tesseract".to_string());
    }
    if which::which("pdftoppm").is_err() {
        missing.push("pdftoppm".to_string());
    }

    DepsResult { ok: has_tesseract, missing }
}

/// Render Nala installation help for missing deps.
pub fn nala_help_for(missing: &[String]) -> String {
    let mut pkgs: Vec<&str> = Vec::new();
    if missing.iter().any(|m| m == "tesseract") {
        pkgs.push("tesseract-ocr");
        pkgs.push("tesseract-ocr-ind");
    }
    if missing.iter().any(|m| m == "pdftoppm") {
        pkgs.push("poppler-utils");
    }

    if pkgs.is_empty() {
        return String::new();
    }

    format!(
        "Dependency missing. Install via Nala:\n  sudo nala install {}",
        pkgs.join(" ")
    )
}
