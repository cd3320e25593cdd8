use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("WriteFailed: {0}")]
    WriteFailed(String),
    #[error("ReadFailed: {0}")]
    ReadFailed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitPaths {
    pub json_path: String,
}

/// Atomically write `<doc_id>.json` into `outdir` (temp file, then rename).
pub fn emit_record(payload: &serde_json::Value, outdir: &Path, doc_id: &str) -> Result<EmitPaths, EmitError> {
    std::fs::create_dir_all(outdir).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    let json_path = outdir.join(format!("{}.json", doc_id));
    let tmp = json_path.with_extension(format!("json.tmp.{}", std::process::id()));

    let bytes = serde_json::to_vec_pretty(payload).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    std::fs::write(&tmp, bytes).map_err(|e| EmitError::WriteFailed(e.to_string()))?;
    std::fs::rename(&tmp, &json_path).map_err(|e| EmitError::WriteFailed(e.to_string()))?;

    Ok(EmitPaths { json_path: json_path.to_string_lossy().to_string() })
}

// Utility to compute sha256 hex
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    out.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Fingerprint of the file at `path`.
pub fn sha256_file(path: &Path) -> Result<String, EmitError> {
    let bytes = std::fs::read(path).map_err(|e| EmitError::ReadFailed(format!("{}: {}", path.display(), e)))?;
    Ok(sha256_hex(&bytes))
}

/// Lower-case, dash-separated ASCII slug; never empty.
pub fn slugify(base: &str) -> String {
    let lower = base.to_lowercase();
    let mut collapsed = String::with_capacity(lower.len());
    let mut prev_dash = true;
    for ch in lower.chars() {
        if ch.is_ascii_alphanumeric() {
            collapsed.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            collapsed.push('-');
            prev_dash = true;
        }
    }
    let trimmed = collapsed.trim_end_matches('-');
    if trimmed.is_empty() {
        "doc".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Hands out document ids unique within one run: `ktp`, `ktp-1`, `ktp-2`, …
#[derive(Debug, Default)]
pub struct DocIds {
    used: HashSet<String>,
}

impl DocIds {
    pub fn next_for(&mut self, path: &Path) -> String {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("doc");
        let slug = slugify(stem);
        if self.used.insert(slug.clone()) {
            return slug;
        }
        let mut i = 1;
        loop {
            let candidate = format!("{}-{}", slug, i);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("KTP  Budi__Santoso (scan)"), "ktp-budi-santoso-scan");
        assert_eq!(slugify("---"), "doc");
    }

    #[test]
    fn doc_ids_are_unique() {
        let mut ids = DocIds::default();
        assert_eq!(ids.next_for(Path::new("a/ktp.png")), "ktp");
        assert_eq!(ids.next_for(Path::new("b/ktp.pdf")), "ktp-1");
        assert_eq!(ids.next_for(Path::new("c/KTP.jpg")), "ktp-2");
    }
}
