use std::path::{Path, PathBuf};

use globwalk::GlobWalkerBuilder;
use thiserror::Error;

use crate::FileKind;

#[derive(Debug, Error)]
pub enum EnumerateError {
    #[error("NoFilesFound")]
    NoFilesFound { guidance: String },
}

/// Enumerate supported documents (PDF, PNG, JPEG) using a glob pattern,
/// e.g. "./uploads/**/*". Returns a sorted list of paths.
pub fn enumerate_documents(glob_pattern: &str) -> Result<Vec<PathBuf>, EnumerateError> {
    let root = if Path::new(glob_pattern).is_absolute() { "/" } else { "." };
    let mut pat = glob_pattern.to_string();
    if pat.starts_with("./") {
        pat = pat.trim_start_matches("./").to_string();
    }
    let mut paths: Vec<PathBuf> = GlobWalkerBuilder::from_patterns(root, &[pat.as_str()])
        .case_insensitive(true)
        .follow_links(false)
        .build()
        .map_err(|_| EnumerateError::NoFilesFound { guidance: folder_guidance() })?
        .filter_map(|e| e.ok())
        .map(|e| e.path().to_path_buf())
        .collect();

    paths.sort();
    paths.retain(|p| p.is_file() && FileKind::from_path(p).is_ok());

    if paths.is_empty() {
        return Err(EnumerateError::NoFilesFound { guidance: folder_guidance() });
    }

    Ok(paths)
}

/// Expand CLI inputs. Existing files are taken as given (so an unsupported
/// type is reported per file later); anything else is treated as a glob.
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>, EnumerateError> {
    let mut out: Vec<PathBuf> = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            out.push(path.to_path_buf());
            continue;
        }
        if let Ok(found) = enumerate_documents(input) {
            out.extend(found);
        }
    }
    let mut seen = std::collections::HashSet::new();
    out.retain(|p| seen.insert(p.clone()));
    if out.is_empty() {
        return Err(EnumerateError::NoFilesFound { guidance: folder_guidance() });
    }
    Ok(out)
}

fn folder_guidance() -> String {
    let guide = r#"Tidak ada berkas KTP/NPWP yang cocok.
Format yang didukung: .pdf, .png, .jpg, .jpeg
Contoh:
  idcard2json ./uploads/ktp-budi.jpg
  idcard2json "./uploads/**/*.pdf""#;
    guide.to_string()
}
