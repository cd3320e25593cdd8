use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use globwalk::GlobWalkerBuilder;
use tempfile::TempDir;
use thiserror::Error;

use crate::process::{run_with_timeout, Finished};

#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("ToolMissing: {0}")]
    ToolMissing(String),
    #[error("EncryptedPDF: {0}")]
    EncryptedPdf(String),
    #[error("Timeout: pdftoppm exceeded {0}s")]
    Timeout(u64),
    #[error("RasterizeError: {0}")]
    Failed(String),
    #[error("NoPages: {0}")]
    NoPages(String),
}

/// Page images of one PDF, in page order. The backing directory is removed
/// when this value is dropped.
#[derive(Debug)]
pub struct PageImages {
    _dir: TempDir,
    pages: Vec<PathBuf>,
}

impl PageImages {
    pub fn pages(&self) -> &[PathBuf] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Render every page of `pdf` to PNG with Poppler's `pdftoppm`, inside a
/// fresh directory under `scratch_dir`.
pub fn rasterize_pdf(pdf: &Path, scratch_dir: &Path, dpi: u32, timeout: Duration) -> Result<PageImages, RasterizeError> {
    if which::which("pdftoppm").is_err() {
        return Err(RasterizeError::ToolMissing("pdftoppm".into()));
    }
    std::fs::create_dir_all(scratch_dir).map_err(|e| RasterizeError::Failed(e.to_string()))?;
    let dir = tempfile::Builder::new()
        .prefix("pages-")
        .tempdir_in(scratch_dir)
        .map_err(|e| RasterizeError::Failed(e.to_string()))?;

    let mut cmd = Command::new("pdftoppm");
    cmd.arg("-r")
        .arg(dpi.to_string())
        .arg("-png")
        .arg(pdf)
        .arg(dir.path().join("page"));

    match run_with_timeout(&mut cmd, timeout).map_err(|e| RasterizeError::Failed(e.to_string()))? {
        Finished::TimedOut => return Err(RasterizeError::Timeout(timeout.as_secs())),
        Finished::Exited { status, stderr } if !status.success() => {
            let err = stderr.to_lowercase();
            if err.contains("encrypt") || err.contains("password") {
                return Err(RasterizeError::EncryptedPdf(pdf.display().to_string()));
            }
            return Err(RasterizeError::Failed(format!(
                "pdftoppm exited with {}",
                status.code().unwrap_or(-1)
            )));
        }
        Finished::Exited { .. } => {}
    }

    let pages = collect_pages(dir.path());
    if pages.is_empty() {
        return Err(RasterizeError::NoPages(pdf.display().to_string()));
    }
    Ok(PageImages { _dir: dir, pages })
}

/// `page-1.png`, `page-02.png`, … ordered by page number. pdftoppm pads
/// the number to the width of the page count, so sort numerically.
pub(crate) fn collect_pages(dir: &Path) -> Vec<PathBuf> {
    let walker = match GlobWalkerBuilder::from_patterns(dir, &["page-*.png"])
        .max_depth(1)
        .build()
    {
        Ok(w) => w,
        Err(_) => return Vec::new(),
    };
    let mut pages: Vec<(usize, PathBuf)> = walker
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path().to_path_buf();
            let number = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.rsplit('-').next())
                .and_then(|n| n.parse::<usize>().ok())?;
            Some((number, path))
        })
        .collect();
    pages.sort();
    pages.into_iter().map(|(_, p)| p).collect()
}
