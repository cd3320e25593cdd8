use std::path::Path;

use thiserror::Error;

pub mod classify;
pub mod config;
pub mod deps;
pub mod emit;
pub mod enumerate;
pub mod locate;
pub mod normalize;
pub mod ocr;
mod process;
pub mod rasterize;
pub mod record;

pub use classify::{classify, classify_with_votes, DocumentType, Votes};
pub use config::{load_config, ExtractConfig, OcrSettings};
pub use deps::{check_deps, nala_help_for, DepsResult};
pub use locate::{FieldError, Located};
pub use normalize::normalize_tokens;
pub use ocr::{OcrEngine, OcrError, RawToken, TesseractEngine};
pub use rasterize::{rasterize_pdf, RasterizeError};
pub use record::{assemble, FieldRecord, NOT_AVAILABLE};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("UnsupportedFileType: {0}")]
    UnsupportedFileType(String),
    #[error("FileNotFound: {0}")]
    FileNotFound(String),
    #[error("MalformedInput: {0}")]
    MalformedInput(String),
    #[error(transparent)]
    Rasterize(#[from] RasterizeError),
    #[error(transparent)]
    Ocr(OcrError),
}

impl From<OcrError> for ExtractError {
    fn from(err: OcrError) -> Self {
        match err {
            OcrError::MalformedOutput(msg) => ExtractError::MalformedInput(msg),
            other => ExtractError::Ocr(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
}

impl FileKind {
    /// Decide by extension, ignoring case: `pdf`, or `png`/`jpg`/`jpeg`.
    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => Ok(FileKind::Pdf),
            "png" | "jpg" | "jpeg" => Ok(FileKind::Image),
            _ => Err(ExtractError::UnsupportedFileType(path.display().to_string())),
        }
    }
}

/// Everything one extraction produced: the record plus what it was built
/// from and which fields fell back to the sentinel.
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub document_type: DocumentType,
    pub votes: Votes,
    pub record: FieldRecord,
    pub missing: Vec<FieldError>,
    pub tokens: Vec<String>,
    pub page_count: usize,
}

/// Stages after OCR: normalize, classify, locate, assemble. Pure.
pub fn extract_from_tokens(raw: &[RawToken]) -> ExtractionReport {
    let tokens = normalize_tokens(raw);
    let (document_type, votes) = classify_with_votes(&tokens);
    let located = locate::locate(document_type, &tokens);
    let record = assemble(document_type, &located);
    ExtractionReport {
        document_type,
        votes,
        record,
        missing: located.into_missing(),
        tokens,
        page_count: 0,
    }
}

/// Full pipeline for one uploaded file. PDFs are rasterized into a
/// temporary directory under `scratch_dir` that is gone once this returns.
pub fn extract_document(
    path: &Path,
    scratch_dir: &Path,
    engine: &dyn OcrEngine,
    settings: &OcrSettings,
) -> Result<ExtractionReport, ExtractError> {
    let kind = FileKind::from_path(path)?;
    if !path.is_file() {
        return Err(ExtractError::FileNotFound(path.display().to_string()));
    }

    let (raw, page_count) = match kind {
        FileKind::Image => (engine.recognize(path)?, 1),
        FileKind::Pdf => {
            let pages = rasterize_pdf(path, scratch_dir, settings.dpi, settings.timeout())?;
            let mut raw = Vec::new();
            for page in pages.pages() {
                raw.extend(engine.recognize(page)?);
            }
            (raw, pages.len())
        }
    };

    let mut report = extract_from_tokens(&raw);
    report.page_count = page_count;
    Ok(report)
}

/// Record only; see [`extract_document`].
pub fn extract_fields(
    path: &Path,
    scratch_dir: &Path,
    engine: &dyn OcrEngine,
    settings: &OcrSettings,
) -> Result<FieldRecord, ExtractError> {
    extract_document(path, scratch_dir, engine, settings).map(|r| r.record)
}
