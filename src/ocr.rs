use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::config::OcrSettings;
use crate::process::{run_with_timeout, Finished};

/// Text of one visual region, in reading order. No field semantics.
pub type RawToken = String;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("ToolMissing: {0}")]
    ToolMissing(String),
    #[error("Timeout: {engine} exceeded {secs}s on {image}")]
    Timeout {
        engine: &'static str,
        image: String,
        secs: u64,
    },
    #[error("OcrError: {0}")]
    Failed(String),
    #[error("MalformedOutput: {0}")]
    MalformedOutput(String),
}

/// Image in, ordered text regions out. Implementations hold no
/// per-document state, so one engine may serve concurrent pipeline runs.
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// An unreadable image yields an empty list, not an error.
    fn recognize(&self, image: &Path) -> Result<Vec<RawToken>, OcrError>;
}

/// Tesseract CLI in TSV mode, regrouped into text regions.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    settings: OcrSettings,
}

impl TesseractEngine {
    pub fn new(settings: OcrSettings) -> Self {
        TesseractEngine { settings }
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn recognize(&self, image: &Path) -> Result<Vec<RawToken>, OcrError> {
        if which::which("tesseract").is_err() {
            return Err(OcrError::ToolMissing("tesseract".into()));
        }
        let out_dir = tempfile::tempdir().map_err(|e| OcrError::Failed(e.to_string()))?;
        let out_base = out_dir.path().join("out");

        let mut cmd = Command::new("tesseract");
        cmd.arg(image)
            .arg(&out_base)
            .arg("-l")
            .arg(&self.settings.lang)
            .arg("--psm")
            .arg(self.settings.psm.to_string())
            .arg("--oem")
            .arg(self.settings.oem.to_string())
            .arg("tsv");

        let timeout = self.settings.timeout();
        match run_with_timeout(&mut cmd, timeout).map_err(|e| OcrError::Failed(format!("tesseract_spawn_error: {}", e)))? {
            Finished::TimedOut => {
                return Err(OcrError::Timeout {
                    engine: self.name(),
                    image: image.display().to_string(),
                    secs: timeout.as_secs(),
                })
            }
            Finished::Exited { status, stderr } if !status.success() => {
                return Err(OcrError::Failed(format!(
                    "tesseract_exit_{}: {}",
                    status.code().unwrap_or(-1),
                    stderr.trim()
                )));
            }
            Finished::Exited { .. } => {}
        }

        let bytes = std::fs::read(out_base.with_extension("tsv")).map_err(|e| OcrError::Failed(e.to_string()))?;
        let tsv = String::from_utf8(bytes).map_err(|e| OcrError::MalformedOutput(e.to_string()))?;
        Ok(parse_tsv_regions(&tsv))
    }
}

#[derive(Debug, Clone)]
struct Word {
    text: String,
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

/// Words of one physical row of the card, possibly gathered from several
/// tesseract lines that sit side by side.
#[derive(Debug)]
struct Row {
    page: u32,
    top: u32,
    bottom: u32,
    words: Vec<Word>,
}

impl Row {
    fn from_line(page: u32, words: Vec<Word>) -> Self {
        let top = words.iter().map(|w| w.top).min().unwrap_or(0);
        let bottom = words.iter().map(|w| w.top + w.height).max().unwrap_or(top);
        Row { page, top, bottom, words }
    }

    fn center(&self) -> u32 {
        self.top + (self.bottom - self.top) / 2
    }

    /// A line belongs to this row when its vertical center falls inside it.
    fn takes(&self, line: &Row) -> bool {
        line.page == self.page && line.center() >= self.top && line.center() <= self.bottom
    }
}

/// Group TSV word rows into text regions in reading order. Tesseract lines
/// are placed by their position on the page, not by block number, so a
/// label column and a value column recognised as separate blocks still
/// interleave row by row. Words on one row are split into separate
/// regions at wide horizontal gaps and at colons, which is where a card
/// label ends and its value begins.
pub fn parse_tsv_regions(tsv: &str) -> Vec<RawToken> {
    let mut lines: BTreeMap<(u32, u32, u32, u32), Vec<Word>> = BTreeMap::new();

    for (idx, row) in tsv.lines().enumerate() {
        if idx == 0 {
            continue;
        }
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 {
            continue;
        }
        if cols[0].parse::<u32>().unwrap_or(0) != 5 {
            continue;
        }
        let conf: f32 = cols[10].parse().unwrap_or(-1.0);
        let text = cols[11].trim();
        if text.is_empty() || conf < 0.0 {
            continue;
        }
        let num = |i: usize| cols[i].parse::<u32>().unwrap_or(0);
        lines
            .entry((num(1), num(2), num(3), num(4)))
            .or_default()
            .push(Word {
                text: text.to_string(),
                left: num(6),
                top: num(7),
                width: num(8),
                height: num(9),
            });
    }

    let mut lines: Vec<Row> = lines
        .into_iter()
        .map(|((page, ..), words)| Row::from_line(page, words))
        .collect();
    lines.sort_by_key(|l| (l.page, l.top, l.words.iter().map(|w| w.left).min().unwrap_or(0)));

    let mut rows: Vec<Row> = Vec::new();
    for line in lines {
        match rows.last_mut() {
            Some(row) if row.takes(&line) => row.words.extend(line.words),
            _ => rows.push(line),
        }
    }

    let mut regions = Vec::new();
    for mut row in rows {
        row.words.sort_by_key(|w| w.left);
        regions.extend(split_regions(&row.words));
    }
    regions
}

fn split_regions(words: &[Word]) -> Vec<RawToken> {
    if words.is_empty() {
        return Vec::new();
    }
    let mut heights: Vec<u32> = words.iter().map(|w| w.height).collect();
    heights.sort_unstable();
    let median_h = heights[heights.len() / 2].max(1) as f32;
    let gap_threshold = (median_h * 2.5).clamp(12.0, 160.0);

    let mut regions: Vec<RawToken> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut last_right = 0u32;
    let mut prev_ends_colon = false;

    for word in words {
        let gap = word.left.saturating_sub(last_right) as f32;
        let bare_colon = word.text == ":";
        let breaks = !current.is_empty()
            && (gap > gap_threshold || bare_colon || prev_ends_colon || word.text.starts_with(':'));
        if breaks {
            regions.push(current.join(" "));
            current.clear();
        }
        if !bare_colon {
            current.push(word.text.as_str());
        }
        prev_ends_colon = word.text.ends_with(':');
        last_right = last_right.max(word.left + word.width);
    }
    if !current.is_empty() {
        regions.push(current.join(" "));
    }
    regions
}
