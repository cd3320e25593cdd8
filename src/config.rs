use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language pack(s), e.g. `ind` or `ind+eng`.
    pub lang: String,
    pub psm: u8,
    pub oem: u8,
    /// Rasterization DPI for PDF pages.
    pub dpi: u32,
    /// Upper bound for a single rasterize or OCR call.
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        OcrSettings {
            lang: "ind".to_string(),
            psm: 11,
            oem: 1,
            dpi: 300,
            timeout_secs: 60,
        }
    }
}

impl OcrSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub ocr: OcrSettings,
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("./images")
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            ocr: OcrSettings::default(),
            scratch_dir: default_scratch_dir(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ocr.lang.trim().is_empty() {
            return Err(ConfigError::Invalid("ocr.lang is empty".into()));
        }
        if self.ocr.dpi < 72 {
            return Err(ConfigError::Invalid(format!("ocr.dpi {} is below 72", self.ocr.dpi)));
        }
        if self.ocr.timeout_secs == 0 {
            return Err(ConfigError::Invalid("ocr.timeout_secs must be positive".into()));
        }
        if self.ocr.psm > 13 {
            return Err(ConfigError::Invalid(format!("ocr.psm {} out of range 0..=13", self.ocr.psm)));
        }
        if self.ocr.oem > 3 {
            return Err(ConfigError::Invalid(format!("ocr.oem {} out of range 0..=3", self.ocr.oem)));
        }
        Ok(())
    }
}

pub fn parse_config(raw: &str) -> Result<ExtractConfig, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(ExtractConfig::default());
    }
    let cfg: ExtractConfig = serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load settings from YAML. A missing file means defaults.
pub fn load_config(path: &Path) -> Result<ExtractConfig, ConfigError> {
    if !path.exists() {
        return Ok(ExtractConfig::default());
    }
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
    parse_config(&raw)
}
