use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use idcard_fields::emit::{emit_record, sha256_file, DocIds};
use idcard_fields::enumerate::{resolve_inputs, EnumerateError};
use idcard_fields::{
    check_deps, extract_document, load_config, nala_help_for, DepsResult, ExtractError, FileKind, TesseractEngine,
};

/// Extract KTP / NPWP fields from scanned cards (PDF, PNG, JPEG) and print
/// one JSON record per document.
#[derive(Parser)]
#[command(name = "idcard2json", version)]
struct Cli {
    /// Files or glob patterns, e.g. "./uploads/**/*.pdf".
    #[arg(required = true)]
    inputs: Vec<String>,

    /// YAML settings file; defaults apply when it does not exist.
    #[arg(long, default_value = "idcard.yaml")]
    config: PathBuf,

    #[arg(long)]
    ocr_lang: Option<String>,

    #[arg(long)]
    ocr_dpi: Option<u32>,

    /// Seconds before a single OCR or rasterize call is abandoned.
    #[arg(long)]
    ocr_timeout: Option<u64>,

    /// Where PDF pages are rendered while a document is processed.
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Also write `<doc_id>.json` files here.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log the normalized tokens of every document.
    #[arg(long)]
    dump_tokens: bool,
}

fn main() {
    let cli = Cli::parse();

    // 1) Settings
    let mut cfg = match load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::json!({
                    "tool": "load_config",
                    "file": cli.config,
                    "error": e.to_string(),
                    "error_code": 3
                })
            );
            std::process::exit(3);
        }
    };
    if let Some(lang) = &cli.ocr_lang {
        cfg.ocr.lang = lang.clone();
    }
    if let Some(dpi) = cli.ocr_dpi {
        cfg.ocr.dpi = dpi;
    }
    if let Some(secs) = cli.ocr_timeout {
        cfg.ocr.timeout_secs = secs;
    }
    if let Some(dir) = &cli.scratch_dir {
        cfg.scratch_dir = dir.clone();
    }
    if cli.out.is_some() {
        cfg.output_dir = cli.out.clone();
    }
    if let Err(e) = cfg.validate() {
        eprintln!(
            "{}",
            serde_json::json!({ "tool": "load_config", "error": e.to_string(), "error_code": 3 })
        );
        std::process::exit(3);
    }
    eprintln!(
        "{}",
        serde_json::json!({
            "tool": "load_config",
            "status": "ok",
            "ocr": cfg.ocr,
            "scratch_dir": cfg.scratch_dir,
            "output_dir": cfg.output_dir
        })
    );

    // 2) External tools
    let deps: DepsResult = check_deps();
    if !deps.ok {
        eprintln!(
            "{}",
            serde_json::json!({ "tool": "check_deps", "missing": deps.missing, "error_code": 2 })
        );
        let help = nala_help_for(&deps.missing);
        if !help.is_empty() {
            eprintln!("{}", help);
        }
        std::process::exit(2);
    }
    eprintln!(
        "{}",
        serde_json::json!({ "tool": "check_deps", "status": "ok", "missing": deps.missing })
    );

    // 3) Inputs
    let files = match resolve_inputs(&cli.inputs) {
        Ok(files) => files,
        Err(EnumerateError::NoFilesFound { guidance }) => {
            eprintln!(
                "{}",
                serde_json::json!({ "tool": "resolve_inputs", "error": "NoFilesFound", "error_code": 4 })
            );
            eprintln!("{}", guidance);
            std::process::exit(4);
        }
    };
    eprintln!(
        "{}",
        serde_json::json!({ "tool": "resolve_inputs", "count": files.len() })
    );

    let engine = TesseractEngine::new(cfg.ocr.clone());
    let mut doc_ids = DocIds::default();
    let mut exit_code = 0;

    // 4) One document at a time
    for file in files {
        if matches!(FileKind::from_path(&file), Ok(FileKind::Pdf)) && !deps.can_rasterize() {
            eprintln!(
                "{}",
                serde_json::json!({ "tool": "rasterize_pdf", "file": file, "error": "ToolMissing: pdftoppm", "error_code": 1 })
            );
            if exit_code == 0 {
                exit_code = 1;
            }
            continue;
        }
        if let Err(code) = process_file(&file, &cfg, &engine, &mut doc_ids, cli.dump_tokens) {
            if exit_code == 0 {
                exit_code = code;
            }
        }
    }

    std::process::exit(exit_code);
}

fn process_file(
    file: &Path,
    cfg: &idcard_fields::ExtractConfig,
    engine: &TesseractEngine,
    doc_ids: &mut DocIds,
    dump_tokens: bool,
) -> Result<(), i32> {
    let started = Instant::now();
    let report = match extract_document(file, &cfg.scratch_dir, engine, &cfg.ocr) {
        Ok(r) => r,
        Err(err) => {
            let label = match &err {
                ExtractError::UnsupportedFileType(_) => "UnsupportedFileType",
                ExtractError::FileNotFound(_) => "FileNotFound",
                ExtractError::MalformedInput(_) => "MalformedInput",
                ExtractError::Rasterize(_) => "RasterizeError",
                ExtractError::Ocr(_) => "OcrError",
            };
            eprintln!(
                "{}",
                serde_json::json!({
                    "tool": "extract_document",
                    "file": file,
                    "error": label,
                    "detail": err.to_string(),
                    "error_code": 1
                })
            );
            return Err(1);
        }
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if dump_tokens {
        eprintln!(
            "{}",
            serde_json::json!({ "tool": "normalize_tokens", "file": file, "tokens": report.tokens })
        );
    }
    eprintln!(
        "{}",
        serde_json::json!({
            "tool": "classify",
            "file": file,
            "pages": report.page_count,
            "tokens": report.tokens.len(),
            "document_type": report.document_type,
            "votes": report.votes
        })
    );
    let missing: Vec<String> = report.missing.iter().map(|e| e.to_string()).collect();
    if !missing.is_empty() {
        eprintln!(
            "{}",
            serde_json::json!({ "tool": "locate_fields", "file": file, "level": "warn", "missing": missing })
        );
    }

    println!(
        "{}",
        serde_json::json!({ "file": file, "result": report.record })
    );

    let Some(outdir) = &cfg.output_dir else {
        return Ok(());
    };
    let doc_id = doc_ids.next_for(file);
    let source_sha256 = match sha256_file(file) {
        Ok(hex) => hex,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::json!({ "tool": "source_sha256", "file": file, "error": e.to_string(), "error_code": 1 })
            );
            return Err(1);
        }
    };
    let payload = serde_json::json!({
        "result": report.record,
        "meta": {
            "doc_id": doc_id,
            "source": file,
            "source_sha256": source_sha256,
            "document_type": report.document_type,
            "missing": missing,
            "page_count": report.page_count,
            "elapsed_ms": elapsed_ms
        }
    });
    match emit_record(&payload, outdir, &doc_id) {
        Ok(paths) => {
            eprintln!(
                "{}",
                serde_json::json!({ "tool": "emit_record", "file": file, "json_path": paths.json_path })
            );
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::json!({ "tool": "emit_record", "file": file, "error": e.to_string(), "error_code": 6 })
            );
            Err(6)
        }
    }
}
