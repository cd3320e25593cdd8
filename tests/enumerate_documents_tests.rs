use std::fs;
use std::path::PathBuf;

use idcard_fields::enumerate::{enumerate_documents, resolve_inputs};

#[test]
fn enumerate_documents_finds_supported_types_only() {
    let td = tempfile::tempdir().unwrap();
    let base = td.path();
    let dir = base.join("input/batch");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("ktp.JPG"), b"\xff\xd8").unwrap();
    fs::write(dir.join("npwp.pdf"), b"%PDF-1.4\n").unwrap();
    fs::write(dir.join("notes.txt"), b"ignore me").unwrap();

    let pattern = format!("{}/input/**/*", base.display());
    let files = enumerate_documents(&pattern).expect("should find files");
    let files: Vec<PathBuf> = files.into_iter().map(|p| p.strip_prefix(base).unwrap().to_path_buf()).collect();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].to_string_lossy(), "input/batch/ktp.JPG");
    assert_eq!(files[1].to_string_lossy(), "input/batch/npwp.pdf");
}

#[test]
fn enumerate_documents_empty_returns_error_with_guidance() {
    let td = tempfile::tempdir().unwrap();
    let pattern = format!("{}/input/**/*.pdf", td.path().display());
    let err = enumerate_documents(&pattern).err().expect("should be error");
    assert_eq!(format!("{}", err), "NoFilesFound");
}

#[test]
fn resolve_inputs_keeps_explicit_files_and_dedupes() {
    let td = tempfile::tempdir().unwrap();
    let png = td.path().join("scan.png");
    let odd = td.path().join("scan.bmp");
    fs::write(&png, b"\x89PNG").unwrap();
    fs::write(&odd, b"BM").unwrap();

    let inputs = vec![
        png.display().to_string(),
        odd.display().to_string(),
        format!("{}/*.png", td.path().display()),
    ];
    let files = resolve_inputs(&inputs).expect("inputs resolve");
    // explicit files pass through untouched so the type error is reported per file
    assert_eq!(files, vec![png, odd]);
}

#[test]
fn resolve_inputs_nothing_matches() {
    let td = tempfile::tempdir().unwrap();
    let inputs = vec![format!("{}/missing/*.jpg", td.path().display())];
    assert!(resolve_inputs(&inputs).is_err());
}
