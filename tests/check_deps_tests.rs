use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::sync::Mutex;

use idcard_fields::{check_deps, nala_help_for};

// PATH is process-wide; tests in this file take turns.
static PATH_LOCK: Mutex<()> = Mutex::new(());

fn set_path(dir: &std::path::Path) {
    std::env::set_var("PATH", dir.display().to_string());
}

fn fake_tool(dir: &std::path::Path, name: &str) {
    let fake_bin = dir.join(name);
    fs::write(&fake_bin, "#!/bin/sh\nexit 0\n").unwrap();
    let mut perms = fs::metadata(&fake_bin).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&fake_bin, perms).unwrap();
}

#[test]
fn check_deps_ok_when_tesseract_present() {
    let _guard = PATH_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let td = tempfile::tempdir().unwrap();
    fake_tool(td.path(), "tesseract");

    set_path(td.path());
    let res = check_deps();
    assert!(res.ok, "tesseract present should yield ok");
    // pdftoppm is only needed for PDFs
    assert_eq!(res.missing, vec!["pdftoppm".to_string()]);
    assert!(!res.can_rasterize());
}

#[test]
fn check_deps_all_present() {
    let _guard = PATH_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let td = tempfile::tempdir().unwrap();
    fake_tool(td.path(), "tesseract");
    fake_tool(td.path(), "pdftoppm");

    set_path(td.path());
    let res = check_deps();
    assert!(res.ok);
    assert!(res.missing.is_empty());
    assert!(res.can_rasterize());
}

#[test]
fn check_deps_missing_required_dep() {
    let _guard = PATH_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let td = tempfile::tempdir().unwrap();
    set_path(td.path()); // empty PATH
    let res = check_deps();
    assert!(!res.ok, "missing tesseract should not be ok");
    assert!(res.missing.iter().any(|m| m == "tesseract"));

    let help = nala_help_for(&res.missing);
    assert!(help.contains("tesseract-ocr-ind"));
    assert!(help.contains("poppler-utils"));
}

#[test]
fn nala_help_empty_when_nothing_missing() {
    assert_eq!(nala_help_for(&[]), "");
}
