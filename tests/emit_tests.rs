use std::fs;

use idcard_fields::emit::{emit_record, sha256_file, sha256_hex};
use idcard_fields::extract_from_tokens;

#[test]
fn emit_record_writes_ordered_json() {
    let raw: Vec<String> = ["PROVINSI", "DKIJAKARTA", "NIK", "3201234567890001", "Nama", "BUDI SANTOSO"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let report = extract_from_tokens(&raw);

    let td = tempfile::tempdir().unwrap();
    let outdir = td.path().join("out");
    let payload = serde_json::json!({
        "result": report.record,
        "meta": {
            "doc_id": "ktp-budi",
            "document_type": report.document_type,
            "source_sha256": sha256_hex(b"scan"),
        }
    });
    let paths = emit_record(&payload, &outdir, "ktp-budi").expect("emit ok");
    assert!(paths.json_path.ends_with("ktp-budi.json"));

    let written = fs::read_to_string(&paths.json_path).unwrap();
    let provinsi = written.find("\"Provinsi\"").unwrap();
    let kecamatan = written.find("\"Kecamatan\"").unwrap();
    assert!(provinsi < kecamatan);
    assert!(written.contains("\"document_type\": \"KTP\""));

    // no temp file left behind
    let names: Vec<String> = fs::read_dir(&outdir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["ktp-budi.json".to_string()]);
}

#[test]
fn emit_record_overwrites_same_id() {
    let td = tempfile::tempdir().unwrap();
    emit_record(&serde_json::json!({"n": 1}), td.path(), "doc").unwrap();
    let paths = emit_record(&serde_json::json!({"n": 2}), td.path(), "doc").unwrap();
    let v: serde_json::Value = serde_json::from_str(&fs::read_to_string(paths.json_path).unwrap()).unwrap();
    assert_eq!(v["n"], 2);
}

#[test]
fn sha256_hex_known_vector() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn sha256_file_reports_unreadable_source() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("scan.png");
    fs::write(&path, b"abc").unwrap();
    assert_eq!(sha256_file(&path).unwrap(), sha256_hex(b"abc"));

    let err = sha256_file(&td.path().join("gone.png")).unwrap_err();
    assert!(err.to_string().starts_with("ReadFailed"));
}
