use idcard_fields::locate::ktp::{fix_province, locate, repair_rt_rw};
use idcard_fields::locate::FieldError;
use idcard_fields::{assemble, extract_from_tokens, DocumentType, NOT_AVAILABLE};

fn toks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn card_without_kecamatan() -> Vec<String> {
    toks(&[
        "PROVINSI JAWA BARAT",
        "KABUPATEN BEKASI",
        "NIK",
        "3216061234560002",
        "Nama",
        "SITI AMINAH",
        "Alamat",
        "JL MERDEKA NO 5",
        "RT/RW",
        "003/007",
        "Kel/Desa",
        "SUKAMAJU",
        "Agama",
        "ISLAM",
    ])
}

#[test]
fn missing_kecamatan_leaves_other_fields_intact() {
    let located = locate(&card_without_kecamatan());
    let record = assemble(DocumentType::Ktp, &located);

    assert_eq!(record.get("Provinsi"), Some("JAWA BARAT"));
    assert_eq!(record.get("Kota/Kab"), Some("KABUPATEN BEKASI"));
    assert_eq!(record.get("NIK"), Some("3216061234560002"));
    assert_eq!(record.get("Name"), Some("SITI AMINAH"));
    assert_eq!(record.get("Alamat"), Some("JL MERDEKA NO 5"));
    assert_eq!(record.get("RT/RW"), Some("003/007"));
    assert_eq!(record.get("Kelurahan/Desa"), Some("SUKAMAJU"));
    assert_eq!(record.get("Kecamatan"), Some(NOT_AVAILABLE));

    assert_eq!(located.missing(), &[FieldError::NotFound { field: "Kecamatan" }]);
}

#[test]
fn record_keys_follow_schema_order() {
    let record = assemble(DocumentType::Ktp, &locate(&card_without_kecamatan()));
    let keys: Vec<&str> = record.iter().map(|(k, _)| k).collect();
    assert_eq!(
        keys,
        vec!["Provinsi", "Kota/Kab", "NIK", "Name", "Alamat", "RT/RW", "Kelurahan/Desa", "Kecamatan"]
    );
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.starts_with("{\"Provinsi\":\"JAWA BARAT\",\"Kota/Kab\""));
}

#[test]
fn address_runs_until_rt_rw_label() {
    let tokens = toks(&["Alamat", "JL MAWAR", "BLOK C2", "RT/RW", "001/002"]);
    let located = locate(&tokens);
    assert_eq!(located.value("Alamat"), Some("JL MAWAR BLOK C2"));
    assert_eq!(located.value("RT/RW"), Some("001/002"));
}

#[test]
fn address_without_rt_rw_stops_at_next_label() {
    let tokens = toks(&["Alamat", "JL MAWAR 3", "Kel/Desa", "SUKAMAJU"]);
    let located = locate(&tokens);
    assert_eq!(located.value("Alamat"), Some("JL MAWAR 3"));
    assert_eq!(located.value("Kelurahan/Desa"), Some("SUKAMAJU"));
}

#[test]
fn rt_rw_fused_into_label_and_spelling_variant() {
    let located = locate(&toks(&["RTRW 0040011"]));
    assert_eq!(located.value("RT/RW"), Some("004/011"));
}

#[test]
fn rt_rw_repair_by_digit_count() {
    // seven digits: the fourth one is noise
    assert_eq!(repair_rt_rw("123x4567"), "123/567");
    assert_eq!(repair_rt_rw("123456"), "123/456");
    assert_eq!(repair_rt_rw("12/3"), "12/3");
    assert_eq!(repair_rt_rw("003/007"), "003/007");
}

#[test]
fn province_merge_repair() {
    assert_eq!(fix_province("DKIJAKARTA"), "DKI JAKARTA");
    let report = extract_from_tokens(&toks(&["PROVINSIDKIJAKARTA", "NIK", "3174012345670001"]));
    assert_eq!(report.record.get("Provinsi"), Some("DKI JAKARTA"));
}

#[test]
fn bare_city_prefix_joins_following_token() {
    let report = extract_from_tokens(&toks(&["PROVINSI JAWA BARAT", "KOTABANDUNG", "NIK", "3273012345670001"]));
    assert_eq!(report.document_type, DocumentType::Ktp);
    assert_eq!(report.record.get("Kota/Kab"), Some("KOTA BANDUNG"));
    assert_eq!(report.record.get("NIK"), Some("3273012345670001"));
}

#[test]
fn label_in_value_position_is_not_a_value() {
    let located = locate(&toks(&["Nama", "Alamat", "JL MAWAR"]));
    assert_eq!(located.value("Name"), None);
    assert!(located.missing().contains(&FieldError::NotFound { field: "Name" }));
}

#[test]
fn label_at_end_of_sequence_is_out_of_range() {
    let located = locate(&toks(&["NIK"]));
    assert!(located
        .missing()
        .contains(&FieldError::OutOfRange { field: "NIK", index: 1, len: 1 }));
}

#[test]
fn empty_sequence_is_all_sentinels() {
    let record = assemble(DocumentType::Ktp, &locate(&[]));
    assert_eq!(record.len(), 8);
    assert!(record.iter().all(|(_, v)| v == NOT_AVAILABLE));
}

#[test]
fn province_read_from_propinsi_token() {
    let located = locate(&toks(&["PROPINSI JAWA TIMUR", "KOTA SURABAYA", "NIK", "3578012345670001"]));
    assert_eq!(located.value("Provinsi"), Some("JAWA TIMUR"));
    assert_eq!(located.value("Kota/Kab"), Some("KOTA SURABAYA"));

    let report = extract_from_tokens(&toks(&["PROPINSI JAWA TIMUR", "NIK", "3578012345670001"]));
    assert_eq!(report.record.get("Provinsi"), Some("JAWA TIMUR"));
}
