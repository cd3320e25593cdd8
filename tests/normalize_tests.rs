use idcard_fields::normalize::{clean_raw_tokens, drop_office_codes, normalize_tokens, repair_rules, repair_text, split_fields};

fn toks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn colons_and_blank_tokens_are_dropped() {
    let raw = toks(&["NIK :", " : ", "3201234567890001", ""]);
    assert_eq!(clean_raw_tokens(&raw), toks(&["NIK", "3201234567890001"]));
}

#[test]
fn label_glued_to_value_is_split() {
    let out = normalize_tokens(&toks(&["NIK3201234567890001", "NamaBUDI SANTOSO"]));
    assert_eq!(out, toks(&["NIK", "3201234567890001", "Nama", "BUDI SANTOSO"]));
}

#[test]
fn province_misreads_are_canonicalised() {
    assert_eq!(repair_text("PROVINSL JAWA BARAT"), "PROVINSI JAWA BARAT");
    assert_eq!(repair_text("PROPINSI I JAWA TIMUR"), "PROVINSI JAWA TIMUR");
    assert_eq!(normalize_tokens(&toks(&["PROVINSIDKIJAKARTA"])), toks(&["PROVINSI DKIJAKARTA"]));
}

#[test]
fn merged_terms_are_separated() {
    assert_eq!(repair_text("SEUMURHIDUP"), "SEUMUR HIDUP");
    assert_eq!(repair_text("KABUPATENBEKASI"), "KABUPATEN BEKASI");
    assert_eq!(repair_text("LAKIRLAKI"), "LAKI-LAKI");
}

#[test]
fn split_date_gets_its_hyphen_back() {
    assert_eq!(repair_text("BEKASI, 1708-1990"), "BEKASI, 17-08-1990");
}

#[test]
fn caps_run_before_mixed_case_gets_a_space() {
    assert_eq!(repair_text("JAKARTABarat"), "JAKARTA Barat");
}

#[test]
fn repair_is_idempotent_on_clean_text() {
    let clean = "PROVINSI JAWA BARAT, KABUPATEN BEKASI, NIK, 3216061234560002, Nama, SITI AMINAH, \
                 Tempat/Tgl Lahir, BEKASI, 17-08-1990, Jenis Kelamin, LAKI-LAKI, Alamat, JL MERDEKA NO 5, \
                 RT/RW, 003/007, Kel/Desa, SUKAMAJU, Berlaku Hingga, SEUMUR HIDUP";
    let once = repair_text(clean);
    assert_eq!(once, clean);
    assert_eq!(repair_text(&once), once);
}

#[test]
fn rules_are_named_and_ordered() {
    let names: Vec<&str> = repair_rules().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"provinsi_misread"));
    assert_eq!(names.last(), Some(&"laki_laki"));
    let date = names.iter().position(|n| *n == "split_date").unwrap();
    let label = names.iter().position(|n| *n == "label_gap:NIK").unwrap();
    assert!(label < date);
}

#[test]
fn split_fields_trims_and_drops_empties() {
    assert_eq!(split_fields(" a ,, b ,"), toks(&["a", "b"]));
}

#[test]
fn office_codes_are_filtered() {
    let out = drop_office_codes(&toks(&["KPP PRATAMA BEKASI", "NPWP", "EPP123", "BUDI"]));
    assert_eq!(out, toks(&["NPWP", "BUDI"]));
}

#[test]
fn empty_input_yields_empty_sequence() {
    assert!(normalize_tokens(&[]).is_empty());
}
