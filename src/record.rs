use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::classify::DocumentType;
use crate::locate::Located;

/// Stand-in value for a field that could not be located.
pub const NOT_AVAILABLE: &str = "N/A";

pub const KTP_FIELDS: &[&str] = &[
    "Provinsi",
    "Kota/Kab",
    "NIK",
    "Name",
    "Alamat",
    "RT/RW",
    "Kelurahan/Desa",
    "Kecamatan",
];

pub const NPWP_FIELDS: &[&str] = &["NPWP", "NIK", "Nama", "Alamat", "Kel/Desa", "Kota/Kab"];

pub fn schema_fields(doc: DocumentType) -> &'static [&'static str] {
    match doc {
        DocumentType::Ktp => KTP_FIELDS,
        DocumentType::Npwp => NPWP_FIELDS,
    }
}

/// Final key/value record. Keys follow the schema order of the document
/// type and every schema key is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    entries: Vec<(&'static str, String)>,
}

impl FieldRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Merge located values into the schema of `doc`. Blank or unknown values
/// become the sentinel; keys outside the schema are ignored.
pub fn assemble(doc: DocumentType, located: &Located) -> FieldRecord {
    let entries = schema_fields(doc)
        .iter()
        .map(|&field| {
            let value = located
                .value(field)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(NOT_AVAILABLE);
            (field, value.to_string())
        })
        .collect();
    FieldRecord { entries }
}
