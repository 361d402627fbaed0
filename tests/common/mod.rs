#![allow(dead_code)]

use dashboard::record::Record;
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new("Ani", "Netra", "Babura", "Medan Sunggal", "Kota Medan"),
        Record::new("Budi", "Rungu", "Babura", "Medan Sunggal", "Kota Medan"),
        Record::new("Citra", "Netra", "Sei Sikambing B", "Medan Sunggal", "Kota Medan"),
        Record::new("Dedi", "Daksa", "Petisah Tengah", "Medan Petisah", "Kota Medan"),
        Record::new("Eka", "Netra", "Sekip", "Medan Petisah", "Kota Medan"),
        Record::new("Fajar", "Grahita", "Tanjung Morawa A", "Tanjung Morawa", "Kab. Deli Serdang"),
        Record::new("Gita", "Daksa", "Bangun Sari", "Tanjung Morawa", "Kab. Deli Serdang"),
        Record::new("Hana", "Rungu", "Lubuk Pakam I", "Lubuk Pakam", "Kab. Deli Serdang"),
        Record::new("Indra", "Netra", "Gung Leto", "Kabanjahe", "Kab. Karo"),
        Record::new("Joko", "Daksa", "Babura", "Medan Baru", "Kota Medan"),
    ]
}

/// Users sheet rows: (username, password, role). A `None` password is
/// written as the number 12345.
pub fn sample_users() -> Vec<(&'static str, Option<&'static str>, &'static str)> {
    vec![
        ("admin1", Some("secret"), "admin"),
        ("op1", Some("op-pass"), "operator"),
        ("view1", Some("lihat"), "viewer"),
        ("angka", None, "Operator"),
    ]
}

/// Write a census workbook and return its directory guard and path.
pub fn write_workbook(records: &[Record]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("disabilitas.xlsx");
    write_workbook_at(&path, records, true);
    (dir, path)
}

/// Write a workbook; `with_users` controls whether the users sheet exists.
pub fn write_workbook_at(path: &Path, records: &[Record], with_users: bool) {
    let mut workbook = Workbook::new();

    let data = workbook.add_worksheet();
    data.set_name("data_disabilitas").unwrap();
    // Column order differs from the export order on purpose.
    let header = ["kab_kota", "kecamatan", "desa_kelurahan", "nama", "jenis_disabilitas"];
    for (c, h) in header.iter().enumerate() {
        data.write_string(0, c as u16, *h).unwrap();
    }
    for (r, rec) in records.iter().enumerate() {
        let row = (r + 1) as u32;
        data.write_string(row, 0, rec.kab_kota.as_str()).unwrap();
        data.write_string(row, 1, rec.kecamatan.as_str()).unwrap();
        data.write_string(row, 2, rec.desa_kelurahan.as_str()).unwrap();
        data.write_string(row, 3, rec.nama.as_str()).unwrap();
        data.write_string(row, 4, rec.jenis_disabilitas.as_str()).unwrap();
    }

    if with_users {
        let users = workbook.add_worksheet();
        users.set_name("users").unwrap();
        users.write_string(0, 0, "username").unwrap();
        users.write_string(0, 1, "password").unwrap();
        users.write_string(0, 2, "role").unwrap();
        for (r, (name, password, role)) in sample_users().into_iter().enumerate() {
            let row = (r + 1) as u32;
            users.write_string(row, 0, name).unwrap();
            match password {
                Some(p) => users.write_string(row, 1, p).unwrap(),
                None => users.write_number(row, 1, 12345.0).unwrap(),
            };
            users.write_string(row, 2, role).unwrap();
        }
    }

    workbook.save(path).unwrap();
}

/// Write a workbook whose users sheet lacks the `role` column.
pub fn write_workbook_without_role(path: &Path) {
    let mut workbook = Workbook::new();
    let data = workbook.add_worksheet();
    data.set_name("data_disabilitas").unwrap();
    for (c, h) in dashboard::record::RECORD_COLUMNS.iter().enumerate() {
        data.write_string(0, c as u16, *h).unwrap();
    }
    let users = workbook.add_worksheet();
    users.set_name("users").unwrap();
    users.write_string(0, 0, "username").unwrap();
    users.write_string(0, 1, "password").unwrap();
    workbook.save(path).unwrap();
}

/// Write a workbook with the given records and `(username, password, role)`
/// rows, all cells written as strings exactly as passed.
pub fn write_workbook_with_users(path: &Path, records: &[Record], users: &[(&str, &str, &str)]) {
    let mut workbook = Workbook::new();

    let data = workbook.add_worksheet();
    data.set_name("data_disabilitas").unwrap();
    for (c, h) in dashboard::record::RECORD_COLUMNS.iter().enumerate() {
        data.write_string(0, c as u16, *h).unwrap();
    }
    for (r, rec) in records.iter().enumerate() {
        for (c, value) in rec.values().iter().enumerate() {
            data.write_string((r + 1) as u32, c as u16, *value).unwrap();
        }
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("users").unwrap();
    // Padded header names still match.
    sheet.write_string(0, 0, " username").unwrap();
    sheet.write_string(0, 1, "password ").unwrap();
    sheet.write_string(0, 2, "role").unwrap();
    for (r, (name, password, role)) in users.iter().enumerate() {
        let row = (r + 1) as u32;
        sheet.write_string(row, 0, *name).unwrap();
        sheet.write_string(row, 1, *password).unwrap();
        sheet.write_string(row, 2, *role).unwrap();
    }

    workbook.save(path).unwrap();
}
