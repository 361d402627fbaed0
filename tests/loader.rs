mod common;

use common::{
    sample_records, write_workbook, write_workbook_at, write_workbook_with_users,
    write_workbook_without_role,
};
use dashboard::error::DashboardError;
use dashboard::filter::{RegionSelection, Selection, filter_by_region};
use dashboard::loader::{DataStore, load_credentials, load_records};
use dashboard::record::Record;
use dashboard::login::authenticate;
use dashboard::record::Role;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn loads_records_by_column_name() {
    let (_dir, path) = write_workbook(&sample_records());
    let records = load_records(&path).unwrap();
    assert_eq!(records, sample_records());
}

#[test]
fn loads_credentials_with_roles() {
    let (_dir, path) = write_workbook(&sample_records());
    let creds = load_credentials(&path).unwrap();
    assert_eq!(creds.len(), 4);
    assert_eq!(creds[0].username, "admin1");
    assert_eq!(creds[0].role, Role::Admin);
    assert_eq!(creds[2].role, Role::Viewer);
    // Role text is matched case-insensitively.
    assert_eq!(creds[3].role, Role::Operator);
}

#[test]
fn numeric_password_reads_as_typed() {
    let (_dir, path) = write_workbook(&sample_records());
    let creds = load_credentials(&path).unwrap();
    assert_eq!(creds[3].password, "12345");
    assert_eq!(authenticate("angka", "12345", &creds), Some(Role::Operator));
}

#[test]
fn admin_credentials_from_file_authenticate() {
    let (_dir, path) = write_workbook(&sample_records());
    let store = DataStore::open(&path).unwrap();
    assert_eq!(
        authenticate("admin1", "secret", store.credentials()),
        Some(Role::Admin)
    );
    assert_eq!(authenticate("admin1", "wrong", store.credentials()), None);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = DataStore::open(dir.path().join("nope.xlsx")).unwrap_err();
    assert!(matches!(err, DashboardError::Io { .. }));
    assert!(err.to_string().contains("nope.xlsx"));
}

#[test]
fn missing_users_sheet_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no_users.xlsx");
    write_workbook_at(&path, &sample_records(), false);

    // Records alone still load; the full store does not.
    assert_eq!(load_records(&path).unwrap().len(), sample_records().len());
    match DataStore::open(&path) {
        Err(DashboardError::MissingSheet(sheet)) => assert_eq!(sheet, "users"),
        other => panic!("expected MissingSheet, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn missing_column_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no_role.xlsx");
    write_workbook_without_role(&path);

    match load_credentials(&path) {
        Err(DashboardError::MissingColumn { sheet, column }) => {
            assert_eq!(sheet, "users");
            assert_eq!(column, "role");
        }
        other => panic!("expected MissingColumn, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn cached_store_is_shared_and_never_reloaded() {
    let (_dir, path) = write_workbook(&sample_records());

    let first = DataStore::cached(&path).unwrap();
    let second = DataStore::cached(&path).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // Rewrite the file with fewer rows; the cache keeps serving the old copy.
    write_workbook_at(&path, &sample_records()[..2], true);
    let third = DataStore::cached(&path).unwrap();
    assert!(Arc::ptr_eq(&first, &third));
    assert_eq!(third.records().len(), sample_records().len());

    // A fresh open sees the new contents.
    assert_eq!(DataStore::open(&path).unwrap().records().len(), 2);
}

#[test]
fn password_whitespace_is_part_of_the_password() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("spasi.xlsx");
    write_workbook_with_users(
        &path,
        &sample_records(),
        &[("admin1", "secret ", " Admin "), ("op1", " op-pass", "operator")],
    );

    let creds = load_credentials(&path).unwrap();
    assert_eq!(creds[0].password, "secret ");
    assert_eq!(creds[0].role, Role::Admin);
    assert_eq!(authenticate("admin1", "secret ", &creds), Some(Role::Admin));
    assert_eq!(authenticate("admin1", "secret", &creds), None);
    assert_eq!(authenticate("op1", " op-pass", &creds), Some(Role::Operator));
    assert_eq!(authenticate("op1", "op-pass", &creds), None);
}

#[test]
fn data_cells_keep_surrounding_whitespace() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wilayah.xlsx");
    let records = vec![
        Record::new("Ani ", "Netra", "Babura", "Medan Sunggal", "Kota Medan "),
        Record::new("Budi", "Rungu", "Babura", "Medan Sunggal", "Kota Medan"),
    ];
    write_workbook_with_users(&path, &records, &[("admin1", "secret", "admin")]);

    let loaded = load_records(&path).unwrap();
    assert_eq!(loaded, records);

    let padded = RegionSelection::new(
        Selection::parse(Some("Kota Medan ")),
        Selection::All,
        Selection::All,
    );
    let view = filter_by_region(&loaded, &padded);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].nama, "Ani ");
    assert_eq!(view.kab_kota_options, vec!["Kota Medan", "Kota Medan "]);
}
