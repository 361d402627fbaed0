use crate::error::{DashboardError, Result};
use crate::filter::Selection;
use crate::loader::DATA_SHEET;
use crate::record::{RECORD_COLUMNS, Record, Role};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use thiserror::Error;

/// Download name of the exported workbook.
pub const EXPORT_FILE_NAME: &str = "rekap_disabilitas_filtered.xlsx";

/// MIME type of an `.xlsx` workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Projection of a record shown in the detail table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub nama: String,
    pub jenis_disabilitas: String,
    pub desa_kelurahan: String,
    pub kecamatan: String,
}

impl From<&Record> for DetailRow {
    fn from(record: &Record) -> Self {
        DetailRow {
            nama: record.nama.clone(),
            jenis_disabilitas: record.jenis_disabilitas.clone(),
            desa_kelurahan: record.desa_kelurahan.clone(),
            kecamatan: record.kecamatan.clone(),
        }
    }
}

/// Restrict the region-filtered rows to one disability category.
///
/// `Selection::All` passes every row through. Only the four display columns
/// are kept.
pub fn drill_down(rows: &[&Record], category: &Selection) -> Vec<DetailRow> {
    rows.iter()
        .filter(|r| category.matches(&r.jenis_disabilitas))
        .map(|r| DetailRow::from(*r))
        .collect()
}

/// A generated workbook ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Error, Debug)]
pub enum ExportError {
    /// The role is not allowed to download data.
    #[error("Role {0} tidak memiliki hak download")]
    Denied(Role),

    #[error(transparent)]
    Failed(#[from] DashboardError),
}

/// Build the download for the region-filtered rows.
///
/// Only `admin` and `operator` get a workbook. The category chosen in the
/// detail table is not applied; the export covers exactly the rows the
/// region filters select.
pub fn export_filtered(
    rows: &[&Record],
    role: Role,
) -> std::result::Result<ExportFile, ExportError> {
    if !role.can_export() {
        return Err(ExportError::Denied(role));
    }

    Ok(ExportFile {
        file_name: EXPORT_FILE_NAME,
        content_type: XLSX_CONTENT_TYPE,
        bytes: to_xlsx(rows)?,
    })
}

/// Convert records to XLSX format
///
/// Writes a single `data_disabilitas` sheet with a bold header row in
/// [`RECORD_COLUMNS`] order, so the result loads back through
/// [`crate::loader::DataStore::from_bytes`].
///
/// # Returns
/// * `Result<Vec<u8>>` - XLSX file content as bytes or an error
pub fn to_xlsx(rows: &[&Record]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(DATA_SHEET)?;

    for (c, column) in RECORD_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, *column, &header)?;
    }

    for (r, record) in rows.iter().enumerate() {
        for (c, value) in record.values().iter().enumerate() {
            worksheet.write_string((r + 1) as u32, c as u16, *value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Convert records to CSV format
///
/// Header row is [`RECORD_COLUMNS`]; values containing commas, quotes,
/// carriage returns or line feeds are quoted with embedded quotes doubled.
pub fn to_csv(rows: &[&Record]) -> String {
    let mut csv_content = RECORD_COLUMNS.join(",");
    csv_content.push('\n');

    for record in rows {
        for (c, value) in record.values().iter().enumerate() {
            if c > 0 {
                csv_content.push(',');
            }
            if value.contains([',', '"', '\n', '\r']) {
                let escaped = value.replace('"', "\"\"");
                csv_content.push_str(&format!("\"{}\"", escaped));
            } else {
                csv_content.push_str(value);
            }
        }
        csv_content.push('\n');
    }

    csv_content
}
