use crate::error::{DashboardError, Result};
use crate::record::{CREDENTIAL_COLUMNS, Credential, RECORD_COLUMNS, Record, Role};
use calamine::{Data, Reader, Xlsx};
use lazy_static::lazy_static;
use log::{debug, info};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Sheet holding one row per person.
pub const DATA_SHEET: &str = "data_disabilitas";

/// Sheet holding the login table.
pub const USERS_SHEET: &str = "users";

lazy_static! {
    /// Loaded stores keyed by canonical file path.
    ///
    /// Entries are never evicted: a store is read once per process and later
    /// edits to the workbook are not seen until restart.
    static ref STORE_CACHE: RwLock<HashMap<PathBuf, Arc<DataStore>>> = RwLock::new(HashMap::new());
}

/// Read-only, in-memory copy of both workbook tables.
#[derive(Debug, Clone)]
pub struct DataStore {
    records: Vec<Record>,
    credentials: Vec<Credential>,
}

impl DataStore {
    /// Load both sheets from the workbook at `path`.
    ///
    /// # Errors
    /// * `DashboardError::Io` if the file cannot be opened
    /// * `DashboardError::MissingSheet` / `MissingColumn` if the layout is wrong
    /// * `DashboardError::InvalidRole` if a user row has an unknown role
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut workbook = open_xlsx(path)?;
        let store = DataStore {
            records: read_records(&mut workbook)?,
            credentials: read_credentials(&mut workbook)?,
        };

        info!(
            "Loaded {} records and {} users from {}",
            store.records.len(),
            store.credentials.len(),
            path.display()
        );
        Ok(store)
    }

    /// Load both sheets from an in-memory workbook.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut workbook = Xlsx::new(Cursor::new(bytes))?;
        Ok(DataStore {
            records: read_records(&mut workbook)?,
            credentials: read_credentials(&mut workbook)?,
        })
    }

    pub fn from_parts(records: Vec<Record>, credentials: Vec<Credential>) -> Self {
        DataStore {
            records,
            credentials,
        }
    }

    /// Memoized variant of [`DataStore::open`].
    ///
    /// The first call for a given file pays the load cost; every later call
    /// returns the same `Arc`, even if the file changed on disk in between.
    /// There is no invalidation.
    pub fn cached(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = path.as_ref();
        let key = path
            .canonicalize()
            .map_err(|e| DashboardError::io(path, e))?;

        if let Some(store) = STORE_CACHE
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            debug!("Reusing cached data store for {}", key.display());
            return Ok(Arc::clone(store));
        }

        let mut cache = STORE_CACHE.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have loaded it while we waited for the lock.
        if let Some(store) = cache.get(&key) {
            return Ok(Arc::clone(store));
        }
        let store = Arc::new(DataStore::open(&key)?);
        cache.insert(key, Arc::clone(&store));
        Ok(store)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }
}

/// Read the `data_disabilitas` sheet of the workbook at `path`.
pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    read_records(&mut open_xlsx(path.as_ref())?)
}

/// Read the `users` sheet of the workbook at `path`.
pub fn load_credentials(path: impl AsRef<Path>) -> Result<Vec<Credential>> {
    read_credentials(&mut open_xlsx(path.as_ref())?)
}

fn open_xlsx(path: &Path) -> Result<Xlsx<BufReader<File>>> {
    let file = File::open(path).map_err(|e| DashboardError::io(path, e))?;
    Ok(Xlsx::new(BufReader::new(file))?)
}

pub fn read_records<RS: Read + Seek>(workbook: &mut Xlsx<RS>) -> Result<Vec<Record>> {
    let rows = sheet_table(workbook, DATA_SHEET, &RECORD_COLUMNS)?;
    Ok(rows
        .into_iter()
        .map(|mut row| {
            // Columns come back in RECORD_COLUMNS order; drain from the back.
            let kab_kota = row.pop().unwrap_or_default();
            let kecamatan = row.pop().unwrap_or_default();
            let desa_kelurahan = row.pop().unwrap_or_default();
            let jenis_disabilitas = row.pop().unwrap_or_default();
            let nama = row.pop().unwrap_or_default();
            Record {
                nama,
                jenis_disabilitas,
                desa_kelurahan,
                kecamatan,
                kab_kota,
            }
        })
        .collect())
}

pub fn read_credentials<RS: Read + Seek>(workbook: &mut Xlsx<RS>) -> Result<Vec<Credential>> {
    let rows = sheet_table(workbook, USERS_SHEET, &CREDENTIAL_COLUMNS)?;
    rows.into_iter()
        .map(|row| {
            let role: Role = row[2].parse()?;
            Ok(Credential {
                username: row[0].clone(),
                password: row[1].clone(),
                role,
            })
        })
        .collect()
}

/// Extract the named columns of a sheet as text, in the order given.
///
/// The first row is the header. Columns are located by exact name, so the
/// sheet may order them freely or carry extra columns. Fully empty rows are
/// skipped.
fn sheet_table<RS: Read + Seek>(
    workbook: &mut Xlsx<RS>,
    sheet: &str,
    columns: &[&str],
) -> Result<Vec<Vec<String>>> {
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(DashboardError::MissingSheet(sheet.to_string()));
    }
    let range = workbook.worksheet_range(sheet)?;
    let mut rows = range.rows();

    let header: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|c| cell_text(c).trim().to_string()).collect())
        .unwrap_or_default();

    let indices = columns
        .iter()
        .map(|column| {
            header
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| DashboardError::MissingColumn {
                    sheet: sheet.to_string(),
                    column: column.to_string(),
                })
        })
        .collect::<Result<Vec<usize>>>()?;

    let mut table = Vec::new();
    for row in rows {
        let values: Vec<String> = indices
            .iter()
            .map(|&i| row.get(i).map(cell_text).unwrap_or_default())
            .collect();
        if values.iter().all(|v| v.is_empty()) {
            continue;
        }
        table.push(values);
    }

    debug!("Read {} rows from sheet '{}'", table.len(), sheet);
    Ok(table)
}

/// Render a cell as the text a user sees in the spreadsheet.
///
/// String cells are kept as stored, surrounding whitespace included.
/// Integral floats drop their fraction, so a password typed as `12345`
/// compares equal to the submitted string.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => (*f as i64).to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_formats_numbers_like_the_sheet() {
        assert_eq!(cell_text(&Data::Float(12345.0)), "12345");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::String("  Medan Baru ".into())), "  Medan Baru ");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
