use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, aggregating or exporting census data.
///
/// Load errors are fatal at startup; the server refuses to bind without a
/// complete data store.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("failed to open data file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("sheet '{0}' not found in workbook")]
    MissingSheet(String),

    #[error("sheet '{sheet}' has no column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("unknown role '{0}' (expected admin, operator or viewer)")]
    InvalidRole(String),

    #[error("failed to write workbook: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to render chart: {0}")]
    Chart(String),
}

impl DashboardError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
