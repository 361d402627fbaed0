use crate::record::Record;
use serde::Serialize;
use std::collections::BTreeSet;

/// Label of the "no filter" entry shown at the top of every select.
pub const ALL_SENTINEL: &str = "Semua";

/// One select box value: either everything, or rows equal to a single value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Interpret a raw form value. Missing, blank and `"Semua"` all mean `All`.
    ///
    /// Any other value is kept verbatim, so a region stored with surrounding
    /// whitespace stays selectable.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Selection::All,
            Some(value) if value.trim().is_empty() || value == ALL_SENTINEL => Selection::All,
            Some(value) => Selection::Only(value.to_string()),
        }
    }

    pub fn only(value: impl Into<String>) -> Self {
        Selection::Only(value.into())
    }

    /// `All` matches every value; `Only(v)` matches `v` exactly.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }

    /// Text shown in the select box.
    pub fn label(&self) -> &str {
        self.value().unwrap_or(ALL_SENTINEL)
    }
}

/// The three cascading region selects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegionSelection {
    pub kab_kota: Selection,
    pub kecamatan: Selection,
    pub desa: Selection,
}

impl RegionSelection {
    pub fn new(kab_kota: Selection, kecamatan: Selection, desa: Selection) -> Self {
        RegionSelection {
            kab_kota,
            kecamatan,
            desa,
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.kab_kota == Selection::All
            && self.kecamatan == Selection::All
            && self.desa == Selection::All
    }
}

/// Output of the region pipeline: the working set plus the option list of
/// each select, each computed from the rows left by the levels above it.
#[derive(Debug, Clone)]
pub struct RegionView<'a> {
    pub rows: Vec<&'a Record>,
    pub kab_kota_options: Vec<String>,
    pub kecamatan_options: Vec<String>,
    pub desa_options: Vec<String>,
}

/// Narrow `records` by kab/kota, then kecamatan, then desa/kelurahan.
///
/// The order is fixed so that a level only ever offers values that occur
/// under the selections above it. A selection that matches nothing at its
/// level yields an empty working set; it is not reset to `All`.
pub fn filter_by_region<'a>(records: &'a [Record], selection: &RegionSelection) -> RegionView<'a> {
    let all: Vec<&Record> = records.iter().collect();

    let kab_kota_options = distinct_sorted(&all, |r| &r.kab_kota);
    let by_city = narrow(all, &selection.kab_kota, |r| &r.kab_kota);

    let kecamatan_options = distinct_sorted(&by_city, |r| &r.kecamatan);
    let by_district = narrow(by_city, &selection.kecamatan, |r| &r.kecamatan);

    let desa_options = distinct_sorted(&by_district, |r| &r.desa_kelurahan);
    let rows = narrow(by_district, &selection.desa, |r| &r.desa_kelurahan);

    RegionView {
        rows,
        kab_kota_options,
        kecamatan_options,
        desa_options,
    }
}

fn narrow<'a>(
    rows: Vec<&'a Record>,
    selection: &Selection,
    field: fn(&Record) -> &String,
) -> Vec<&'a Record> {
    match selection {
        Selection::All => rows,
        Selection::Only(_) => rows
            .into_iter()
            .filter(|r| selection.matches(field(r)))
            .collect(),
    }
}

/// Sorted, de-duplicated values of one column.
pub fn distinct_sorted(rows: &[&Record], field: fn(&Record) -> &String) -> Vec<String> {
    rows.iter()
        .map(|r| field(r).as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Headline numbers above the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub jumlah_data: usize,
    pub jumlah_kecamatan: usize,
    pub jumlah_kelurahan: usize,
}

/// Row count plus distinct kecamatan and desa/kelurahan names.
pub fn summary_metrics(rows: &[&Record]) -> Metrics {
    Metrics {
        jumlah_data: rows.len(),
        jumlah_kecamatan: rows
            .iter()
            .map(|r| r.kecamatan.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
        jumlah_kelurahan: rows
            .iter()
            .map(|r| r.desa_kelurahan.as_str())
            .collect::<BTreeSet<_>>()
            .len(),
    }
}
