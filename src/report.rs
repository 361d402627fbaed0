use crate::record::Record;
use log::warn;
use serde::Serialize;
use std::collections::BTreeMap;

/// One line of the per-category summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub jenis_disabilitas: String,
    pub jumlah: usize,
}

/// Total records for one kab/kota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityCount {
    pub kab_kota: String,
    pub jumlah: usize,
}

/// Group rows by disability category, ascending by category label.
///
/// The counts always sum to `rows.len()`.
pub fn count_by_category(rows: &[&Record]) -> Vec<CategoryCount> {
    group_count(rows.iter().map(|r| r.jenis_disabilitas.as_str()))
        .into_iter()
        .map(|(jenis_disabilitas, jumlah)| CategoryCount {
            jenis_disabilitas,
            jumlah,
        })
        .collect()
}

/// Group the full, unfiltered record set by kab/kota.
///
/// The map is a province-wide overview, so it ignores region filters.
pub fn count_by_city(records: &[Record]) -> Vec<CityCount> {
    group_count(records.iter().map(|r| r.kab_kota.as_str()))
        .into_iter()
        .map(|(kab_kota, jumlah)| CityCount { kab_kota, jumlah })
        .collect()
}

fn group_count<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
}

/// Approximate centre point of each kab/kota, keyed by the exact name used
/// in the `kab_kota` column.
#[derive(Debug, Clone)]
pub struct CentroidTable {
    entries: BTreeMap<String, Centroid>,
}

impl CentroidTable {
    pub fn empty() -> Self {
        CentroidTable {
            entries: BTreeMap::new(),
        }
    }

    pub fn with_entry(mut self, kab_kota: impl Into<String>, lat: f64, lon: f64) -> Self {
        self.entries.insert(kab_kota.into(), Centroid { lat, lon });
        self
    }

    pub fn get(&self, kab_kota: &str) -> Option<Centroid> {
        self.entries.get(kab_kota).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CentroidTable {
    /// Centres for the regions of Sumatera Utara currently on the map.
    fn default() -> Self {
        CentroidTable::empty()
            .with_entry("Kota Medan", 3.5952, 98.6722)
            .with_entry("Kab. Deli Serdang", 3.4200, 98.9800)
            .with_entry("Kab. Langkat", 3.7000, 98.2000)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub kab_kota: String,
    pub lat: f64,
    pub lon: f64,
    pub jumlah: usize,
}

/// Map layer plus the regions that could not be placed on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapReport {
    pub points: Vec<MapPoint>,
    pub missing: Vec<String>,
}

impl MapReport {
    pub fn has_points(&self) -> bool {
        !self.points.is_empty()
    }
}

/// Place each city's total on its centroid.
///
/// A city is placed only on an exact name match. Cities without a centroid
/// are returned in `missing` and logged, never dropped silently.
pub fn map_points(counts: &[CityCount], table: &CentroidTable) -> MapReport {
    let mut points = Vec::new();
    let mut missing = Vec::new();

    for count in counts {
        match table.get(&count.kab_kota) {
            Some(c) => points.push(MapPoint {
                kab_kota: count.kab_kota.clone(),
                lat: c.lat,
                lon: c.lon,
                jumlah: count.jumlah,
            }),
            None => missing.push(count.kab_kota.clone()),
        }
    }

    if !missing.is_empty() {
        warn!(
            "No map centroid for {} region(s): {}",
            missing.len(),
            missing.join(", ")
        );
    }

    MapReport { points, missing }
}
