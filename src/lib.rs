/*!
# Disability Census Dashboard

A browser-based dashboard for the disability census of Provinsi Sumatera
Utara, built in Rust.

## Overview

The census lives in a single workbook with two sheets: `data_disabilitas`
(one row per person) and `users` (login table). The dashboard loads both once,
asks the visitor to log in, and then lets them narrow the records by region,
read summary tables and charts, drill into a disability category and, for
privileged roles, download the filtered rows as a new workbook.

## Architecture

### Data layer
- **loader**: reads both sheets with calamine into a read-only [`DataStore`],
  memoized per file for the lifetime of the process
- **record**: `Record`, `Credential` and `Role`

### Pipeline
- **filter**: cascading kab/kota → kecamatan → desa/kelurahan filters and the
  option list of each select
- **report**: counts per disability category, counts per kab/kota and the
  centroid map layer
- **downloader**: detail drill-down and role-gated XLSX/CSV export

### Web layer (feature `web`)
- **login**: credential check, per-user sessions, auth middleware
- **graph**: bar and pie charts rendered with plotters
- **app**: axum routes and handlebars pages

## Roles

| Role | View | Export |
|---|---|---|
| `admin` | yes | yes |
| `operator` | yes | yes |
| `viewer` | yes | no |

## REST API Endpoints

- `GET /` - Dashboard page (`kab_kota`, `kecamatan`, `desa`, `jenis`)
- `GET /chart/bar.png`, `GET /chart/pie.png` - Category charts
- `GET /api/summary` - Metrics, category counts and select options as JSON
- `GET /api/map` - Per-city map points and regions without a centroid
- `GET /export` - Region-filtered workbook (admin and operator only)
- `GET|POST /login`, `POST /logout` - Session management
*/

pub mod config;
pub mod downloader;
pub mod error;
pub mod filter;
pub mod loader;
pub mod login;
pub mod record;
pub mod report;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod graph;

/// Re-export everything from these modules to make it easier to use
pub use config::*;
pub use downloader::*;
pub use error::DashboardError;
pub use filter::*;
pub use loader::*;
pub use login::*;
pub use record::*;
pub use report::*;
