#![cfg(not(tarpaulin_include))]

use dashboard::downloader::{to_csv, to_xlsx};
use dashboard::filter::{RegionSelection, Selection, filter_by_region, summary_metrics};
use dashboard::loader::load_records;
use dashboard::login::hash_password;
use dashboard::report::count_by_category;
use env_logger::Env;
use log::info;
use std::env;
use std::fs;

const USAGE: &str = "\
Usage:
  dashboard-cli summary <file.xlsx> [--kab-kota X] [--kecamatan Y] [--desa Z]
  dashboard-cli export <file.xlsx> <out> [--format xlsx|csv] [--kab-kota X] [--kecamatan Y] [--desa Z]
  dashboard-cli hash-password <password>";

/// Options shared by `summary` and `export`.
#[derive(Default)]
struct Flags {
    region: RegionSelection,
    format: Option<String>,
}

fn parse_flags(args: &[String]) -> Result<Flags, String> {
    let mut flags = Flags::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("Missing value for {}", flag))?;
        match flag.as_str() {
            "--kab-kota" => flags.region.kab_kota = Selection::parse(Some(value)),
            "--kecamatan" => flags.region.kecamatan = Selection::parse(Some(value)),
            "--desa" => flags.region.desa = Selection::parse(Some(value)),
            "--format" => flags.format = Some(value.to_lowercase()),
            other => return Err(format!("Unknown option: {}", other)),
        }
    }
    Ok(flags)
}

fn summary(path: &str, flags: &Flags) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_records(path)?;
    let view = filter_by_region(&records, &flags.region);
    let metrics = summary_metrics(&view.rows);

    println!("Jumlah Data      : {}", metrics.jumlah_data);
    println!("Jumlah Kecamatan : {}", metrics.jumlah_kecamatan);
    println!("Jumlah Kelurahan : {}", metrics.jumlah_kelurahan);
    println!();
    println!("{:<30} {:>8}", "jenis_disabilitas", "Jumlah");
    for row in count_by_category(&view.rows) {
        println!("{:<30} {:>8}", row.jenis_disabilitas, row.jumlah);
    }
    Ok(())
}

fn export(path: &str, out: &str, flags: &Flags) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_records(path)?;
    let view = filter_by_region(&records, &flags.region);

    match flags.format.as_deref().unwrap_or("xlsx") {
        "xlsx" => fs::write(out, to_xlsx(&view.rows)?)?,
        "csv" => fs::write(out, to_csv(&view.rows))?,
        other => return Err(format!("Unsupported format: {}", other).into()),
    }

    info!("Wrote {} rows to {}", view.rows.len(), out);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("summary") if args.len() >= 3 => summary(&args[2], &parse_flags(&args[3..])?),
        Some("export") if args.len() >= 4 => export(&args[2], &args[3], &parse_flags(&args[4..])?),
        Some("hash-password") if args.len() == 3 => {
            println!("{}", hash_password(&args[2])?);
            Ok(())
        }
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}
