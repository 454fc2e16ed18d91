use anpscraper::{
    convert::{LibreOffice, SheetConverter},
    fetch, sheet, transform, write,
};
use anyhow::Result;
use chrono::Utc;
use reqwest::Client;
use std::{env, fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Published location of the fuel-sales workbook.
const DEFAULT_SOURCE_URL: &str =
    "https://github.com/raizen-analytics/data-engineering-test/raw/master/assets/vendas-combustiveis-m3.xls";

/// Sheets to extract, with the Parquet file each one produces.
const SHEETS: &[(&str, &str)] = &[
    ("DPCache_m3", "sales_oil_derivative_fuels.parquet"),
    ("DPCache_m3_2", "sales_diesel.parquet"),
];

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) configure dirs & source ──────────────────────────────────
    let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| ".".into()));
    let xls_dir = data_dir.join("xls");
    let converted_dir = data_dir.join("converted");
    let parquet_dir = data_dir.join("parquet");
    for d in [&xls_dir, &converted_dir, &parquet_dir] {
        fs::create_dir_all(d)?;
    }
    let source_url = env::var("FUEL_SALES_URL").unwrap_or_else(|_| DEFAULT_SOURCE_URL.into());

    // ─── 3) download the workbook ────────────────────────────────────
    let client = Client::new();
    let xls_path = fetch::download_xls(&client, &source_url, &xls_dir).await?;
    info!(path = %xls_path.display(), "downloaded workbook");

    // ─── 4) convert to per-sheet CSV on the blocking pool ────────────
    let converter = match env::var("LIBREOFFICE_BIN") {
        Ok(bin) => LibreOffice::new(bin),
        Err(_) => LibreOffice::default(),
    };
    let workbook = tokio::task::spawn_blocking({
        let xls_path = xls_path.clone();
        let converted_dir = converted_dir.clone();
        move || converter.convert(&xls_path, &converted_dir)
    })
    .await??;

    // ─── 5) transform and persist each sheet ─────────────────────────
    let created_at = Utc::now();
    let months = transform::MonthMap::pt_br();
    for &(sheet_name, target) in SHEETS {
        let table = sheet::read_sheet(workbook.sheet_path(sheet_name))?;
        let records = transform::fuel_sales_long(&table, months, created_at)?;
        info!(sheet = sheet_name, rows = records.len(), "transformed sheet");
        write::write_parquet(&records, &parquet_dir.join(target))?;
    }

    info!("all done");
    Ok(())
}
