// src/write/mod.rs
use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{
    ArrayRef, Date32Builder, Float64Builder, StringBuilder, TimestampMicrosecondBuilder,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::info;

use crate::transform::FuelSalesRecord;

/// Days from 0001-01-01 to the Unix epoch; converts `NaiveDate` to the Date32
/// day count.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Schema of the persisted long table.
pub fn record_schema() -> Schema {
    Schema::new(vec![
        Field::new("product", DataType::Utf8, false),
        Field::new("unit", DataType::Utf8, false),
        Field::new("uf", DataType::Utf8, false),
        Field::new("year_month", DataType::Date32, false),
        Field::new("volume", DataType::Float64, false),
        Field::new(
            "created_at",
            DataType::Timestamp(TimeUnit::Microsecond, None),
            false,
        ),
    ])
}

/// Write the long table as one SNAPPY-compressed Parquet file, going through a
/// `.tmp` sibling so readers never observe a partial file.
pub fn write_parquet(records: &[FuelSalesRecord], out_path: &Path) -> Result<()> {
    let mut product = StringBuilder::new();
    let mut unit = StringBuilder::new();
    let mut uf = StringBuilder::new();
    let mut year_month = Date32Builder::new();
    let mut volume = Float64Builder::new();
    let mut created_at = TimestampMicrosecondBuilder::new();

    for r in records {
        product.append_value(&r.product);
        unit.append_value(&r.unit);
        uf.append_value(&r.uf);
        year_month.append_value(r.year_month.num_days_from_ce() - EPOCH_DAYS_FROM_CE);
        volume.append_value(r.volume);
        created_at.append_value(r.created_at.timestamp_micros());
    }

    let schema = Arc::new(record_schema());
    let columns: Vec<ArrayRef> = vec![
        Arc::new(product.finish()),
        Arc::new(unit.finish()),
        Arc::new(uf.finish()),
        Arc::new(year_month.finish()),
        Arc::new(volume.finish()),
        Arc::new(created_at.finish()),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .context("building fuel sales record batch")?;

    let temp_path = out_path.with_extension("tmp");
    let file =
        File::create(&temp_path).with_context(|| format!("creating {:?}", temp_path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer =
        ArrowWriter::try_new(file, schema, Some(props)).context("creating Parquet writer")?;
    writer.write(&batch).context("writing fuel sales batch")?;
    writer.close().context("closing Parquet writer")?;

    fs::rename(&temp_path, out_path)
        .with_context(|| format!("renaming {:?} -> {:?}", temp_path, out_path))?;

    info!(path = %out_path.display(), rows = records.len(), "wrote parquet");
    Ok(())
}
