// src/transform/mod.rs
pub mod columns;
pub mod derive;
pub mod realign;
pub mod reshape;

pub use columns::{normalize_column, normalize_columns};
pub use derive::{derive_records, split_product_unit, FuelSalesRecord, MonthMap};
pub use realign::{realign_rows, rotation, VALUE_COLUMN_COUNT};
pub use reshape::{melt, MeltedRow, TOTAL_PERIOD};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::sheet::SheetTable;

/// Normalized names of the identifying columns.
pub const DESCRIPTION_COLUMN: &str = "combustivel";
pub const YEAR_COLUMN: &str = "ano";
pub const REGION_COLUMN: &str = "regiao";
pub const STATE_COLUMN: &str = "estado";

pub const FEATURE_COLUMNS: [&str; 4] = [
    DESCRIPTION_COLUMN,
    YEAR_COLUMN,
    REGION_COLUMN,
    STATE_COLUMN,
];

/// The 13 value columns in their canonical order: months first, aggregate last.
pub const VALUE_COLUMNS: [&str; VALUE_COLUMN_COUNT] = [
    "jan",
    "fev",
    "mar",
    "abr",
    "mai",
    "jun",
    "jul",
    "ago",
    "set",
    "out",
    "nov",
    "dez",
    TOTAL_PERIOD,
];

/// Resolve each wanted column against the normalized header row.
fn column_indices(headers: &[String], wanted: &[&str]) -> Result<Vec<usize>> {
    wanted
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| anyhow!("sheet is missing the {:?} column", name))
        })
        .collect()
}

/// Project the indexed columns out of every row, in order. Rows shorter than
/// the header row are padded with empty cells so downstream stages always see a
/// rectangular table.
fn project(rows: &[Vec<String>], indices: &[usize]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            indices
                .iter()
                .map(|&i| row.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Full wide→long pipeline for one fuel-sales sheet: normalize headers, split
/// into feature and value sub-tables, undo the per-row cyclical offset, unpivot
/// the months, and derive the typed output fields.
///
/// Rows keep their source position from read to realignment; nothing here
/// filters or reorders before `realign_rows`, which is what keys the decoding.
#[instrument(level = "info", skip_all, fields(rows = sheet.rows.len()))]
pub fn fuel_sales_long(
    sheet: &SheetTable,
    months: &MonthMap,
    created_at: DateTime<Utc>,
) -> Result<Vec<FuelSalesRecord>> {
    let headers = normalize_columns(&sheet.headers);

    let feature_indices = column_indices(&headers, &FEATURE_COLUMNS)?;
    let value_indices = column_indices(&headers, &VALUE_COLUMNS)?;

    let feature_rows = project(&sheet.rows, &feature_indices);
    let value_rows = project(&sheet.rows, &value_indices);

    let feature_headers: Vec<String> = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
    let value_headers: Vec<String> = VALUE_COLUMNS.iter().map(|s| s.to_string()).collect();

    let realigned = realign_rows(&value_rows)?;
    let melted = melt(&feature_rows, &value_headers, &realigned)?;
    derive_records(&melted, &feature_headers, months, created_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    /// Sheet headers as printed in the source publication, before
    /// normalization.
    fn sheet_headers() -> Vec<String> {
        let mut headers: Vec<String> = ["COMBUSTÍVEL", "ANO", "REGIÃO", "ESTADO"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        headers.extend(VALUE_COLUMNS.iter().map(|s| s.to_string()));
        headers
    }

    /// Encode `decoded` the way the source sheet scrambles the row at `pos`:
    /// a right rotation that the realigner's left shift undoes.
    fn scramble(decoded: &[f64], pos: usize) -> Vec<String> {
        let shift = rotation(pos);
        let n = decoded.len();
        decoded[n - shift..]
            .iter()
            .chain(&decoded[..n - shift])
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn end_to_end_sheet_to_records() {
        let decoded_row0: Vec<f64> = (1..=12).map(f64::from).chain([78.0]).collect();
        let decoded_row1: Vec<f64> = (1..=12).map(|v| f64::from(v) * 10.0).chain([780.0]).collect();

        let mut row0 = vec![
            "GASOLINA C (m3)".to_string(),
            "2020".to_string(),
            "REGIÃO SUL".to_string(),
            "SANTA CATARINA".to_string(),
        ];
        row0.extend(scramble(&decoded_row0, 0));
        let mut row1 = vec![
            "ETANOL HIDRATADO (m3)".to_string(),
            "2021".to_string(),
            "REGIÃO SUL".to_string(),
            "PARANÁ".to_string(),
        ];
        row1.extend(scramble(&decoded_row1, 1));

        let sheet = crate::sheet::SheetTable {
            headers: sheet_headers(),
            rows: vec![row0, row1],
        };

        let created_at = Utc::now();
        let records = fuel_sales_long(&sheet, MonthMap::pt_br(), created_at).unwrap();

        // 2 rows × 12 months, aggregate dropped
        assert_eq!(records.len(), 24);

        let first = &records[0];
        assert_eq!(first.product, "GASOLINA C");
        assert_eq!(first.unit, "m3");
        assert_eq!(first.uf, "SANTA CATARINA");
        assert_eq!(first.year_month, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(first.volume, 1.0);
        assert_eq!(first.created_at, created_at);

        let december = &records[11];
        assert_eq!(december.year_month, NaiveDate::from_ymd_opt(2020, 12, 1).unwrap());
        assert_eq!(december.volume, 12.0);

        let second_row_june = &records[12 + 5];
        assert_eq!(second_row_june.product, "ETANOL HIDRATADO");
        assert_eq!(second_row_june.uf, "PARANÁ");
        assert_eq!(
            second_row_june.year_month,
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
        );
        assert_eq!(second_row_june.volume, 60.0);
    }

    #[test]
    fn short_rows_are_padded_and_zero_filled() {
        let mut row = vec![
            "GLP (m3)".to_string(),
            "2020".to_string(),
            "REGIÃO NORTE".to_string(),
            "AMAZONAS".to_string(),
        ];
        // only jan..jun present; the reader may hand over ragged rows
        row.extend((1..=6).map(|v| v.to_string()));

        let sheet = crate::sheet::SheetTable {
            headers: sheet_headers(),
            rows: vec![row],
        };

        let records = fuel_sales_long(&sheet, MonthMap::pt_br(), Utc::now()).unwrap();
        assert_eq!(records.len(), 12);
        // position 0 is left-shifted by one, so "2" lands on jan
        assert_eq!(records[0].volume, 2.0);
        // padded cells melt into zero volumes
        assert!(records.iter().filter(|r| r.volume == 0.0).count() >= 6);
    }

    #[test]
    fn missing_value_column_is_rejected() {
        let mut headers = sheet_headers();
        headers.retain(|h| h != "mai");
        let sheet = crate::sheet::SheetTable {
            headers,
            rows: vec![],
        };
        let err = fuel_sales_long(&sheet, MonthMap::pt_br(), Utc::now()).unwrap_err();
        assert!(err.to_string().contains("mai"), "{}", err);
    }

    #[test]
    fn missing_feature_column_is_rejected() {
        let headers: Vec<String> = VALUE_COLUMNS.iter().map(|s| s.to_string()).collect();
        let sheet = crate::sheet::SheetTable {
            headers,
            rows: vec![],
        };
        assert!(fuel_sales_long(&sheet, MonthMap::pt_br(), Utc::now()).is_err());
    }
}
