// src/transform/derive.rs
use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;

use super::reshape::MeltedRow;
use super::{DESCRIPTION_COLUMN, STATE_COLUMN, YEAR_COLUMN};

/// Explicit month-abbreviation → month-number table.
///
/// The source sheet labels its value columns with Portuguese abbreviations.
/// Keeping the mapping here, rather than leaning on process-wide locale state,
/// makes month derivation deterministic wherever the binary runs.
#[derive(Debug, Clone)]
pub struct MonthMap(HashMap<&'static str, u32>);

static PT_BR: Lazy<MonthMap> = Lazy::new(|| {
    MonthMap(
        [
            ("jan", 1),
            ("fev", 2),
            ("mar", 3),
            ("abr", 4),
            ("mai", 5),
            ("jun", 6),
            ("jul", 7),
            ("ago", 8),
            ("set", 9),
            ("out", 10),
            ("nov", 11),
            ("dez", 12),
        ]
        .into_iter()
        .collect(),
    )
});

impl MonthMap {
    /// The Portuguese abbreviations as printed in the source sheet.
    pub fn pt_br() -> &'static MonthMap {
        &PT_BR
    }

    pub fn month_number(&self, abbr: &str) -> Option<u32> {
        self.0.get(abbr).copied()
    }
}

/// One typed long-format record, the unit persisted to Parquet.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelSalesRecord {
    pub product: String,
    pub unit: String,
    pub uf: String,
    /// First day of the calendar month the volume belongs to.
    pub year_month: NaiveDate,
    pub volume: f64,
    /// Ingestion timestamp, identical on every record of one run.
    pub created_at: DateTime<Utc>,
}

/// Split a combined "PRODUCT (unit)" description on its first parenthesis.
/// Without a parenthesis the whole text is the product and the unit is empty.
pub fn split_product_unit(combined: &str) -> (String, String) {
    match combined.split_once('(') {
        Some((product, rest)) => (
            product.trim().to_string(),
            rest.replace(')', "").trim().to_string(),
        ),
        None => (combined.trim().to_string(), String::new()),
    }
}

/// First day of the month named by `period` in year `ano`.
fn year_month(ano: &str, period: &str, months: &MonthMap) -> Result<NaiveDate> {
    let year: i32 = ano
        .trim()
        .parse()
        .with_context(|| format!("year {:?} is not an integer", ano))?;
    let month = months
        .month_number(period)
        .ok_or_else(|| anyhow!("unknown month abbreviation {:?}", period))?;
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| anyhow!("invalid calendar month {}-{:02}", year, month))
}

/// Turn melted rows into typed records: split the description into product and
/// unit, derive the calendar month, keep the state as `uf`, stamp `created_at`,
/// and zero-fill blank volumes. The remaining feature cells (region, year,
/// description) are dropped here.
pub fn derive_records(
    melted: &[MeltedRow],
    feature_headers: &[String],
    months: &MonthMap,
    created_at: DateTime<Utc>,
) -> Result<Vec<FuelSalesRecord>> {
    let index_of = |name: &str| -> Result<usize> {
        feature_headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("feature column {:?} is missing", name))
    };
    let description = index_of(DESCRIPTION_COLUMN)?;
    let year = index_of(YEAR_COLUMN)?;
    let state = index_of(STATE_COLUMN)?;

    let mut out = Vec::with_capacity(melted.len());
    for row in melted {
        let (product, unit) = split_product_unit(&row.features[description]);
        let year_month = year_month(&row.features[year], &row.period, months)?;
        // Blank or non-numeric cells become an explicit zero, not an error.
        let volume = row.value.trim().parse::<f64>().unwrap_or(0.0);
        out.push(FuelSalesRecord {
            product,
            unit,
            uf: row.features[state].clone(),
            year_month,
            volume,
            created_at,
        });
    }
    Ok(out)
}
