// src/transform/reshape.rs
use anyhow::{bail, Result};

/// Label of the aggregate value column. It is a precomputed sum of the twelve
/// months and is excluded from the long table to avoid double counting.
pub const TOTAL_PERIOD: &str = "total";

/// One long-format record before typing: the replicated feature cells plus the
/// (period, value) pair taken from a single value column.
#[derive(Debug, Clone, PartialEq)]
pub struct MeltedRow {
    /// Feature cells, positionally aligned with the feature header set.
    pub features: Vec<String>,
    pub period: String,
    pub value: String,
}

/// Merge the feature sub-table with the realigned value sub-table and unpivot
/// the value columns, skipping the aggregate period.
///
/// The two sub-tables are row-aligned by position; a mismatch means an earlier
/// stage reordered or filtered rows and is rejected. Output length is
/// `rows × (value columns - 1)`.
pub fn melt(
    feature_rows: &[Vec<String>],
    value_headers: &[String],
    value_rows: &[Vec<String>],
) -> Result<Vec<MeltedRow>> {
    if feature_rows.len() != value_rows.len() {
        bail!(
            "feature rows ({}) and value rows ({}) are not aligned",
            feature_rows.len(),
            value_rows.len()
        );
    }

    let periods = value_headers.len();
    let mut out = Vec::with_capacity(feature_rows.len() * periods.saturating_sub(1));
    for (pos, (features, values)) in feature_rows.iter().zip(value_rows).enumerate() {
        if values.len() != periods {
            bail!(
                "value row {} has {} cells for {} value columns",
                pos,
                values.len(),
                periods
            );
        }
        for (period, value) in value_headers.iter().zip(values) {
            if period == TOTAL_PERIOD {
                continue;
            }
            out.push(MeltedRow {
                features: features.clone(),
                period: period.clone(),
                value: value.clone(),
            });
        }
    }
    Ok(out)
}
