// src/transform/realign.rs
use anyhow::{bail, Result};

/// Number of value columns in the source layout: the 12 months plus the
/// trailing "total" aggregate. The decoding rotation below is only correct for
/// exactly this layout.
pub const VALUE_COLUMN_COUNT: usize = 13;

/// Circular left-shift amount that decodes the value cells of the row at
/// 0-indexed position `row`.
///
/// The upstream publication scrambles the value cells with an offset that grows
/// by one per row, resets every 13 rows, and leaves every 13th row untouched.
/// The amount depends only on `row % 13`; it is a fixed contract matching the
/// source sheet and must not be generalized.
pub fn rotation(row: usize) -> usize {
    let m = row % VALUE_COLUMN_COUNT;
    if m == VALUE_COLUMN_COUNT - 1 {
        0
    } else {
        m + 1
    }
}

/// Undo the per-row cyclical offset of the value sub-table.
///
/// Pure transform: a fresh table is produced, row order and row count are kept,
/// and every output row is a circular permutation of its input row. A row
/// without exactly 13 cells violates the layout the rotation is keyed to and is
/// rejected outright.
pub fn realign_rows(rows: &[Vec<String>]) -> Result<Vec<Vec<String>>> {
    let mut out = Vec::with_capacity(rows.len());
    for (pos, row) in rows.iter().enumerate() {
        if row.len() != VALUE_COLUMN_COUNT {
            bail!(
                "value row {} has {} cells, expected {}",
                pos,
                row.len(),
                VALUE_COLUMN_COUNT
            );
        }
        let shift = rotation(pos);
        let mut decoded = Vec::with_capacity(VALUE_COLUMN_COUNT);
        decoded.extend_from_slice(&row[shift..]);
        decoded.extend_from_slice(&row[..shift]);
        out.push(decoded);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[i32]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn rotation_is_periodic_with_period_13() {
        for r in 0..52 {
            assert_eq!(rotation(r), rotation(r + 13), "row {}", r);
        }
    }

    #[test]
    fn every_13th_row_is_the_identity() {
        assert_eq!(rotation(12), 0);
        assert_eq!(rotation(25), 0);
        assert_eq!(rotation(38), 0);
    }

    #[test]
    fn rotation_grows_by_one_within_a_block() {
        assert_eq!(rotation(0), 1);
        assert_eq!(rotation(1), 2);
        assert_eq!(rotation(11), 12);
        assert_eq!(rotation(13), 1);
    }

    #[test]
    fn first_row_shifts_left_by_one() {
        let input = vec![row(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 99])];
        let out = realign_rows(&input).unwrap();
        assert_eq!(out[0], row(&[2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 99, 1]));
    }

    #[test]
    fn row_at_position_12_is_unchanged() {
        let input: Vec<Vec<String>> = (0..13)
            .map(|i| row(&(0..13).map(|c| i * 13 + c).collect::<Vec<_>>()))
            .collect();
        let out = realign_rows(&input).unwrap();
        assert_eq!(out[12], input[12]);
    }

    #[test]
    fn realignment_permutes_without_adding_or_dropping_values() {
        let input: Vec<Vec<String>> = (0..40)
            .map(|i| row(&(0..13).map(|c| i * 100 + c).collect::<Vec<_>>()))
            .collect();
        let out = realign_rows(&input).unwrap();
        assert_eq!(out.len(), input.len());
        for (before, after) in input.iter().zip(&out) {
            assert_eq!(after.len(), VALUE_COLUMN_COUNT);
            let mut a = before.clone();
            let mut b = after.clone();
            a.sort();
            b.sort();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn rejects_rows_with_the_wrong_width() {
        let short = vec![row(&[1, 2, 3])];
        let err = realign_rows(&short).unwrap_err();
        assert!(err.to_string().contains("expected 13"), "{}", err);

        let long = vec![row(&(0..14).collect::<Vec<_>>())];
        assert!(realign_rows(&long).is_err());
    }
}
