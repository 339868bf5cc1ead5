// Row enumeration
// Lazily assigns every parameter setting a contiguous, non-overlapping
// index block so concurrent dispatch never needs a shared counter

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

use super::row::Row;

/// Invalid enumeration input. Fatal: detected before any row is
/// dispatched and aborts the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("duplicate value in axis '{axis}': {value}")]
    DuplicateAxisValue { axis: String, value: String },
}

/// Validate that an axis declared unique contains no duplicate entries.
pub fn ensure_unique<T: Eq + Hash + Debug>(items: &[T], axis: &str) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item) {
            return Err(ConfigError::DuplicateAxisValue {
                axis: axis.to_string(),
                value: format!("{item:?}"),
            });
        }
    }
    Ok(())
}

/// Turn an ordered sequence of parameter settings into indexed rows.
///
/// Settings are consumed lazily and in their declared order, so two
/// enumerations over identical axes produce identical
/// `(index, parameters)` assignments; artifact filenames and metadata
/// tables keyed by the mapping are reproducible. Each row reserves a
/// block of `fan_out(&params)` consecutive indices, starting where the
/// previous block ended. Settings with a fan-out of zero can produce no
/// records and are skipped without consuming an index.
pub fn enumerate_rows<P, I, F>(settings: I, fan_out: F) -> impl Iterator<Item = Row<P>>
where
    I: IntoIterator<Item = P>,
    F: Fn(&P) -> u64,
{
    settings
        .into_iter()
        .scan(0u64, move |next_index, params| {
            let fan_out = fan_out(&params);
            let row = Row {
                index: *next_index,
                fan_out,
                params,
            };
            *next_index += fan_out;
            Some(row)
        })
        .filter(|row| row.fan_out > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_fan_out_counts_up() {
        let rows: Vec<Row<u32>> = enumerate_rows(0..5u32, |_| 1).collect();
        assert_eq!(rows.len(), 5);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.index, i as u64);
            assert_eq!(row.fan_out, 1);
        }
    }

    #[test]
    fn test_enumeration_is_deterministic() {
        let settings = vec![("C", 0u8), ("D", 2), ("E", 4)];
        let first: Vec<_> = enumerate_rows(settings.clone(), |_| 3).collect();
        let second: Vec<_> = enumerate_rows(settings, |_| 3).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fan_out_blocks_are_contiguous_and_disjoint() {
        let fan_outs = [4u64, 1, 7, 2, 10];
        let rows: Vec<Row<u64>> =
            enumerate_rows(fan_outs.iter().copied(), |k| *k).collect();

        let mut claimed = HashSet::new();
        for row in &rows {
            // Exactly fan_out members, none claimed by another block.
            for index in row.index..row.index + row.fan_out {
                assert!(claimed.insert(index), "index {index} reserved twice");
            }
        }
        assert_eq!(claimed.len(), fan_outs.iter().sum::<u64>() as usize);
        // Blocks tile the range with no gaps.
        let max = *claimed.iter().max().unwrap();
        assert_eq!(max + 1, claimed.len() as u64);
    }

    #[test]
    fn test_zero_fan_out_settings_are_skipped() {
        let fan_outs = [2u64, 0, 3];
        let rows: Vec<Row<u64>> =
            enumerate_rows(fan_outs.iter().copied(), |k| *k).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[1].index, 2);
    }

    #[test]
    fn test_duplicate_axis_values_are_rejected() {
        let progressions = [("ionian", [1, 4, 5, 1]), ("ionian", [1, 4, 5, 1])];
        let result = ensure_unique(&progressions, "progressions");
        assert!(matches!(
            result,
            Err(ConfigError::DuplicateAxisValue { .. })
        ));

        let distinct = [("ionian", [1, 4, 5, 1]), ("aeolian", [1, 4, 5, 1])];
        assert!(ensure_unique(&distinct, "progressions").is_ok());
    }
}
