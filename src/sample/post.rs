//! Post-processing shared by every sampler: ordering and null injection

use serde::{Deserialize, Serialize};

use crate::error::{invalid, Result};
use crate::model::{CellType, CellValue, Column, Table};
use crate::rng::SeededRng;

use super::append;

/// Final arrangement of a generated column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ordered {
    /// Concatenated sub-bin results are shuffled together
    #[default]
    Shuffled,
    Ascending,
    Descending,
}

/// Arrange values according to the requested ordering
pub(crate) fn arrange(values: &mut [CellValue], ordered: Ordered, rng: &mut SeededRng) {
    match ordered {
        Ordered::Shuffled => rng.shuffle(values),
        Ordered::Ascending => values.sort_by(|a, b| a.compare(b)),
        Ordered::Descending => values.sort_by(|a, b| b.compare(a)),
    }
}

/// Replace a seeded subset of values with nulls so that the `quantity`
/// fraction of the column stays non-null.
pub fn apply_quantity(
    values: &mut Vec<CellValue>,
    quantity: f64,
    rng: &mut SeededRng,
) -> Result<()> {
    if !(0.0..=1.0).contains(&quantity) {
        return Err(invalid(format!("quantity {} outside [0, 1]", quantity)));
    }
    let size = values.len();
    let keep = (quantity * size as f64).round() as usize;
    let null_count = size - keep.min(size);
    if null_count == 0 {
        return Ok(());
    }
    for idx in rng.sample_indices(size, null_count)? {
        values[idx] = CellValue::Null;
    }
    Ok(())
}

/// Order, null-inject, name, and append a generated column.
///
/// This is the single exit path of every sampler, so the `quantity`
/// mechanism behaves uniformly across them.
pub(crate) fn finish(
    mut values: Vec<CellValue>,
    cell_type: CellType,
    header: String,
    ordered: Ordered,
    quantity: Option<f64>,
    rng: &mut SeededRng,
    canonical: Option<Table>,
) -> Result<Table> {
    arrange(&mut values, ordered, rng);
    if let Some(q) = quantity {
        apply_quantity(&mut values, q, rng)?;
    }
    append(canonical, Column::new(header, cell_type, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_exact_null_count() {
        let mut rng = SeededRng::from_seed(3);
        let mut values: Vec<CellValue> = (0..10000).map(CellValue::Int).collect();
        apply_quantity(&mut values, 0.8, &mut rng).unwrap();
        let nulls = values.iter().filter(|v| v.is_null()).count();
        assert_eq!(nulls, 2000);
    }

    #[test]
    fn test_quantity_rejects_out_of_range() {
        let mut rng = SeededRng::from_seed(3);
        let mut values = vec![CellValue::Int(1)];
        assert!(apply_quantity(&mut values, 1.5, &mut rng).is_err());
        assert!(apply_quantity(&mut values, -0.1, &mut rng).is_err());
    }

    #[test]
    fn test_arrange_ascending() {
        let mut rng = SeededRng::from_seed(3);
        let mut values = vec![
            CellValue::Int(3),
            CellValue::Int(1),
            CellValue::Null,
            CellValue::Int(2),
        ];
        arrange(&mut values, Ordered::Ascending, &mut rng);
        assert_eq!(
            values,
            vec![
                CellValue::Int(1),
                CellValue::Int(2),
                CellValue::Int(3),
                CellValue::Null
            ]
        );
    }
}
