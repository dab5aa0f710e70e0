//! Uniform number sampler with sub-range weighting

use rustc_hash::FxHashMap;

use crate::error::{invalid, Result};
use crate::model::{CellType, CellValue, Table};
use crate::rng::SeededRng;

use super::freq::{partition, slice_range};
use super::post::{finish, Ordered};
use super::check_size;

/// Parameters for [`number`]
#[derive(Debug, Clone)]
pub struct NumberSpec {
    /// Inclusive lower bound of the range
    pub start: f64,
    /// Exclusive upper bound of the range
    pub stop: f64,
    /// Number of values to generate
    pub size: usize,
    /// Decimal places to round to; 0 produces an integer column
    pub precision: Option<u32>,
    /// Weights slicing the range into proportional sub-intervals
    pub relative_freq: Option<Vec<f64>>,
    /// Cap on how many times any single value may appear
    pub at_most: Option<usize>,
    pub ordered: Ordered,
    /// Fraction of the output that must be non-null
    pub quantity: Option<f64>,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl NumberSpec {
    pub fn new(start: f64, stop: f64, size: usize) -> Self {
        Self {
            start,
            stop,
            size,
            precision: None,
            relative_freq: None,
            at_most: None,
            ordered: Ordered::default(),
            quantity: None,
            to_header: None,
            seed: None,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn with_relative_freq(mut self, weights: Vec<f64>) -> Self {
        self.relative_freq = Some(weights);
        self
    }

    pub fn with_at_most(mut self, at_most: usize) -> Self {
        self.at_most = Some(at_most);
        self
    }

    pub fn with_ordered(mut self, ordered: Ordered) -> Self {
        self.ordered = ordered;
        self
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.to_header = Some(header.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Generate a column of uniform numbers in `[start, stop)`.
///
/// With a multi-weight `relative_freq` the range is sliced into contiguous
/// sub-intervals proportional to the weights, the total size is partitioned
/// proportionally across them, each sub-bin draws from its own slice, and
/// the concatenation is shuffled (or sorted per `ordered`).
pub fn number(spec: &NumberSpec, canonical: Option<Table>) -> Result<Table> {
    check_size(spec.size)?;
    if spec.stop <= spec.start {
        return Err(invalid(format!(
            "stop ({}) must be greater than start ({})",
            spec.stop, spec.start
        )));
    }
    if spec.at_most == Some(0) {
        return Err(invalid("at_most must be a positive integer"));
    }

    let mut rng = SeededRng::new(spec.seed);

    let (counts, slices) = match spec.relative_freq.as_deref() {
        Some(weights) if weights.len() > 1 => (
            partition(spec.size, weights)?,
            slice_range(spec.start, spec.stop, weights),
        ),
        _ => (vec![spec.size], vec![(spec.start, spec.stop)]),
    };

    let mut draws = Vec::with_capacity(spec.size);
    for (&count, &(low, high)) in counts.iter().zip(slices.iter()) {
        draw_bin(&mut draws, count, low, high, spec, &mut rng)?;
    }

    let integer_output = spec.precision == Some(0);
    let values: Vec<CellValue> = draws
        .into_iter()
        .map(|v| {
            if integer_output {
                CellValue::Int(v as i64)
            } else {
                CellValue::Float(v)
            }
        })
        .collect();
    let cell_type = if integer_output {
        CellType::Int
    } else {
        CellType::Float
    };

    let header = spec.to_header.clone().unwrap_or_else(|| "number".into());
    finish(
        values,
        cell_type,
        header,
        spec.ordered,
        spec.quantity,
        &mut rng,
        canonical,
    )
}

/// Draw one sub-bin's values into `out`
fn draw_bin(
    out: &mut Vec<f64>,
    count: usize,
    low: f64,
    high: f64,
    spec: &NumberSpec,
    rng: &mut SeededRng,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }

    match spec.at_most {
        None => {
            for _ in 0..count {
                out.push(rounded(rng.uniform(low, high), spec.precision));
            }
            Ok(())
        }
        Some(cap) => {
            // Oversample a candidate pool, cap each distinct value's
            // multiplicity, then draw without replacement from what is left.
            let pool_size = count.saturating_mul(3).max(16);
            let mut multiplicity: FxHashMap<u64, usize> = FxHashMap::default();
            let mut pool = Vec::with_capacity(pool_size);
            for _ in 0..pool_size {
                let v = rounded(rng.uniform(low, high), spec.precision);
                let seen = multiplicity.entry(v.to_bits()).or_insert(0);
                if *seen < cap {
                    *seen += 1;
                    pool.push(v);
                }
            }
            if pool.len() < count {
                return Err(invalid(format!(
                    "at_most {} leaves only {} candidates for {} draws in [{}, {})",
                    cap,
                    pool.len(),
                    count,
                    low,
                    high
                )));
            }
            rng.shuffle(&mut pool);
            out.extend(pool.into_iter().take(count));
            Ok(())
        }
    }
}

/// Round to `precision` decimal places when requested
fn rounded(value: f64, precision: Option<u32>) -> f64 {
    match precision {
        None => value,
        Some(p) => {
            let factor = 10f64.powi(p as i32);
            (value * factor).round() / factor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_containment() {
        let table = number(&NumberSpec::new(5.0, 10.0, 1000).with_seed(1), None).unwrap();
        let column = table.column("number").unwrap();
        assert_eq!(column.len(), 1000);
        for value in &column.values {
            let v = value.as_f64().unwrap();
            assert!((5.0..10.0).contains(&v), "value {} out of range", v);
        }
    }

    #[test]
    fn test_reproducible_with_seed() {
        let spec = NumberSpec::new(0.0, 1.0, 500).with_seed(99).with_quantity(0.9);
        let a = number(&spec, None).unwrap();
        let b = number(&spec, None).unwrap();
        assert_eq!(a.column("number").unwrap().values, b.column("number").unwrap().values);
    }

    #[test]
    fn test_rejects_inverted_range() {
        assert!(number(&NumberSpec::new(10.0, 5.0, 10), None).is_err());
        assert!(number(&NumberSpec::new(5.0, 5.0, 10), None).is_err());
    }

    #[test]
    fn test_rejects_zero_size() {
        assert!(number(&NumberSpec::new(0.0, 1.0, 0), None).is_err());
    }

    #[test]
    fn test_precision_zero_yields_ints() {
        let table = number(
            &NumberSpec::new(0.0, 100.0, 50).with_precision(0).with_seed(7),
            None,
        )
        .unwrap();
        let column = table.column("number").unwrap();
        assert_eq!(column.cell_type, CellType::Int);
        assert!(column.values.iter().all(|v| matches!(v, CellValue::Int(_))));
    }

    #[test]
    fn test_relative_freq_slices_range() {
        // Two equal weights: half the draws land in each half of the range
        let spec = NumberSpec::new(0.0, 10.0, 1000)
            .with_relative_freq(vec![1.0, 1.0])
            .with_seed(11);
        let table = number(&spec, None).unwrap();
        let low_half = table
            .column("number")
            .unwrap()
            .values
            .iter()
            .filter(|v| v.as_f64().unwrap() < 5.0)
            .count();
        assert_eq!(low_half, 500);
    }

    #[test]
    fn test_at_most_caps_repeats() {
        // Integer output over a 5-wide range forces collisions
        let spec = NumberSpec::new(0.0, 5.0, 10)
            .with_precision(0)
            .with_at_most(2)
            .with_seed(13);
        let table = number(&spec, None).unwrap();
        let mut counts: FxHashMap<i64, usize> = FxHashMap::default();
        for value in &table.column("number").unwrap().values {
            if let CellValue::Int(i) = value {
                *counts.entry(*i).or_insert(0) += 1;
            }
        }
        assert!(counts.values().all(|&c| c <= 2));
    }

    #[test]
    fn test_at_most_pool_exhausted() {
        // Rounding [0, 2) leaves three distinct integers, far short of 10
        // draws at cap 1
        let spec = NumberSpec::new(0.0, 2.0, 10)
            .with_precision(0)
            .with_at_most(1)
            .with_seed(13);
        assert!(number(&spec, None).is_err());
    }

    #[test]
    fn test_ordered_ascending() {
        let spec = NumberSpec::new(0.0, 1.0, 100)
            .with_ordered(Ordered::Ascending)
            .with_seed(17);
        let table = number(&spec, None).unwrap();
        let values = &table.column("number").unwrap().values;
        for pair in values.windows(2) {
            assert!(pair[0].as_f64().unwrap() <= pair[1].as_f64().unwrap());
        }
    }

    #[test]
    fn test_appends_to_canonical() {
        let first = number(&NumberSpec::new(0.0, 1.0, 10).with_seed(1), None).unwrap();
        let both = number(
            &NumberSpec::new(5.0, 6.0, 10).with_seed(2).with_header("second"),
            Some(first),
        )
        .unwrap();
        assert_eq!(both.width(), 2);
        assert_eq!(both.height(), 10);
    }
}
