//! Distribution-replica analysis
//!
//! Builds a new table whose columns statistically mimic a reference table's
//! columns without copying reference rows verbatim. Dispatch is a closed
//! match over the column's type tag, one strategy per variant.

use indexmap::IndexMap;

use crate::error::Result;
use crate::model::{CellType, CellValue, Column, Table};
use crate::rng::SeededRng;
use crate::sample::dates::{from_micros, micros_of};
use crate::sample::{apply_quantity, category, check_size, CategorySpec};

/// Parameters for [`analyze`]
#[derive(Debug, Clone, Default)]
pub struct AnalyzeSpec {
    /// Number of rows in the replica
    pub size: usize,
    /// Replica date columns come out ascending instead of shuffled
    pub ordered_dates: bool,
    /// String columns to treat as categorical
    pub categorical: Vec<String>,
    pub seed: Option<u64>,
}

impl AnalyzeSpec {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn with_ordered_dates(mut self, ordered: bool) -> Self {
        self.ordered_dates = ordered;
        self
    }

    pub fn with_categorical(mut self, headers: Vec<String>) -> Self {
        self.categorical = headers;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Produce a replica table mimicking each reference column's empirical
/// distribution, including its null fraction.
pub fn analyze(reference: &Table, spec: &AnalyzeSpec) -> Result<Table> {
    check_size(spec.size)?;

    let mut master = SeededRng::new(spec.seed);
    let mut replica = Table::new();
    for column in reference.columns() {
        let column_seed = master.derive_seed();
        replica.push(replicate_column(column, spec, column_seed)?)?;
    }
    Ok(replica)
}

/// Replicate a single column by its type tag
fn replicate_column(column: &Column, spec: &AnalyzeSpec, seed: u64) -> Result<Column> {
    let mut rng = SeededRng::from_seed(seed);
    let size = spec.size;

    // No statistical basis to model from
    if column.null_count() == column.len() {
        return Ok(Column::new(&column.name, column.cell_type, vec![CellValue::Null; size]));
    }

    let treat_as_category = column.cell_type == CellType::Category
        || (column.cell_type == CellType::String && spec.categorical.contains(&column.name));

    let mut values = if treat_as_category {
        replicate_category(column, size, &mut rng)?
    } else {
        match column.cell_type {
            CellType::Int | CellType::Float => replicate_numeric(column, size, &mut rng)?,
            CellType::Bool => match replicate_boolean(column, size, &mut rng)? {
                Some(values) => values,
                // All-false reference: short-circuit to all-null
                None => {
                    return Ok(Column::new(
                        &column.name,
                        column.cell_type,
                        vec![CellValue::Null; size],
                    ))
                }
            },
            CellType::String => replicate_strings(column, size, &mut rng),
            CellType::Date | CellType::DateTime => {
                replicate_dates(column, size, spec.ordered_dates, &mut rng)?
            }
            // Mixed and degenerate tags fall back to opaque resampling
            _ => replicate_strings(column, size, &mut rng),
        }
    };

    // Match the reference column's missingness rate
    let quantity = 1.0 - column.null_fraction();
    apply_quantity(&mut values, quantity, &mut rng)?;

    Ok(Column::new(&column.name, column.cell_type, values))
}

/// Redraw category labels at the reference's empirical frequencies
fn replicate_category(
    column: &Column,
    size: usize,
    rng: &mut SeededRng,
) -> Result<Vec<CellValue>> {
    let mut frequencies: IndexMap<String, f64> = IndexMap::new();
    for value in column.non_null() {
        *frequencies
            .entry(value.display().into_owned())
            .or_insert(0.0) += 1.0;
    }

    let (selection, weights): (Vec<String>, Vec<f64>) = frequencies.into_iter().unzip();
    let table = category(
        &CategorySpec::new(selection, size)
            .with_relative_freq(weights)
            .with_header("replica")
            .with_seed(rng.derive_seed()),
        None,
    )?;
    Ok(table
        .column("replica")
        .map(|c| c.values.clone())
        .unwrap_or_default())
}

/// Tile, shuffle, and jitter numeric values at 10% of the empirical std.
///
/// Tiling repeats the reference pool when the target size exceeds it;
/// the replica is bootstrap-like by design.
fn replicate_numeric(column: &Column, size: usize, rng: &mut SeededRng) -> Result<Vec<CellValue>> {
    let pool: Vec<f64> = column.non_null().filter_map(|v| v.as_f64()).collect();
    let (_, std) = mean_std(&pool);
    let jitter = 0.1 * std;
    let integer_output = column.cell_type == CellType::Int;

    let mut tiled = tile(&pool, size);
    rng.shuffle(&mut tiled);

    let mut values = Vec::with_capacity(size);
    for base in tiled {
        let v = base + rng.normal(0.0, jitter)?;
        values.push(if integer_output {
            CellValue::Int(v.round() as i64)
        } else {
            CellValue::Float(v)
        });
    }
    Ok(values)
}

/// Redraw Bernoulli trials at the empirical true-rate.
///
/// Returns None for an all-false reference.
fn replicate_boolean(
    column: &Column,
    size: usize,
    rng: &mut SeededRng,
) -> Result<Option<Vec<CellValue>>> {
    let mut trues = 0usize;
    let mut total = 0usize;
    for value in column.non_null() {
        total += 1;
        if matches!(value, CellValue::Bool(true)) {
            trues += 1;
        }
    }
    if trues == 0 {
        return Ok(None);
    }

    let p = trues as f64 / total as f64;
    let mut values = Vec::with_capacity(size);
    for _ in 0..size {
        values.push(CellValue::Bool(rng.bernoulli(p)?));
    }
    Ok(Some(values))
}

/// Opaque resample: tile and shuffle, no perturbation
fn replicate_strings(column: &Column, size: usize, rng: &mut SeededRng) -> Vec<CellValue> {
    let pool: Vec<CellValue> = column.non_null().cloned().collect();
    let mut tiled = tile(&pool, size);
    rng.shuffle(&mut tiled);
    tiled
}

/// Resample timestamps and jitter in microsecond units
fn replicate_dates(
    column: &Column,
    size: usize,
    ordered: bool,
    rng: &mut SeededRng,
) -> Result<Vec<CellValue>> {
    let date_output = column.cell_type == CellType::Date;
    let pool: Vec<i64> = column
        .non_null()
        .filter_map(|v| match v {
            CellValue::Date(d) => d.and_hms_opt(0, 0, 0).map(micros_of),
            CellValue::DateTime(dt) => Some(micros_of(*dt)),
            _ => None,
        })
        .collect();
    let as_floats: Vec<f64> = pool.iter().map(|&us| us as f64).collect();
    let (_, std) = mean_std(&as_floats);
    let jitter = 0.1 * std;

    let mut tiled = tile(&pool, size);
    rng.shuffle(&mut tiled);

    let mut micros = Vec::with_capacity(size);
    for base in tiled {
        micros.push(base + rng.normal(0.0, jitter)?.round() as i64);
    }
    if ordered {
        micros.sort_unstable();
    }

    micros
        .into_iter()
        .map(|us| {
            from_micros(us).map(|dt| {
                if date_output {
                    CellValue::Date(dt.date())
                } else {
                    CellValue::DateTime(dt)
                }
            })
        })
        .collect()
}

/// Repeat a pool of values until `size` values are collected
fn tile<T: Clone>(pool: &[T], size: usize) -> Vec<T> {
    pool.iter().cloned().cycle().take(size).collect()
}

/// Empirical mean and population standard deviation
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reference_numeric(n: usize, nulls: usize) -> Column {
        let mut values: Vec<CellValue> = (0..n - nulls)
            .map(|i| CellValue::Float(50.0 + (i % 20) as f64))
            .collect();
        values.extend(std::iter::repeat(CellValue::Null).take(nulls));
        Column::new("x", CellType::Float, values)
    }

    #[test]
    fn test_numeric_mean_std_converge() {
        let reference = Table::from_columns(vec![reference_numeric(1000, 0)]).unwrap();
        let replica = analyze(&reference, &AnalyzeSpec::new(10000).with_seed(127)).unwrap();

        let source: Vec<f64> = reference.column("x").unwrap().non_null().filter_map(|v| v.as_f64()).collect();
        let out: Vec<f64> = replica.column("x").unwrap().non_null().filter_map(|v| v.as_f64()).collect();
        let (ref_mean, ref_std) = mean_std(&source);
        let (out_mean, out_std) = mean_std(&out);

        assert!((ref_mean - out_mean).abs() < 0.5, "{} vs {}", ref_mean, out_mean);
        // Jitter at 10% of std widens the replica std by under 1%
        assert!((ref_std - out_std).abs() / ref_std < 0.05, "{} vs {}", ref_std, out_std);
    }

    #[test]
    fn test_null_fraction_fidelity() {
        let reference = Table::from_columns(vec![reference_numeric(1000, 200)]).unwrap();
        let replica = analyze(&reference, &AnalyzeSpec::new(1000).with_seed(131)).unwrap();
        let fraction = replica.column("x").unwrap().null_fraction();
        assert!((fraction - 0.2).abs() < 0.03, "null fraction {}", fraction);
    }

    #[test]
    fn test_category_frequencies_converge() {
        let mut values = Vec::new();
        for _ in 0..750 {
            values.push(CellValue::String("A".into()));
        }
        for _ in 0..250 {
            values.push(CellValue::String("B".into()));
        }
        let reference = Table::from_columns(vec![Column::new("c", CellType::Category, values)])
            .unwrap();
        let replica = analyze(&reference, &AnalyzeSpec::new(20000).with_seed(137)).unwrap();

        let a_count = replica
            .column("c")
            .unwrap()
            .values
            .iter()
            .filter(|v| **v == CellValue::String("A".into()))
            .count();
        let ratio = a_count as f64 / 20000.0;
        assert!((ratio - 0.75).abs() < 0.01, "ratio {}", ratio);
    }

    #[test]
    fn test_all_null_short_circuit() {
        let reference = Table::from_columns(vec![Column::new(
            "empty",
            CellType::Float,
            vec![CellValue::Null; 10],
        )])
        .unwrap();
        let replica = analyze(&reference, &AnalyzeSpec::new(25).with_seed(139)).unwrap();
        let column = replica.column("empty").unwrap();
        assert_eq!(column.len(), 25);
        assert!(column.values.iter().all(|v| v.is_null()));
    }

    #[test]
    fn test_all_false_boolean_short_circuit() {
        let reference = Table::from_columns(vec![Column::new(
            "flag",
            CellType::Bool,
            vec![CellValue::Bool(false); 50],
        )])
        .unwrap();
        let replica = analyze(&reference, &AnalyzeSpec::new(50).with_seed(149)).unwrap();
        assert!(replica.column("flag").unwrap().values.iter().all(|v| v.is_null()));
    }

    #[test]
    fn test_boolean_rate_converges() {
        let mut values = vec![CellValue::Bool(true); 300];
        values.extend(vec![CellValue::Bool(false); 700]);
        let reference =
            Table::from_columns(vec![Column::new("flag", CellType::Bool, values)]).unwrap();
        let replica = analyze(&reference, &AnalyzeSpec::new(20000).with_seed(151)).unwrap();
        let trues = replica
            .column("flag")
            .unwrap()
            .values
            .iter()
            .filter(|v| **v == CellValue::Bool(true))
            .count();
        let rate = trues as f64 / 20000.0;
        assert!((rate - 0.3).abs() < 0.02, "rate {}", rate);
    }

    #[test]
    fn test_string_resample_draws_from_pool() {
        let pool: Vec<CellValue> = ["red", "green", "blue"]
            .iter()
            .map(|s| CellValue::String((*s).into()))
            .collect();
        let reference = Table::from_columns(vec![Column::new(
            "color",
            CellType::String,
            tile(&pool, 30),
        )])
        .unwrap();
        let replica = analyze(&reference, &AnalyzeSpec::new(100).with_seed(157)).unwrap();
        for value in replica.column("color").unwrap().non_null() {
            assert!(pool.contains(value));
        }
    }

    #[test]
    fn test_ordered_dates() {
        let values: Vec<CellValue> = (1..=28)
            .map(|d| {
                CellValue::DateTime(
                    NaiveDate::from_ymd_opt(2023, 2, d)
                        .unwrap()
                        .and_hms_opt(6, 0, 0)
                        .unwrap(),
                )
            })
            .collect();
        let reference =
            Table::from_columns(vec![Column::new("ts", CellType::DateTime, values)]).unwrap();
        let replica = analyze(
            &reference,
            &AnalyzeSpec::new(100).with_ordered_dates(true).with_seed(163),
        )
        .unwrap();
        let out = &replica.column("ts").unwrap().values;
        for pair in out.windows(2) {
            if pair[0].is_null() || pair[1].is_null() {
                continue;
            }
            assert!(pair[0].compare(&pair[1]) != std::cmp::Ordering::Greater);
        }
    }

    #[test]
    fn test_replica_is_reproducible() {
        let reference = Table::from_columns(vec![reference_numeric(100, 10)]).unwrap();
        let a = analyze(&reference, &AnalyzeSpec::new(500).with_seed(167)).unwrap();
        let b = analyze(&reference, &AnalyzeSpec::new(500).with_seed(167)).unwrap();
        assert_eq!(a.column("x").unwrap().values, b.column("x").unwrap().values);
    }
}
