//! Grid-step correlation for discretized numeric columns

use crate::error::{invalid, Result};
use crate::model::{CellType, CellValue, Column, Table};
use crate::rng::SeededRng;

use super::choice::Choice;
use super::require_column;

/// Parameters for [`correlate_discrete_intervals`]
#[derive(Debug, Clone)]
pub struct CorrelateDiscreteIntervalsSpec {
    /// Header of the column to correlate against
    pub source: String,
    /// Width of one grid step
    pub interval: f64,
    /// Standard deviation of the step-count jitter, in steps
    pub jitter: f64,
    /// Rows to modify; the rest keep their value
    pub choice: Choice,
    /// Lower clamp bound
    pub lower: Option<f64>,
    /// Upper clamp bound
    pub upper: Option<f64>,
    /// Original zero positions stay zero
    pub keep_zero: bool,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl CorrelateDiscreteIntervalsSpec {
    pub fn new(source: impl Into<String>, interval: f64) -> Self {
        Self {
            source: source.into(),
            interval,
            jitter: 1.0,
            choice: Choice::default(),
            lower: None,
            upper: None,
            keep_zero: false,
            to_header: None,
            seed: None,
        }
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choice = choice;
        self
    }

    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    pub fn with_keep_zero(mut self, keep_zero: bool) -> Self {
        self.keep_zero = keep_zero;
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

/// Derive a column by moving selected rows a whole number of grid steps.
///
/// The step count per selected row is a rounded normal draw, so modified
/// values stay on the same `interval` grid as the original. Nulls stay
/// null; under `keep_zero` zeros stay zero.
pub fn correlate_discrete_intervals(
    mut table: Table,
    spec: &CorrelateDiscreteIntervalsSpec,
) -> Result<Table> {
    if spec.interval <= 0.0 || !spec.interval.is_finite() {
        return Err(invalid(format!(
            "interval must be positive, got {}",
            spec.interval
        )));
    }
    let source = require_column(&table, &spec.source)?;
    if !source.cell_type.is_numeric() {
        return Err(invalid(format!(
            "column '{}' is {}, expected a numeric column",
            spec.source, source.cell_type
        )));
    }
    let integer_output = source.cell_type == CellType::Int;
    let originals = source.values.clone();

    let mut rng = SeededRng::new(spec.seed);
    let mask = spec.choice.mask(originals.len(), &mut rng)?;

    let mut values = Vec::with_capacity(originals.len());
    for (i, original) in originals.iter().enumerate() {
        if !mask[i] || original.is_null() || (spec.keep_zero && original.is_zero()) {
            values.push(original.clone());
            continue;
        }

        let base = original.as_f64().ok_or_else(|| {
            invalid(format!("non-numeric value in column '{}'", spec.source))
        })?;
        let steps = rng.normal(0.0, spec.jitter)?.round();
        let mut v = base + steps * spec.interval;
        if let Some(lower) = spec.lower {
            v = v.max(lower);
        }
        if let Some(upper) = spec.upper {
            v = v.min(upper);
        }

        values.push(if integer_output {
            CellValue::Int(v.round() as i64)
        } else {
            CellValue::Float(v)
        });
    }

    let header = spec
        .to_header
        .clone()
        .unwrap_or_else(|| format!("{}_correlated", spec.source));
    let cell_type = if integer_output {
        CellType::Int
    } else {
        CellType::Float
    };
    table.push(Column::new(header, cell_type, values))?;
    Ok(table)
}
