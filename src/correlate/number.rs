//! Numeric correlation: jitter, transform, offset, clamp

use serde::{Deserialize, Serialize};

use crate::error::{invalid, Error, Result};
use crate::model::{CellType, CellValue, Column, Table};
use crate::rng::SeededRng;

use super::choice::Choice;
use super::require_column;

/// A named value transform applied to selected rows.
///
/// Closed set; there is no caller-supplied code evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    Abs,
    Negate,
    Sqrt,
    Ln,
    Round,
}

impl Transform {
    /// Apply the transform; a non-finite result is a statistical failure
    pub fn apply(&self, value: f64) -> Result<f64> {
        let out = match self {
            Transform::Abs => value.abs(),
            Transform::Negate => -value,
            Transform::Sqrt => value.sqrt(),
            Transform::Ln => value.ln(),
            Transform::Round => value.round(),
        };
        if out.is_finite() {
            Ok(out)
        } else {
            Err(Error::Statistical(format!(
                "transform {:?} of {} is not finite",
                self, value
            )))
        }
    }
}

/// An additive offset, fixed or taken row-wise from another column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Fixed(f64),
    Header(String),
}

/// Parameters for [`correlate_number`]
#[derive(Debug, Clone)]
pub struct CorrelateNumberSpec {
    /// Header of the column to correlate against
    pub source: String,
    /// Rows to modify; the rest keep their value
    pub choice: Choice,
    /// Unselected rows take this column's value instead of the original
    pub choice_header: Option<String>,
    /// Standard deviation of the additive normal jitter
    pub jitter: f64,
    /// Optional named transform applied after the jitter
    pub transform: Option<Transform>,
    /// Optional offset applied after the transform
    pub offset: Option<Offset>,
    /// Lower clamp bound
    pub lower: Option<f64>,
    /// Upper clamp bound
    pub upper: Option<f64>,
    /// Original zero positions stay zero
    pub keep_zero: bool,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl CorrelateNumberSpec {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            choice: Choice::default(),
            choice_header: None,
            jitter: 0.0,
            transform: None,
            offset: None,
            lower: None,
            upper: None,
            keep_zero: false,
            to_header: None,
            seed: None,
        }
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choice = choice;
        self
    }

    pub fn with_choice_header(mut self, header: impl Into<String>) -> Self {
        self.choice_header = Some(header.into());
        self
    }

    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_offset(mut self, offset: Offset) -> Self {
        self.offset = Some(offset);
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

/// Derive a numeric column by perturbing a chosen subset of rows.
///
/// Per selected row, in fixed order: additive normal jitter, named
/// transform, offset, clamp to `[lower, upper]`. Original nulls stay null;
/// under `keep_zero` original zeros stay zero. Unselected rows keep the
/// original value, or the `choice_header` value when given.
pub fn correlate_number(mut table: Table, spec: &CorrelateNumberSpec) -> Result<Table> {
    let source = require_column(&table, &spec.source)?;
    if !source.cell_type.is_numeric() {
        return Err(invalid(format!(
            "column '{}' is {}, expected a numeric column",
            spec.source, source.cell_type
        )));
    }
    let alternate = match &spec.choice_header {
        Some(h) => Some(require_column(&table, h)?.values.clone()),
        None => None,
    };
    let offsets = match &spec.offset {
        Some(Offset::Header(h)) => Some(require_column(&table, h)?.values.clone()),
        _ => None,
    };
    let integer_output = source.cell_type == CellType::Int;
    let originals = source.values.clone();

    let mut rng = SeededRng::new(spec.seed);
    let mask = spec.choice.mask(originals.len(), &mut rng)?;

    let mut values = Vec::with_capacity(originals.len());
    for (i, original) in originals.iter().enumerate() {
        if !mask[i] {
            values.push(match &alternate {
                Some(alt) => alt[i].clone(),
                None => original.clone(),
            });
            continue;
        }
        if original.is_null() {
            values.push(CellValue::Null);
            continue;
        }
        if spec.keep_zero && original.is_zero() {
            values.push(original.clone());
            continue;
        }

        let mut v = original.as_f64().ok_or_else(|| {
            invalid(format!("non-numeric value in column '{}'", spec.source))
        })?;

        v += rng.normal(0.0, spec.jitter)?;
        if let Some(transform) = spec.transform {
            v = transform.apply(v)?;
        }
        match &spec.offset {
            Some(Offset::Fixed(o)) => v += o,
            Some(Offset::Header(_)) => {
                if let Some(o) = offsets.as_ref().and_then(|col| col[i].as_f64()) {
                    v += o;
                }
            }
            None => {}
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    fn int_table(name: &str, values: Vec<CellValue>) -> Table {
        Table::from_columns(vec![Column::new(name, CellType::Int, values)]).unwrap()
    }

    #[test]
    fn test_offset_keep_zero_keep_null() {
        let table = int_table(
            "x",
            vec![
                CellValue::Int(1),
                CellValue::Int(2),
                CellValue::Int(3),
                CellValue::Int(4),
                CellValue::Int(5),
                CellValue::Int(0),
                CellValue::Null,
            ],
        );
        let spec = CorrelateNumberSpec::new("x")
            .with_choice(Choice::Fraction(1.0))
            .with_jitter(0.0)
            .with_offset(Offset::Fixed(10.0))
            .with_keep_zero(true)
            .with_seed(73);
        let result = correlate_number(table, &spec).unwrap();
        assert_eq!(
            result.column("x_correlated").unwrap().values,
            vec![
                CellValue::Int(11),
                CellValue::Int(12),
                CellValue::Int(13),
                CellValue::Int(14),
                CellValue::Int(15),
                CellValue::Int(0),
                CellValue::Null,
            ]
        );
    }

    #[test]
    fn test_unselected_rows_bit_identical() {
        let originals: Vec<CellValue> = (0..100).map(|i| CellValue::Float(i as f64)).collect();
        let table = Table::from_columns(vec![Column::new(
            "x",
            CellType::Float,
            originals.clone(),
        )])
        .unwrap();
        let spec = CorrelateNumberSpec::new("x")
            .with_choice(Choice::Fraction(0.3))
            .with_jitter(0.01)
            .with_seed(79);
        let result = correlate_number(table, &spec).unwrap();

        let out = &result.column("x_correlated").unwrap().values;
        let untouched = out
            .iter()
            .zip(originals.iter())
            .filter(|(a, b)| a == b)
            .count();
        // 70 rows are unselected and must be bit-identical
        assert!(untouched >= 70, "only {} rows untouched", untouched);
    }

    #[test]
    fn test_clamp_bounds() {
        let table = int_table(
            "x",
            (0..50).map(|i| CellValue::Int(i)).collect(),
        );
        let spec = CorrelateNumberSpec::new("x")
            .with_jitter(100.0)
            .with_bounds(Some(0.0), Some(10.0))
            .with_seed(83);
        let result = correlate_number(table, &spec).unwrap();
        for value in &result.column("x_correlated").unwrap().values {
            let v = value.as_f64().unwrap();
            assert!((0.0..=10.0).contains(&v));
        }
    }

    #[test]
    fn test_missing_header_is_fatal() {
        let table = int_table("x", vec![CellValue::Int(1)]);
        let spec = CorrelateNumberSpec::new("y");
        assert!(matches!(
            correlate_number(table, &spec),
            Err(Error::MissingColumn(_))
        ));
    }

    #[test]
    fn test_ln_of_negative_is_statistical_error() {
        let table = int_table("x", vec![CellValue::Int(-5)]);
        let spec = CorrelateNumberSpec::new("x")
            .with_transform(Transform::Ln)
            .with_seed(89);
        assert!(matches!(
            correlate_number(table, &spec),
            Err(Error::Statistical(_))
        ));
    }

    #[test]
    fn test_choice_header_fills_unselected() {
        let mut table = int_table("x", vec![CellValue::Int(1); 10]);
        table
            .push(Column::new(
                "fallback",
                CellType::Int,
                vec![CellValue::Int(42); 10],
            ))
            .unwrap();
        let spec = CorrelateNumberSpec::new("x")
            .with_choice(Choice::Fraction(0.0))
            .with_choice_header("fallback")
            .with_seed(97);
        let result = correlate_number(table, &spec).unwrap();
        assert!(result
            .column("x_correlated")
            .unwrap()
            .values
            .iter()
            .all(|v| *v == CellValue::Int(42)));
    }
}
