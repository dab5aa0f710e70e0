//! Date correlation: time-unit jitter, clamping, elapsed-from-now

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{invalid, Result};
use crate::model::{CellType, CellValue, Column, Table};
use crate::rng::SeededRng;
use crate::sample::dates::{from_micros, micros_of};

use super::choice::Choice;
use super::require_column;

/// Unit a date jitter or delta is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
}

impl TimeUnit {
    /// Microseconds in one unit
    pub fn micros(&self) -> f64 {
        match self {
            TimeUnit::Week => 7.0 * 24.0 * 3_600.0 * 1e6,
            TimeUnit::Day => 24.0 * 3_600.0 * 1e6,
            TimeUnit::Hour => 3_600.0 * 1e6,
            TimeUnit::Minute => 60.0 * 1e6,
            TimeUnit::Second => 1e6,
            TimeUnit::Millisecond => 1e3,
            TimeUnit::Microsecond => 1.0,
        }
    }
}

/// Parameters for [`correlate_dates`]
#[derive(Debug, Clone)]
pub struct CorrelateDatesSpec {
    /// Header of the column to correlate against
    pub source: String,
    /// Rows to modify; the rest keep their value
    pub choice: Choice,
    /// Standard deviation of the jitter, in `unit`s
    pub jitter: f64,
    /// Unit the jitter is expressed in
    pub unit: TimeUnit,
    /// Clamp below
    pub min_date: Option<NaiveDateTime>,
    /// Clamp above
    pub max_date: Option<NaiveDateTime>,
    /// Convert the final column to elapsed-time-from-now scalars in this
    /// unit instead of returning dates. Reads the wall clock, so the output
    /// is not reproducible from the seed alone.
    pub now_delta: Option<TimeUnit>,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl CorrelateDatesSpec {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            choice: Choice::default(),
            jitter: 0.0,
            unit: TimeUnit::Day,
            min_date: None,
            max_date: None,
            now_delta: None,
            to_header: None,
            seed: None,
        }
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choice = choice;
        self
    }

    pub fn with_jitter(mut self, jitter: f64, unit: TimeUnit) -> Self {
        self.jitter = jitter;
        self.unit = unit;
        self
    }

    pub fn with_min_date(mut self, min_date: NaiveDateTime) -> Self {
        self.min_date = Some(min_date);
        self
    }

    pub fn with_max_date(mut self, max_date: NaiveDateTime) -> Self {
        self.max_date = Some(max_date);
        self
    }

    pub fn with_now_delta(mut self, unit: TimeUnit) -> Self {
        self.now_delta = Some(unit);
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

/// Derive a date column by jittering a chosen subset of rows.
///
/// The jitter is converted to microsecond-scale normal noise and added as a
/// time delta; `min_date`/`max_date` clamp the result. Nulls stay null.
pub fn correlate_dates(mut table: Table, spec: &CorrelateDatesSpec) -> Result<Table> {
    let source = require_column(&table, &spec.source)?;
    if !source.cell_type.is_temporal() {
        return Err(invalid(format!(
            "column '{}' is {}, expected a date column",
            spec.source, source.cell_type
        )));
    }
    let date_output = source.cell_type == CellType::Date;
    let originals = source.values.clone();

    let mut rng = SeededRng::new(spec.seed);
    let mask = spec.choice.mask(originals.len(), &mut rng)?;

    let low = spec.min_date.map(micros_of);
    let high = spec.max_date.map(micros_of);
    let jitter_micros = spec.jitter * spec.unit.micros();

    let mut values = Vec::with_capacity(originals.len());
    for (i, original) in originals.iter().enumerate() {
        let micros = match original {
            CellValue::Date(d) => micros_of(d.and_hms_opt(0, 0, 0).expect("midnight exists")),
            CellValue::DateTime(dt) => micros_of(*dt),
            CellValue::Null => {
                values.push(CellValue::Null);
                continue;
            }
            other => {
                return Err(invalid(format!(
                    "non-date value {:?} in column '{}'",
                    other, spec.source
                )))
            }
        };

        let mut out = micros;
        if mask[i] {
            out += rng.normal(0.0, jitter_micros)?.round() as i64;
            if let Some(low) = low {
                out = out.max(low);
            }
            if let Some(high) = high {
                out = out.min(high);
            }
        }

        let dt = from_micros(out)?;
        values.push(if date_output {
            CellValue::Date(dt.date())
        } else {
            CellValue::DateTime(dt)
        });
    }

    let header = spec
        .to_header
        .clone()
        .unwrap_or_else(|| format!("{}_correlated", spec.source));

    let column = match spec.now_delta {
        None => Column::new(
            header,
            if date_output {
                CellType::Date
            } else {
                CellType::DateTime
            },
            values,
        ),
        Some(unit) => {
            let now = micros_of(Utc::now().naive_utc());
            let deltas: Vec<CellValue> = values
                .into_iter()
                .map(|v| match v {
                    CellValue::Date(d) => {
                        let us = micros_of(d.and_hms_opt(0, 0, 0).expect("midnight exists"));
                        CellValue::Float((now - us) as f64 / unit.micros())
                    }
                    CellValue::DateTime(dt) => {
                        CellValue::Float((now - micros_of(dt)) as f64 / unit.micros())
                    }
                    _ => CellValue::Null,
                })
                .collect();
            Column::new(header, CellType::Float, deltas)
        }
    };

    table.push(column)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn date_table(values: Vec<CellValue>) -> Table {
        Table::from_columns(vec![Column::new("when", CellType::DateTime, values)]).unwrap()
    }

    #[test]
    fn test_zero_jitter_is_identity() {
        let table = date_table(vec![
            CellValue::DateTime(dt("2024-03-01")),
            CellValue::Null,
            CellValue::DateTime(dt("2024-03-05")),
        ]);
        let spec = CorrelateDatesSpec::new("when").with_seed(101);
        let result = correlate_dates(table, &spec).unwrap();
        assert_eq!(
            result.column("when_correlated").unwrap().values,
            vec![
                CellValue::DateTime(dt("2024-03-01")),
                CellValue::Null,
                CellValue::DateTime(dt("2024-03-05")),
            ]
        );
    }

    #[test]
    fn test_clamped_to_bounds() {
        let values: Vec<CellValue> = (1..=20)
            .map(|d| {
                CellValue::DateTime(
                    NaiveDate::from_ymd_opt(2024, 6, d).unwrap().and_hms_opt(0, 0, 0).unwrap(),
                )
            })
            .collect();
        let spec = CorrelateDatesSpec::new("when")
            .with_jitter(30.0, TimeUnit::Day)
            .with_min_date(dt("2024-06-01"))
            .with_max_date(dt("2024-06-30"))
            .with_seed(103);
        let result = correlate_dates(date_table(values), &spec).unwrap();
        for value in &result.column("when_correlated").unwrap().values {
            match value {
                CellValue::DateTime(v) => {
                    assert!(*v >= dt("2024-06-01") && *v <= dt("2024-06-30"))
                }
                other => panic!("unexpected value {:?}", other),
            }
        }
    }

    #[test]
    fn test_now_delta_yields_floats() {
        let table = date_table(vec![CellValue::DateTime(dt("2020-01-01"))]);
        let spec = CorrelateDatesSpec::new("when")
            .with_now_delta(TimeUnit::Day)
            .with_seed(107);
        let result = correlate_dates(table, &spec).unwrap();
        let column = result.column("when_correlated").unwrap();
        assert_eq!(column.cell_type, CellType::Float);
        // 2020-01-01 is comfortably more than a thousand days ago
        assert!(column.values[0].as_f64().unwrap() > 1000.0);
    }

    #[test]
    fn test_rejects_non_date_column() {
        let table = Table::from_columns(vec![Column::new(
            "x",
            CellType::Int,
            vec![CellValue::Int(1)],
        )])
        .unwrap();
        assert!(correlate_dates(table, &CorrelateDatesSpec::new("x")).is_err());
    }
}
