//! Date-range sampler and microsecond conversion helpers

use chrono::NaiveDateTime;

use crate::error::{invalid, Error, Result};
use crate::model::{CellType, CellValue, Table};
use crate::rng::SeededRng;

use super::post::{finish, Ordered};
use super::check_size;

/// Microseconds since the epoch for a naive timestamp
pub(crate) fn micros_of(dt: NaiveDateTime) -> i64 {
    dt.and_utc().timestamp_micros()
}

/// Rebuild a naive timestamp from epoch microseconds
pub(crate) fn from_micros(us: i64) -> Result<NaiveDateTime> {
    chrono::DateTime::from_timestamp_micros(us)
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| Error::Statistical(format!("timestamp {}us out of range", us)))
}

/// Parameters for [`date_range`]
#[derive(Debug, Clone)]
pub struct DateRangeSpec {
    /// Inclusive lower bound
    pub start: NaiveDateTime,
    /// Exclusive upper bound
    pub stop: NaiveDateTime,
    /// Number of values to generate
    pub size: usize,
    /// Emit calendar dates instead of timestamps
    pub as_date: bool,
    pub ordered: Ordered,
    /// Fraction of the output that must be non-null
    pub quantity: Option<f64>,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl DateRangeSpec {
    pub fn new(start: NaiveDateTime, stop: NaiveDateTime, size: usize) -> Self {
        Self {
            start,
            stop,
            size,
            as_date: false,
            ordered: Ordered::default(),
            quantity: None,
            to_header: None,
            seed: None,
        }
    }

    pub fn with_as_date(mut self, as_date: bool) -> Self {
        self.as_date = as_date;
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

/// Generate a column of uniform timestamps in `[start, stop)` at
/// microsecond granularity
pub fn date_range(spec: &DateRangeSpec, canonical: Option<Table>) -> Result<Table> {
    check_size(spec.size)?;
    if spec.stop <= spec.start {
        return Err(invalid(format!(
            "stop ({}) must be after start ({})",
            spec.stop, spec.start
        )));
    }

    let mut rng = SeededRng::new(spec.seed);
    let low = micros_of(spec.start);
    let high = micros_of(spec.stop);

    let mut values = Vec::with_capacity(spec.size);
    for _ in 0..spec.size {
        let dt = from_micros(rng.uniform_int(low, high))?;
        values.push(if spec.as_date {
            CellValue::Date(dt.date())
        } else {
            CellValue::DateTime(dt)
        });
    }

    let cell_type = if spec.as_date {
        CellType::Date
    } else {
        CellType::DateTime
    };
    let header = spec.to_header.clone().unwrap_or_else(|| "date".into());
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

    #[test]
    fn test_range_containment() {
        let spec = DateRangeSpec::new(dt("2024-01-01"), dt("2024-02-01"), 500).with_seed(59);
        let table = date_range(&spec, None).unwrap();
        for value in &table.column("date").unwrap().values {
            match value {
                CellValue::DateTime(v) => {
                    assert!(*v >= dt("2024-01-01") && *v < dt("2024-02-01"))
                }
                other => panic!("unexpected value {:?}", other),
            }
        }
    }

    #[test]
    fn test_as_date_output() {
        let spec = DateRangeSpec::new(dt("2024-01-01"), dt("2024-01-10"), 50)
            .with_as_date(true)
            .with_seed(61);
        let table = date_range(&spec, None).unwrap();
        let column = table.column("date").unwrap();
        assert_eq!(column.cell_type, CellType::Date);
        assert!(column.values.iter().all(|v| matches!(v, CellValue::Date(_))));
    }

    #[test]
    fn test_ascending_order() {
        let spec = DateRangeSpec::new(dt("2024-01-01"), dt("2025-01-01"), 200)
            .with_ordered(Ordered::Ascending)
            .with_seed(67);
        let table = date_range(&spec, None).unwrap();
        let values = &table.column("date").unwrap().values;
        for pair in values.windows(2) {
            assert!(pair[0].compare(&pair[1]) != std::cmp::Ordering::Greater);
        }
    }

    #[test]
    fn test_rejects_inverted_range() {
        let spec = DateRangeSpec::new(dt("2024-02-01"), dt("2024-01-01"), 10);
        assert!(date_range(&spec, None).is_err());
    }

    #[test]
    fn test_micros_round_trip() {
        let v = NaiveDate::parse_from_str("2024-06-15", "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(12, 30, 45)
            .unwrap();
        assert_eq!(from_micros(micros_of(v)).unwrap(), v);
    }
}
