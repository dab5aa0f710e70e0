//! Resampling from caller-supplied example values

use crate::error::Result;
use crate::model::{CellType, CellValue, Table};
use crate::rng::SeededRng;

use super::post::{finish, Ordered};
use super::check_size;

/// Parameters for [`from_samples`]
#[derive(Debug, Clone)]
pub struct FromSamplesSpec {
    /// Example values to draw from, with replacement
    pub samples: Vec<CellValue>,
    /// Number of values to generate
    pub size: usize,
    pub ordered: Ordered,
    /// Fraction of the output that must be non-null
    pub quantity: Option<f64>,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl FromSamplesSpec {
    pub fn new(samples: Vec<CellValue>, size: usize) -> Self {
        Self {
            samples,
            size,
            ordered: Ordered::default(),
            quantity: None,
            to_header: None,
            seed: None,
        }
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

/// Generate a column by drawing with replacement from example values.
///
/// An empty sample set yields an all-null column of the requested size.
pub fn from_samples(spec: &FromSamplesSpec, canonical: Option<Table>) -> Result<Table> {
    check_size(spec.size)?;

    let mut rng = SeededRng::new(spec.seed);
    let header = spec.to_header.clone().unwrap_or_else(|| "sample".into());

    if spec.samples.is_empty() {
        let values = vec![CellValue::Null; spec.size];
        return finish(
            values,
            CellType::Null,
            header,
            spec.ordered,
            spec.quantity,
            &mut rng,
            canonical,
        );
    }

    let values: Vec<CellValue> = (0..spec.size)
        .map(|_| spec.samples[rng.index(spec.samples.len())].clone())
        .collect();
    let cell_type = spec
        .samples
        .iter()
        .fold(CellType::Null, |acc, v| acc.widen(v.cell_type()));

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

    #[test]
    fn test_draws_only_from_samples() {
        let samples = vec![CellValue::Int(1), CellValue::Int(5), CellValue::Int(9)];
        let spec = FromSamplesSpec::new(samples.clone(), 200).with_seed(71);
        let table = from_samples(&spec, None).unwrap();
        for value in &table.column("sample").unwrap().values {
            assert!(samples.contains(value));
        }
    }

    #[test]
    fn test_empty_samples_yield_nulls() {
        let table = from_samples(&FromSamplesSpec::new(vec![], 7).with_seed(1), None).unwrap();
        let column = table.column("sample").unwrap();
        assert_eq!(column.len(), 7);
        assert!(column.values.iter().all(|v| v.is_null()));
    }
}
