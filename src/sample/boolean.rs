//! Bernoulli boolean sampler

use crate::error::Result;
use crate::model::{CellType, CellValue, Table};
use crate::rng::SeededRng;

use super::post::{finish, Ordered};
use super::check_size;

/// Parameters for [`boolean`]
#[derive(Debug, Clone)]
pub struct BooleanSpec {
    /// Probability of `true` per draw
    pub probability: f64,
    /// Number of values to generate
    pub size: usize,
    /// Fraction of the output that must be non-null
    pub quantity: Option<f64>,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl BooleanSpec {
    pub fn new(size: usize) -> Self {
        Self {
            probability: 0.5,
            size,
            quantity: None,
            to_header: None,
            seed: None,
        }
    }

    pub fn with_probability(mut self, probability: f64) -> Self {
        self.probability = probability;
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

/// Generate a column of seeded Bernoulli trials
pub fn boolean(spec: &BooleanSpec, canonical: Option<Table>) -> Result<Table> {
    check_size(spec.size)?;

    let mut rng = SeededRng::new(spec.seed);
    let mut values = Vec::with_capacity(spec.size);
    for _ in 0..spec.size {
        values.push(CellValue::Bool(rng.bernoulli(spec.probability)?));
    }

    let header = spec.to_header.clone().unwrap_or_else(|| "boolean".into());
    finish(
        values,
        CellType::Bool,
        header,
        Ordered::Shuffled,
        spec.quantity,
        &mut rng,
        canonical,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_null_rate() {
        let spec = BooleanSpec::new(10000).with_quantity(0.8).with_seed(31);
        let table = boolean(&spec, None).unwrap();
        let column = table.column("boolean").unwrap();
        let non_null = column.len() - column.null_count();
        assert_eq!(non_null, 8000);
    }

    #[test]
    fn test_probability_converges() {
        let spec = BooleanSpec::new(20000).with_probability(0.25).with_seed(37);
        let table = boolean(&spec, None).unwrap();
        let trues = table
            .column("boolean")
            .unwrap()
            .values
            .iter()
            .filter(|v| matches!(v, CellValue::Bool(true)))
            .count();
        let rate = trues as f64 / 20000.0;
        assert!((rate - 0.25).abs() < 0.02, "rate {}", rate);
    }

    #[test]
    fn test_rejects_bad_probability() {
        assert!(boolean(&BooleanSpec::new(10).with_probability(1.5), None).is_err());
    }
}
