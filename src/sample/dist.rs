//! Named distributions behind a closed enum
//!
//! Each supported distribution is one variant with explicit parameters;
//! there is no name-string dispatch at sampling time.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{CellType, CellValue, Table};
use crate::rng::SeededRng;

use super::post::{finish, Ordered};
use super::check_size;

/// A supported sampling distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Distribution {
    Uniform { low: f64, high: f64 },
    Normal { mean: f64, std: f64 },
    /// Normal draws rejected until they land in `[low, high]`
    BoundedNormal {
        mean: f64,
        std: f64,
        low: f64,
        high: f64,
    },
    /// 0/1 draws at the given probability
    Bernoulli { probability: f64 },
}

impl Distribution {
    /// One draw from the distribution
    pub fn sample(&self, rng: &mut SeededRng) -> Result<f64> {
        match *self {
            Distribution::Uniform { low, high } => Ok(rng.uniform(low, high)),
            Distribution::Normal { mean, std } => rng.normal(mean, std),
            Distribution::BoundedNormal {
                mean,
                std,
                low,
                high,
            } => rng.bounded_normal(mean, std, low, high),
            Distribution::Bernoulli { probability } => {
                Ok(if rng.bernoulli(probability)? { 1.0 } else { 0.0 })
            }
        }
    }
}

/// Parameters for [`distribution`]
#[derive(Debug, Clone)]
pub struct DistributionSpec {
    pub distribution: Distribution,
    /// Number of values to generate
    pub size: usize,
    /// Decimal places to round to; 0 produces an integer column
    pub precision: Option<u32>,
    pub ordered: Ordered,
    /// Fraction of the output that must be non-null
    pub quantity: Option<f64>,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl DistributionSpec {
    pub fn new(distribution: Distribution, size: usize) -> Self {
        Self {
            distribution,
            size,
            precision: None,
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

/// Generate a column of draws from a named distribution
pub fn distribution(spec: &DistributionSpec, canonical: Option<Table>) -> Result<Table> {
    check_size(spec.size)?;

    let mut rng = SeededRng::new(spec.seed);
    let integer_output = spec.precision == Some(0);

    let mut values = Vec::with_capacity(spec.size);
    for _ in 0..spec.size {
        let draw = spec.distribution.sample(&mut rng)?;
        values.push(if integer_output {
            CellValue::Int(round_to(draw, 0) as i64)
        } else {
            match spec.precision {
                Some(p) => CellValue::Float(round_to(draw, p)),
                None => CellValue::Float(draw),
            }
        });
    }

    let cell_type = if integer_output {
        CellType::Int
    } else {
        CellType::Float
    };
    let header = spec
        .to_header
        .clone()
        .unwrap_or_else(|| "distribution".into());
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

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_converges() {
        let spec = DistributionSpec::new(
            Distribution::Normal {
                mean: 10.0,
                std: 2.0,
            },
            20000,
        )
        .with_seed(41);
        let table = distribution(&spec, None).unwrap();
        let values: Vec<f64> = table
            .column("distribution")
            .unwrap()
            .values
            .iter()
            .filter_map(|v| v.as_f64())
            .collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((mean - 10.0).abs() < 0.1, "mean {}", mean);
    }

    #[test]
    fn test_bounded_normal_respects_bounds() {
        let spec = DistributionSpec::new(
            Distribution::BoundedNormal {
                mean: 0.0,
                std: 5.0,
                low: -1.0,
                high: 1.0,
            },
            500,
        )
        .with_seed(43);
        let table = distribution(&spec, None).unwrap();
        for value in &table.column("distribution").unwrap().values {
            let v = value.as_f64().unwrap();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_bernoulli_is_zero_one() {
        let spec =
            DistributionSpec::new(Distribution::Bernoulli { probability: 0.3 }, 200).with_seed(47);
        let table = distribution(&spec, None).unwrap();
        for value in &table.column("distribution").unwrap().values {
            let v = value.as_f64().unwrap();
            assert!(v == 0.0 || v == 1.0);
        }
    }

    #[test]
    fn test_negative_std_propagates() {
        let spec = DistributionSpec::new(
            Distribution::Normal {
                mean: 0.0,
                std: -1.0,
            },
            10,
        );
        assert!(distribution(&spec, None).is_err());
    }

    #[test]
    fn test_serde_tagged_form() {
        let d: Distribution =
            serde_json::from_str(r#"{"name":"normal","mean":1.0,"std":0.5}"#).unwrap();
        assert_eq!(
            d,
            Distribution::Normal {
                mean: 1.0,
                std: 0.5
            }
        );
    }
}
