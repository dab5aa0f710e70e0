//! Categorical sampler

use crate::error::{invalid, Result};
use crate::model::{CellType, CellValue, Table};
use crate::rng::SeededRng;

use super::freq::partition;
use super::post::{finish, Ordered};
use super::check_size;

/// Parameters for [`category`]
#[derive(Debug, Clone)]
pub struct CategorySpec {
    /// Category labels to draw from
    pub selection: Vec<String>,
    /// Number of values to generate
    pub size: usize,
    /// Per-category weights; one weight per label when present
    pub relative_freq: Option<Vec<f64>>,
    pub ordered: Ordered,
    /// Fraction of the output that must be non-null
    pub quantity: Option<f64>,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl CategorySpec {
    pub fn new(selection: Vec<String>, size: usize) -> Self {
        Self {
            selection,
            size,
            relative_freq: None,
            ordered: Ordered::default(),
            quantity: None,
            to_header: None,
            seed: None,
        }
    }

    pub fn with_relative_freq(mut self, weights: Vec<f64>) -> Self {
        self.relative_freq = Some(weights);
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

/// Generate a dictionary-like column of category labels.
///
/// An empty `selection` yields an all-null column of the requested size; a
/// sparse category set is a degenerate input, not an error.
pub fn category(spec: &CategorySpec, canonical: Option<Table>) -> Result<Table> {
    check_size(spec.size)?;

    let mut rng = SeededRng::new(spec.seed);
    let header = spec.to_header.clone().unwrap_or_else(|| "category".into());

    if spec.selection.is_empty() {
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

    let values: Vec<CellValue> = match spec.relative_freq.as_deref() {
        Some(weights) => {
            if weights.len() != spec.selection.len() {
                return Err(invalid(format!(
                    "relative_freq has {} weights for {} categories",
                    weights.len(),
                    spec.selection.len()
                )));
            }
            let counts = partition(spec.size, weights)?;
            let mut out = Vec::with_capacity(spec.size);
            for (label, count) in spec.selection.iter().zip(counts) {
                out.extend(
                    std::iter::repeat_with(|| CellValue::String(label.clone())).take(count),
                );
            }
            out
        }
        None => (0..spec.size)
            .map(|_| CellValue::String(spec.selection[rng.index(spec.selection.len())].clone()))
            .collect(),
    };

    finish(
        values,
        CellType::Category,
        header,
        spec.ordered,
        spec.quantity,
        &mut rng,
        canonical,
    )
}
