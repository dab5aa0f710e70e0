//! Pattern-based string sampler

use crate::error::Result;
use crate::model::{CellType, CellValue, Table};
use crate::rng::SeededRng;

use super::post::{finish, Ordered};
use super::check_size;

const DIGITS: &[u8] = b"0123456789";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const ALNUM: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Parameters for [`pattern_string`]
#[derive(Debug, Clone)]
pub struct PatternStringSpec {
    /// Placeholder pattern: `#` digit, `A` uppercase, `a` lowercase,
    /// `*` alphanumeric; any other character is emitted literally
    pub pattern: String,
    /// Number of values to generate
    pub size: usize,
    /// Fraction of the output that must be non-null
    pub quantity: Option<f64>,
    pub to_header: Option<String>,
    pub seed: Option<u64>,
}

impl PatternStringSpec {
    pub fn new(pattern: impl Into<String>, size: usize) -> Self {
        Self {
            pattern: pattern.into(),
            size,
            quantity: None,
            to_header: None,
            seed: None,
        }
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

/// Generate a column of strings expanded from a placeholder pattern
pub fn pattern_string(spec: &PatternStringSpec, canonical: Option<Table>) -> Result<Table> {
    check_size(spec.size)?;

    let mut rng = SeededRng::new(spec.seed);
    let values: Vec<CellValue> = (0..spec.size)
        .map(|_| CellValue::String(expand(&spec.pattern, &mut rng)))
        .collect();

    let header = spec.to_header.clone().unwrap_or_else(|| "string".into());
    finish(
        values,
        CellType::String,
        header,
        Ordered::Shuffled,
        spec.quantity,
        &mut rng,
        canonical,
    )
}

fn expand(pattern: &str, rng: &mut SeededRng) -> String {
    pattern
        .chars()
        .map(|c| match c {
            '#' => DIGITS[rng.index(DIGITS.len())] as char,
            'A' => UPPER[rng.index(UPPER.len())] as char,
            'a' => LOWER[rng.index(LOWER.len())] as char,
            '*' => ALNUM[rng.index(ALNUM.len())] as char,
            other => other,
        })
        .collect()
}
