//! Row-subset selection for correlators

use serde::{Deserialize, Serialize};

use crate::error::{invalid, Result};
use crate::rng::SeededRng;

/// How many rows a correlator modifies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Choice {
    /// An explicit number of rows
    Count(usize),
    /// A fraction of the total row count, in [0, 1]
    Fraction(f64),
}

impl Default for Choice {
    fn default() -> Self {
        Choice::Fraction(1.0)
    }
}

impl Choice {
    /// Number of rows this choice selects out of `rows`
    pub fn resolve(&self, rows: usize) -> Result<usize> {
        match *self {
            Choice::Count(n) => {
                if n > rows {
                    Err(invalid(format!("choice {} exceeds {} rows", n, rows)))
                } else {
                    Ok(n)
                }
            }
            Choice::Fraction(f) => {
                if !(0.0..=1.0).contains(&f) {
                    Err(invalid(format!("choice fraction {} outside [0, 1]", f)))
                } else {
                    Ok((f * rows as f64).round() as usize)
                }
            }
        }
    }

    /// Seeded selection mask: `true` marks a row to modify
    pub(crate) fn mask(&self, rows: usize, rng: &mut SeededRng) -> Result<Vec<bool>> {
        let count = self.resolve(rows)?;
        let mut mask = vec![false; rows];
        for idx in rng.sample_indices(rows, count)? {
            mask[idx] = true;
        }
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_resolve() {
        assert_eq!(Choice::Fraction(0.3).resolve(10).unwrap(), 3);
        assert_eq!(Choice::Fraction(1.0).resolve(7).unwrap(), 7);
        assert_eq!(Choice::Fraction(0.0).resolve(7).unwrap(), 0);
    }

    #[test]
    fn test_count_resolve() {
        assert_eq!(Choice::Count(4).resolve(10).unwrap(), 4);
        assert!(Choice::Count(11).resolve(10).is_err());
    }

    #[test]
    fn test_rejects_bad_fraction() {
        assert!(Choice::Fraction(1.5).resolve(10).is_err());
        assert!(Choice::Fraction(-0.1).resolve(10).is_err());
    }

    #[test]
    fn test_mask_counts() {
        let mut rng = SeededRng::from_seed(5);
        let mask = Choice::Fraction(0.3).mask(100, &mut rng).unwrap();
        assert_eq!(mask.iter().filter(|&&m| m).count(), 30);
    }

    #[test]
    fn test_untagged_serde() {
        let count: Choice = serde_json::from_str("5").unwrap();
        assert_eq!(count, Choice::Count(5));
        let fraction: Choice = serde_json::from_str("0.25").unwrap();
        assert_eq!(fraction, Choice::Fraction(0.25));
    }
}
