//! Samplers: produce a column of synthetic values drawn from a
//! distribution, category set, pattern, or date range

mod boolean;
mod category;
pub(crate) mod dates;
mod dist;
pub mod freq;
mod number;
mod post;
mod samples;
mod strings;

pub use boolean::{boolean, BooleanSpec};
pub use category::{category, CategorySpec};
pub use dates::{date_range, DateRangeSpec};
pub use dist::{distribution, Distribution, DistributionSpec};
pub use number::{number, NumberSpec};
pub use post::{apply_quantity, Ordered};
pub use samples::{from_samples, FromSamplesSpec};
pub use strings::{pattern_string, PatternStringSpec};

use crate::error::{invalid, Result};
use crate::model::{Column, Table};

/// Validate a requested sample size
pub(crate) fn check_size(size: usize) -> Result<()> {
    if size == 0 {
        return Err(invalid("size must be a positive integer"));
    }
    Ok(())
}

/// Append a generated column to the canonical table, or start a fresh one
pub(crate) fn append(canonical: Option<Table>, column: Column) -> Result<Table> {
    match canonical {
        Some(mut table) => {
            table.push(column)?;
            Ok(table)
        }
        None => Table::from_columns(vec![column]),
    }
}
