//! Correlators: derive a new column from an existing one by perturbing a
//! seeded subset of rows

mod choice;
mod condition;
mod dates;
mod intervals;
mod number;

pub use choice::Choice;
pub use condition::{
    correlate_on_condition, Combinator, CompareOp, Condition, CorrelateOnConditionSpec,
    ValueSource,
};
pub use dates::{correlate_dates, CorrelateDatesSpec, TimeUnit};
pub use intervals::{correlate_discrete_intervals, CorrelateDiscreteIntervalsSpec};
pub use number::{correlate_number, CorrelateNumberSpec, Offset, Transform};

use crate::error::Error;
use crate::model::{Column, Table};

/// Look up a source column or fail hard
pub(crate) fn require_column<'t>(table: &'t Table, name: &str) -> Result<&'t Column, Error> {
    table
        .column(name)
        .ok_or_else(|| Error::MissingColumn(name.to_string()))
}
