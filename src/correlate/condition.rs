//! Conditional column derivation from a declarative mask

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{CellValue, Column, Table};

use super::require_column;

/// Comparison applied to each value of the mask column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CompareOp {
    /// Substring match against the value's display form
    Contains { pattern: String },
    Eq { value: CellValue },
    Ne { value: CellValue },
    Lt { value: CellValue },
    Le { value: CellValue },
    Gt { value: CellValue },
    Ge { value: CellValue },
    In { values: Vec<CellValue> },
    NotIn { values: Vec<CellValue> },
    IsNull,
    NotNull,
}

impl CompareOp {
    /// Evaluate against one cell. Nulls satisfy only the null checks.
    pub fn matches(&self, cell: &CellValue) -> bool {
        match self {
            CompareOp::IsNull => cell.is_null(),
            CompareOp::NotNull => !cell.is_null(),
            _ if cell.is_null() => false,
            CompareOp::Contains { pattern } => cell.display().contains(pattern.as_str()),
            CompareOp::Eq { value } => cell == value,
            CompareOp::Ne { value } => cell != value,
            CompareOp::Lt { value } => cell.compare(value) == std::cmp::Ordering::Less,
            CompareOp::Le { value } => cell.compare(value) != std::cmp::Ordering::Greater,
            CompareOp::Gt { value } => cell.compare(value) == std::cmp::Ordering::Greater,
            CompareOp::Ge { value } => cell.compare(value) != std::cmp::Ordering::Less,
            CompareOp::In { values } => values.contains(cell),
            CompareOp::NotIn { values } => !values.contains(cell),
        }
    }
}

/// How one condition's result folds into the accumulated mask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combinator {
    #[default]
    And,
    Or,
    Xor,
    AndNot,
}

impl Combinator {
    fn fold(&self, acc: bool, current: bool) -> bool {
        match self {
            Combinator::And => acc && current,
            Combinator::Or => acc || current,
            Combinator::Xor => acc ^ current,
            Combinator::AndNot => acc && !current,
        }
    }
}

/// One (comparison, combinator) step of a mask expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(flatten)]
    pub op: CompareOp,
    /// Ignored on the first condition, which seeds the mask
    #[serde(default)]
    pub combine: Combinator,
}

impl Condition {
    pub fn new(op: CompareOp) -> Self {
        Self {
            op,
            combine: Combinator::default(),
        }
    }

    pub fn with_combinator(mut self, combine: Combinator) -> Self {
        self.combine = combine;
        self
    }
}

/// A literal constant or a row-wise reference to another column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Literal(CellValue),
    Header(String),
}

/// Parameters for [`correlate_on_condition`]
#[derive(Debug, Clone)]
pub struct CorrelateOnConditionSpec {
    /// Column the mask is evaluated over
    pub other: String,
    /// Mask expression, folded left to right
    pub conditions: Vec<Condition>,
    /// Output where the mask holds
    pub value: ValueSource,
    /// Output where the mask fails; falls back to the existing column named
    /// `to_header`, then to null
    pub default: Option<ValueSource>,
    pub to_header: Option<String>,
}

impl CorrelateOnConditionSpec {
    pub fn new(other: impl Into<String>, conditions: Vec<Condition>, value: ValueSource) -> Self {
        Self {
            other: other.into(),
            conditions,
            value,
            default: None,
            to_header: None,
        }
    }

    pub fn with_default(mut self, default: ValueSource) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.to_header = Some(header.into());
        self
    }
}

/// Evaluate the mask over one column
pub(crate) fn evaluate_mask(column: &Column, conditions: &[Condition]) -> Vec<bool> {
    column
        .values
        .iter()
        .map(|cell| {
            let mut acc = match conditions.first() {
                Some(first) => first.op.matches(cell),
                None => false,
            };
            for condition in conditions.iter().skip(1) {
                acc = condition.combine.fold(acc, condition.op.matches(cell));
            }
            acc
        })
        .collect()
}

/// Produce a column that takes `value` where the mask over `other` holds
/// and `default` (or the pre-existing column) where it fails.
pub fn correlate_on_condition(mut table: Table, spec: &CorrelateOnConditionSpec) -> Result<Table> {
    let other = require_column(&table, &spec.other)?;
    let mask = evaluate_mask(other, &spec.conditions);

    let header = spec
        .to_header
        .clone()
        .unwrap_or_else(|| format!("{}_conditional", spec.other));

    let resolve = |source: &ValueSource, row: usize| -> Result<CellValue> {
        Ok(match source {
            ValueSource::Literal(v) => v.clone(),
            ValueSource::Header(h) => require_column(&table, h)?
                .get(row)
                .cloned()
                .unwrap_or(CellValue::Null),
        })
    };

    let fallback_column = table.column(&header).map(|c| c.values.clone());

    let mut values = Vec::with_capacity(mask.len());
    for (row, hit) in mask.iter().enumerate() {
        let cell = if *hit {
            resolve(&spec.value, row)?
        } else {
            match &spec.default {
                Some(default) => resolve(default, row)?,
                None => fallback_column
                    .as_ref()
                    .and_then(|c| c.get(row).cloned())
                    .unwrap_or(CellValue::Null),
            }
        };
        values.push(cell);
    }

    table.push(Column::from_values(header, values))?;
    Ok(table)
}
