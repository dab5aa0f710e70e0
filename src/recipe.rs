//! Declarative generation recipes
//!
//! A recipe is an ordered list of column operations applied to a growing
//! table. Operations form a closed, serde-tagged enumeration; there is no
//! dynamic dispatch on caller-supplied code. Scalar parameters accept the
//! `${NAME}` sentinel form and are resolved against the environment when
//! the recipe is applied.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::correlate::{
    correlate_dates, correlate_discrete_intervals, correlate_number, correlate_on_condition,
    Choice, Condition, CorrelateDatesSpec, CorrelateDiscreteIntervalsSpec, CorrelateNumberSpec,
    CorrelateOnConditionSpec, Offset, TimeUnit, Transform, ValueSource,
};
use crate::env;
use crate::error::{invalid, Result};
use crate::model::{CellValue, Table};
use crate::rng::SeededRng;
use crate::sample::{
    boolean, category, date_range, distribution, from_samples, number, pattern_string,
    BooleanSpec, CategorySpec, DateRangeSpec, Distribution, DistributionSpec, FromSamplesSpec,
    NumberSpec, Ordered, PatternStringSpec,
};

/// A scalar parameter: a literal number or a `${NAME}` sentinel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Number(f64),
    Sentinel(String),
}

impl Param {
    /// Resolve to a concrete number
    pub fn resolve(&self) -> Result<f64> {
        match self {
            Param::Number(n) => Ok(*n),
            Param::Sentinel(s) => env::resolve_parsed(s),
        }
    }
}

/// A choice parameter: a count, a fraction, or a `${NAME}` sentinel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceParam {
    Choice(Choice),
    Sentinel(String),
}

impl ChoiceParam {
    pub fn resolve(&self) -> Result<Choice> {
        match self {
            ChoiceParam::Choice(c) => Ok(*c),
            ChoiceParam::Sentinel(s) => {
                let raw = env::resolve(s)?;
                if let Ok(count) = raw.parse::<usize>() {
                    Ok(Choice::Count(count))
                } else if let Ok(fraction) = raw.parse::<f64>() {
                    Ok(Choice::Fraction(fraction))
                } else {
                    Err(invalid(format!("cannot parse choice '{}'", raw)))
                }
            }
        }
    }
}

/// An offset parameter: a fixed number, a header name, or a sentinel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OffsetParam {
    Fixed(f64),
    Text(String),
}

impl OffsetParam {
    pub fn resolve(&self) -> Result<Offset> {
        match self {
            OffsetParam::Fixed(n) => Ok(Offset::Fixed(*n)),
            OffsetParam::Text(s) => match env::sentinel_name(s) {
                Some(_) => Ok(Offset::Fixed(env::resolve_parsed(s)?)),
                None => Ok(Offset::Header(s.clone())),
            },
        }
    }
}

/// A literal output value, or a `@header` reference to another column
fn value_source(cell: &CellValue) -> ValueSource {
    match cell {
        CellValue::String(s) => match s.strip_prefix('@') {
            Some(header) => ValueSource::Header(header.to_string()),
            None => ValueSource::Literal(cell.clone()),
        },
        other => ValueSource::Literal(other.clone()),
    }
}

/// One column operation of a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Number {
        start: Param,
        stop: Param,
        #[serde(default)]
        precision: Option<u32>,
        #[serde(default)]
        relative_freq: Option<Vec<f64>>,
        #[serde(default)]
        at_most: Option<usize>,
        #[serde(default)]
        ordered: Ordered,
        #[serde(default)]
        quantity: Option<Param>,
        #[serde(default)]
        to_header: Option<String>,
    },
    Category {
        selection: Vec<String>,
        #[serde(default)]
        relative_freq: Option<Vec<f64>>,
        #[serde(default)]
        ordered: Ordered,
        #[serde(default)]
        quantity: Option<Param>,
        #[serde(default)]
        to_header: Option<String>,
    },
    Boolean {
        #[serde(default)]
        probability: Option<Param>,
        #[serde(default)]
        quantity: Option<Param>,
        #[serde(default)]
        to_header: Option<String>,
    },
    Distribution {
        distribution: Distribution,
        #[serde(default)]
        precision: Option<u32>,
        #[serde(default)]
        ordered: Ordered,
        #[serde(default)]
        quantity: Option<Param>,
        #[serde(default)]
        to_header: Option<String>,
    },
    PatternString {
        pattern: String,
        #[serde(default)]
        quantity: Option<Param>,
        #[serde(default)]
        to_header: Option<String>,
    },
    FromSamples {
        samples: Vec<CellValue>,
        #[serde(default)]
        ordered: Ordered,
        #[serde(default)]
        quantity: Option<Param>,
        #[serde(default)]
        to_header: Option<String>,
    },
    DateRange {
        start: String,
        stop: String,
        #[serde(default)]
        as_date: bool,
        #[serde(default)]
        ordered: Ordered,
        #[serde(default)]
        quantity: Option<Param>,
        #[serde(default)]
        to_header: Option<String>,
    },
    CorrelateNumber {
        source: String,
        #[serde(default)]
        choice: Option<ChoiceParam>,
        #[serde(default)]
        choice_header: Option<String>,
        #[serde(default)]
        jitter: Option<Param>,
        #[serde(default)]
        transform: Option<Transform>,
        #[serde(default)]
        offset: Option<OffsetParam>,
        #[serde(default)]
        lower: Option<Param>,
        #[serde(default)]
        upper: Option<Param>,
        #[serde(default)]
        keep_zero: bool,
        #[serde(default)]
        to_header: Option<String>,
    },
    CorrelateDates {
        source: String,
        #[serde(default)]
        choice: Option<ChoiceParam>,
        #[serde(default)]
        jitter: Option<Param>,
        #[serde(default)]
        unit: Option<TimeUnit>,
        #[serde(default)]
        min_date: Option<String>,
        #[serde(default)]
        max_date: Option<String>,
        #[serde(default)]
        now_delta: Option<TimeUnit>,
        #[serde(default)]
        to_header: Option<String>,
    },
    CorrelateOnCondition {
        other: String,
        conditions: Vec<Condition>,
        value: CellValue,
        #[serde(default)]
        default: Option<CellValue>,
        #[serde(default)]
        to_header: Option<String>,
    },
    CorrelateDiscreteIntervals {
        source: String,
        interval: Param,
        #[serde(default)]
        jitter: Option<Param>,
        #[serde(default)]
        choice: Option<ChoiceParam>,
        #[serde(default)]
        lower: Option<Param>,
        #[serde(default)]
        upper: Option<Param>,
        #[serde(default)]
        keep_zero: bool,
        #[serde(default)]
        to_header: Option<String>,
    },
}

/// An ordered list of column operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub columns: Vec<Op>,
}

impl Recipe {
    /// Parse a recipe from its JSON form
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| invalid(format!("malformed recipe: {}", e)))
    }

    /// Apply every operation in order, building a table of `rows` rows
    pub fn apply(&self, rows: usize, seed: Option<u64>) -> Result<Table> {
        let mut master = SeededRng::new(seed);
        let mut table: Option<Table> = None;
        for op in &self.columns {
            table = Some(apply_op(op, rows, table, master.derive_seed())?);
        }
        Ok(table.unwrap_or_default())
    }
}

fn apply_op(op: &Op, rows: usize, table: Option<Table>, seed: u64) -> Result<Table> {
    match op {
        Op::Number {
            start,
            stop,
            precision,
            relative_freq,
            at_most,
            ordered,
            quantity,
            to_header,
        } => {
            let mut spec = NumberSpec::new(start.resolve()?, stop.resolve()?, rows).with_seed(seed);
            spec.precision = *precision;
            spec.relative_freq = relative_freq.clone();
            spec.at_most = *at_most;
            spec.ordered = *ordered;
            spec.quantity = resolve_opt(quantity)?;
            spec.to_header = to_header.clone();
            number(&spec, table)
        }
        Op::Category {
            selection,
            relative_freq,
            ordered,
            quantity,
            to_header,
        } => {
            let mut spec = CategorySpec::new(selection.clone(), rows).with_seed(seed);
            spec.relative_freq = relative_freq.clone();
            spec.ordered = *ordered;
            spec.quantity = resolve_opt(quantity)?;
            spec.to_header = to_header.clone();
            category(&spec, table)
        }
        Op::Boolean {
            probability,
            quantity,
            to_header,
        } => {
            let mut spec = BooleanSpec::new(rows).with_seed(seed);
            if let Some(p) = probability {
                spec.probability = p.resolve()?;
            }
            spec.quantity = resolve_opt(quantity)?;
            spec.to_header = to_header.clone();
            boolean(&spec, table)
        }
        Op::Distribution {
            distribution: dist,
            precision,
            ordered,
            quantity,
            to_header,
        } => {
            let mut spec = DistributionSpec::new(dist.clone(), rows).with_seed(seed);
            spec.precision = *precision;
            spec.ordered = *ordered;
            spec.quantity = resolve_opt(quantity)?;
            spec.to_header = to_header.clone();
            distribution(&spec, table)
        }
        Op::PatternString {
            pattern,
            quantity,
            to_header,
        } => {
            let mut spec = PatternStringSpec::new(pattern.clone(), rows).with_seed(seed);
            spec.quantity = resolve_opt(quantity)?;
            spec.to_header = to_header.clone();
            pattern_string(&spec, table)
        }
        Op::FromSamples {
            samples,
            ordered,
            quantity,
            to_header,
        } => {
            let mut spec = FromSamplesSpec::new(samples.clone(), rows).with_seed(seed);
            spec.ordered = *ordered;
            spec.quantity = resolve_opt(quantity)?;
            spec.to_header = to_header.clone();
            from_samples(&spec, table)
        }
        Op::DateRange {
            start,
            stop,
            as_date,
            ordered,
            quantity,
            to_header,
        } => {
            let mut spec =
                DateRangeSpec::new(parse_datetime(start)?, parse_datetime(stop)?, rows)
                    .with_seed(seed);
            spec.as_date = *as_date;
            spec.ordered = *ordered;
            spec.quantity = resolve_opt(quantity)?;
            spec.to_header = to_header.clone();
            date_range(&spec, table)
        }
        Op::CorrelateNumber {
            source,
            choice,
            choice_header,
            jitter,
            transform,
            offset,
            lower,
            upper,
            keep_zero,
            to_header,
        } => {
            let mut spec = CorrelateNumberSpec::new(source.clone()).with_seed(seed);
            if let Some(c) = choice {
                spec.choice = c.resolve()?;
            }
            spec.choice_header = choice_header.clone();
            if let Some(j) = jitter {
                spec.jitter = j.resolve()?;
            }
            spec.transform = *transform;
            spec.offset = offset.as_ref().map(|o| o.resolve()).transpose()?;
            spec.lower = resolve_opt(lower)?;
            spec.upper = resolve_opt(upper)?;
            spec.keep_zero = *keep_zero;
            spec.to_header = to_header.clone();
            correlate_number(required(table)?, &spec)
        }
        Op::CorrelateDates {
            source,
            choice,
            jitter,
            unit,
            min_date,
            max_date,
            now_delta,
            to_header,
        } => {
            let mut spec = CorrelateDatesSpec::new(source.clone()).with_seed(seed);
            if let Some(c) = choice {
                spec.choice = c.resolve()?;
            }
            if let Some(j) = jitter {
                spec.jitter = j.resolve()?;
            }
            if let Some(u) = unit {
                spec.unit = *u;
            }
            spec.min_date = min_date.as_deref().map(parse_datetime).transpose()?;
            spec.max_date = max_date.as_deref().map(parse_datetime).transpose()?;
            spec.now_delta = *now_delta;
            spec.to_header = to_header.clone();
            correlate_dates(required(table)?, &spec)
        }
        Op::CorrelateOnCondition {
            other,
            conditions,
            value,
            default,
            to_header,
        } => {
            let mut spec = CorrelateOnConditionSpec::new(
                other.clone(),
                conditions.clone(),
                value_source(value),
            );
            spec.default = default.as_ref().map(value_source);
            spec.to_header = to_header.clone();
            correlate_on_condition(required(table)?, &spec)
        }
        Op::CorrelateDiscreteIntervals {
            source,
            interval,
            jitter,
            choice,
            lower,
            upper,
            keep_zero,
            to_header,
        } => {
            let mut spec =
                CorrelateDiscreteIntervalsSpec::new(source.clone(), interval.resolve()?)
                    .with_seed(seed);
            if let Some(j) = jitter {
                spec.jitter = j.resolve()?;
            }
            if let Some(c) = choice {
                spec.choice = c.resolve()?;
            }
            spec.lower = resolve_opt(lower)?;
            spec.upper = resolve_opt(upper)?;
            spec.keep_zero = *keep_zero;
            spec.to_header = to_header.clone();
            correlate_discrete_intervals(required(table)?, &spec)
        }
    }
}

fn resolve_opt(param: &Option<Param>) -> Result<Option<f64>> {
    param.as_ref().map(|p| p.resolve()).transpose()
}

fn required(table: Option<Table>) -> Result<Table> {
    table.ok_or_else(|| invalid("correlate operations need an existing column to work on"))
}

/// Parse a timestamp from the formats a recipe may carry
fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt);
        }
    }
    Err(invalid(format!("cannot parse date '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_then_correlator() {
        let recipe = Recipe::from_json(
            r#"{
                "columns": [
                    {"op": "number", "start": 0, "stop": 100, "precision": 0, "to_header": "amount"},
                    {"op": "correlate_number", "source": "amount", "jitter": 0, "offset": 5,
                     "to_header": "amount_shifted"}
                ]
            }"#,
        )
        .unwrap();
        let table = recipe.apply(50, Some(193)).unwrap();
        assert_eq!(table.width(), 2);
        assert_eq!(table.height(), 50);
        for i in 0..50 {
            let base = table.column("amount").unwrap().values[i].as_f64().unwrap();
            let shifted = table.column("amount_shifted").unwrap().values[i]
                .as_f64()
                .unwrap();
            assert_eq!(shifted, base + 5.0);
        }
    }

    #[test]
    fn test_env_sentinel_resolution() {
        std::env::set_var("DATASYNTH_TEST_STOP", "10");
        let recipe = Recipe::from_json(
            r#"{"columns": [{"op": "number", "start": 0, "stop": "${DATASYNTH_TEST_STOP}"}]}"#,
        )
        .unwrap();
        let table = recipe.apply(100, Some(197)).unwrap();
        for value in &table.column("number").unwrap().values {
            assert!(value.as_f64().unwrap() < 10.0);
        }
    }

    #[test]
    fn test_unset_sentinel_is_fatal() {
        let recipe = Recipe::from_json(
            r#"{"columns": [{"op": "number", "start": 0, "stop": "${DATASYNTH_RECIPE_UNSET}"}]}"#,
        )
        .unwrap();
        assert!(recipe.apply(10, Some(1)).is_err());
    }

    #[test]
    fn test_correlate_without_source_table() {
        let recipe = Recipe::from_json(
            r#"{"columns": [{"op": "correlate_number", "source": "x"}]}"#,
        )
        .unwrap();
        assert!(recipe.apply(10, Some(1)).is_err());
    }

    #[test]
    fn test_header_marker_in_condition_value() {
        let recipe = Recipe::from_json(
            r#"{
                "columns": [
                    {"op": "number", "start": 0, "stop": 10, "precision": 0, "to_header": "x"},
                    {"op": "category", "selection": ["keep"], "to_header": "label"},
                    {"op": "correlate_on_condition", "other": "x",
                     "conditions": [{"op": "ge", "value": 5}],
                     "value": "@label", "default": "small", "to_header": "bucket"}
                ]
            }"#,
        )
        .unwrap();
        let table = recipe.apply(40, Some(199)).unwrap();
        for i in 0..40 {
            let x = table.column("x").unwrap().values[i].as_f64().unwrap();
            let bucket = &table.column("bucket").unwrap().values[i];
            if x >= 5.0 {
                assert_eq!(*bucket, CellValue::String("keep".into()));
            } else {
                assert_eq!(*bucket, CellValue::String("small".into()));
            }
        }
    }

    #[test]
    fn test_reproducible_apply() {
        let recipe = Recipe::from_json(
            r#"{"columns": [
                {"op": "number", "start": 0, "stop": 1, "to_header": "a"},
                {"op": "boolean", "probability": 0.4, "to_header": "b"}
            ]}"#,
        )
        .unwrap();
        let x = recipe.apply(200, Some(211)).unwrap();
        let y = recipe.apply(200, Some(211)).unwrap();
        assert_eq!(x.column("a").unwrap().values, y.column("a").unwrap().values);
        assert_eq!(x.column("b").unwrap().values, y.column("b").unwrap().values);
    }
}
