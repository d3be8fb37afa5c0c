//! Pattern grammar and evaluation.
//!
//! Numeric values use `range:`, `equal:` and `notequal:`; every other value
//! is stringified and checked with `match:` or `notmatch:`. Evaluation
//! answers "is this value compliant", so `false` means the alert condition
//! holds.

use crate::error::{AlertError, Result};
use decanter_common::event::PropertyValue;
use regex::Regex;
use std::cmp::Ordering;
use std::str::FromStr;

const RANGE: &str = "range:";
const EQUAL: &str = "equal:";
const NOT_EQUAL: &str = "notequal:";
const MATCH: &str = "match:";
const NOT_MATCH: &str = "notmatch:";

/// A numeric value or pattern literal, normalised for comparison.
///
/// Integers stay exact. `Single` keeps `f32` values apart so that literals
/// are narrowed to `f32` before comparing against them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    Single(f32),
    Double(f64),
}

impl Number {
    /// Parses a pattern literal: floating point when it contains `.`,
    /// integer otherwise.
    pub fn parse_literal(literal: &str) -> Result<Self> {
        let literal = literal.trim();
        let parsed = if literal.contains('.') {
            literal.parse::<f64>().ok().map(Number::Double)
        } else {
            literal.parse::<i64>().ok().map(|i| Number::Int(i128::from(i)))
        };
        parsed.ok_or_else(|| AlertError::InvalidNumber(literal.to_string()))
    }

    /// Returns `Ok(None)` for non-numeric values.
    pub fn from_value(value: &PropertyValue) -> Result<Option<Self>> {
        let number = match value {
            PropertyValue::Short(v) => Number::Int(i128::from(*v)),
            PropertyValue::Integer(v) => Number::Int(i128::from(*v)),
            PropertyValue::Long(v) => Number::Int(i128::from(*v)),
            PropertyValue::Float(v) => Number::Single(*v),
            PropertyValue::Double(v) => Number::Double(*v),
            PropertyValue::Decimal(text) => parse_decimal(text)?,
            _ => return Ok(None),
        };
        Ok(Some(number))
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Single(f) => f64::from(f),
            Number::Double(f) => f,
        }
    }

    /// Orders `self` (a value) against `literal`. `None` when either side is
    /// NaN.
    pub fn compare(self, literal: Number) -> Option<Ordering> {
        match (self, literal) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (Number::Single(a), b) => a.partial_cmp(&(b.as_f64() as f32)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

fn parse_decimal(text: &str) -> Result<Number> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i128>() {
        return Ok(Number::Int(i));
    }
    text.parse::<f64>()
        .map(Number::Double)
        .map_err(|_| AlertError::InvalidNumber(text.to_string()))
}

/// Patterns applied to numeric values.
///
/// # Examples
///
/// ```
/// use decanter_alert::pattern::{Number, NumericPattern};
///
/// let pattern: NumericPattern = "range:[0,100)".parse().unwrap();
/// assert!(pattern.check(Number::Int(0)));
/// assert!(!pattern.check(Number::Int(100)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum NumericPattern {
    Range {
        min: Number,
        min_included: bool,
        max: Number,
        max_included: bool,
    },
    Equal(Vec<Number>),
    NotEqual(Vec<Number>),
}

impl FromStr for NumericPattern {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(body) = s.strip_prefix(RANGE) {
            parse_range(body)
        } else if let Some(body) = s.strip_prefix(EQUAL) {
            Ok(Self::Equal(parse_literals(body)?))
        } else if let Some(body) = s.strip_prefix(NOT_EQUAL) {
            Ok(Self::NotEqual(parse_literals(body)?))
        } else {
            Err(AlertError::UnknownPattern(s.to_string()))
        }
    }
}

fn parse_range(body: &str) -> Result<NumericPattern> {
    let min_included = match body.chars().next() {
        Some('[') => true,
        Some('(') => false,
        _ => return Err(AlertError::RangeBrackets(body.to_string())),
    };
    let max_included = match body.chars().next_back() {
        Some(']') if body.len() > 1 => true,
        Some(')') if body.len() > 1 => false,
        _ => return Err(AlertError::RangeBrackets(body.to_string())),
    };

    let inner = &body[1..body.len() - 1];
    let bounds = split_fields(inner);
    let [min, max] = bounds.as_slice() else {
        return Err(AlertError::RangeArity(inner.to_string()));
    };

    Ok(NumericPattern::Range {
        min: Number::parse_literal(min)?,
        min_included,
        max: Number::parse_literal(max)?,
        max_included,
    })
}

fn parse_literals(body: &str) -> Result<Vec<Number>> {
    split_fields(body)
        .into_iter()
        .map(Number::parse_literal)
        .collect()
}

/// Comma-separated fields with trailing empty fields dropped, so
/// `equal:5,` lists one literal. A body without a comma is one field.
fn split_fields(body: &str) -> Vec<&str> {
    let mut fields: Vec<&str> = body.split(',').collect();
    if fields.len() > 1 {
        while fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }
    }
    fields
}

impl NumericPattern {
    pub fn check(&self, value: Number) -> bool {
        match self {
            Self::Range {
                min,
                min_included,
                max,
                max_included,
            } => {
                // NaN compares as neither side of a bound and is let through.
                let above_min = match value.compare(*min) {
                    Some(Ordering::Greater) => true,
                    Some(Ordering::Equal) => *min_included,
                    Some(Ordering::Less) => false,
                    None => true,
                };
                let below_max = match value.compare(*max) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Equal) => *max_included,
                    Some(Ordering::Greater) => false,
                    None => true,
                };
                above_min && below_max
            }
            // Compliant only when the value equals *every* literal, so with two
            // distinct literals this can never pass. Kept as the established
            // rule semantics; "equal to any" would be `any` here.
            Self::Equal(literals) => literals
                .iter()
                .all(|l| value.compare(*l) == Some(Ordering::Equal)),
            Self::NotEqual(literals) => literals
                .iter()
                .all(|l| value.compare(*l) != Some(Ordering::Equal)),
        }
    }
}

/// Patterns applied to stringified values. Both forms match the whole
/// string, not a substring.
#[derive(Debug, Clone)]
pub enum StringPattern {
    Match(Regex),
    NotMatch(Regex),
}

impl FromStr for StringPattern {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self> {
        if let Some(body) = s.strip_prefix(MATCH) {
            Ok(Self::Match(compile_anchored(body)?))
        } else if let Some(body) = s.strip_prefix(NOT_MATCH) {
            Ok(Self::NotMatch(compile_anchored(body)?))
        } else {
            Err(AlertError::UnknownPattern(s.to_string()))
        }
    }
}

fn compile_anchored(body: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{body})$")).map_err(|source| AlertError::InvalidRegex {
        pattern: body.to_string(),
        source,
    })
}

impl StringPattern {
    pub fn check(&self, value: &str) -> bool {
        match self {
            Self::Match(re) => re.is_match(value),
            Self::NotMatch(re) => !re.is_match(value),
        }
    }
}

/// Decides whether `value` complies with `pattern`.
///
/// Malformed patterns are logged and reported as compliant so a bad rule
/// never raises an alert or stops evaluation of other attributes.
pub fn validate(pattern: &str, value: &PropertyValue) -> bool {
    match try_validate(pattern, value) {
        Ok(compliant) => compliant,
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Ignoring malformed alert pattern");
            true
        }
    }
}

/// Like [`validate`] but surfaces pattern errors instead of failing open.
pub fn try_validate(pattern: &str, value: &PropertyValue) -> Result<bool> {
    match Number::from_value(value)? {
        Some(number) => {
            tracing::debug!(pattern, "Validating number");
            Ok(pattern.parse::<NumericPattern>()?.check(number))
        }
        None => {
            tracing::debug!(pattern, "Validating string");
            Ok(pattern.parse::<StringPattern>()?.check(&value.to_string()))
        }
    }
}
