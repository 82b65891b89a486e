//! Per-kind value cleaning.
//!
//! [`clean_value`] runs after resolution and the null check. It enforces
//! the list-vs-single shape of the argument, then the type rules of its
//! [`ArgKind`] on every element, coercing where the kind allows it.

use crate::error::ValidationError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tagsmith_syntax::{ArgKind, ArgSpec, BoundValue, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Cleans one resolved argument value.
///
/// `bound` is the parse-time shape the value came from; a comma group bound
/// to a single-valued argument is an arity error even if the group had one
/// member.
pub fn clean_value(spec: &ArgSpec, bound: &BoundValue, value: Value) -> Result<Value, ValidationError> {
    let name = spec.name();

    if spec.is_multi() {
        let Value::List(items) = value else {
            return Err(ValidationError::arity(
                name,
                format!("Value for '{}' must be a list of values (got {})", name, repr(&value)),
            ));
        };
        let cleaned = items
            .into_iter()
            .map(|item| clean_one(spec, item))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Value::List(cleaned));
    }

    if bound.is_multi() {
        return Err(ValidationError::arity(
            name,
            format!("Value for '{}' does not accept multiple values (got {})", name, repr(&value)),
        ));
    }

    clean_one(spec, value)
}

fn clean_one(spec: &ArgSpec, value: Value) -> Result<Value, ValidationError> {
    // null admissibility is decided before cleaning
    if value.is_null() {
        return Ok(value);
    }

    let name = spec.name();
    match spec.kind() {
        ArgKind::Any | ArgKind::Basic | ArgKind::Constant | ArgKind::Keywords { .. } => Ok(value),
        ArgKind::Flag => match value {
            Value::Bool(_) => Ok(value),
            other => Ok(Value::Bool(other.is_truthy())),
        },
        ArgKind::Integer => to_integer(&value).ok_or_else(|| {
            ValidationError::invalid(
                name,
                format!("Value for '{}' must be an integer (got {})", name, repr(&value)),
            )
        }),
        ArgKind::String => match value {
            Value::String(_) => Ok(value),
            other => Err(ValidationError::invalid(
                name,
                format!("Value for '{}' must be a string (got {})", name, repr(&other)),
            )),
        },
        ArgKind::Date => match value {
            Value::Date(_) | Value::DateTime(_) => Ok(value),
            Value::String(ref s) => match NaiveDate::parse_from_str(s.trim(), DATE_FORMAT) {
                Ok(d) => Ok(Value::Date(d)),
                Err(_) => Err(type_error(name, "a date", &value)),
            },
            other => Err(type_error(name, "a date", &other)),
        },
        ArgKind::Time => match value {
            Value::Time(_) => Ok(value),
            Value::String(ref s) => parse_with(s, TIME_FORMATS, NaiveTime::parse_from_str)
                .map(Value::Time)
                .ok_or_else(|| type_error(name, "a time", &value)),
            other => Err(type_error(name, "a time", &other)),
        },
        ArgKind::DateTime => match value {
            Value::DateTime(_) => Ok(value),
            Value::String(ref s) => parse_with(s, DATETIME_FORMATS, NaiveDateTime::parse_from_str)
                .map(Value::DateTime)
                .ok_or_else(|| type_error(name, "a datetime", &value)),
            other => Err(type_error(name, "a datetime", &other)),
        },
        ArgKind::Instance { class_name, predicate } => {
            if (predicate.as_ref())(&value) {
                Ok(value)
            } else {
                Err(ValidationError::invalid(
                    name,
                    format!("Value for '{}' must be a {} instance (got {})", name, class_name, repr(&value)),
                ))
            }
        }
    }
}

const I64_MIN_F: f64 = i64::MIN as f64;
const I64_MAX_F: f64 = i64::MAX as f64;

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Int(_) => Some(value.clone()),
        Value::Bool(b) => Some(Value::Int(*b as i64)),
        // `as` saturates, so out-of-range floats must be rejected up front.
        Value::Float(f) if f.is_finite() && (I64_MIN_F..I64_MAX_F).contains(&f.trunc()) => {
            Some(Value::Int(f.trunc() as i64))
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::Int),
        _ => None,
    }
}

fn parse_with<T>(
    input: &str,
    formats: &[&str],
    parse: fn(&str, &str) -> chrono::ParseResult<T>,
) -> Option<T> {
    formats.iter().find_map(|fmt| parse(input.trim(), fmt).ok())
}

fn type_error(name: &str, expected: &str, value: &Value) -> ValidationError {
    ValidationError::invalid(
        name,
        format!("Value for '{}' must be {} (got {})", name, expected, repr(value)),
    )
}

/// Quotes strings so `'7b'` and `7` read differently in messages.
fn repr(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s),
        other => other.to_string(),
    }
}
