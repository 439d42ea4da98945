//! Composable argument validators.
//!
//! A [`Validator`] wraps a single-value predicate over [`serde_json::Value`]
//! arguments. Validators compose with [`Validator::or`] (either branch may
//! pass; both failure messages are collected) and [`Validator::and`] (both
//! must pass, short-circuiting on the first failure), and can be mapped
//! over array values with [`list_of`].
//!
//! The stock validators accept both raw string arguments and already-typed
//! JSON values, since they run before as well as after transformation.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::ValidationError;

/// A composable single-value validator.
#[derive(Clone)]
pub struct Validator {
    check: Arc<dyn Fn(&Value) -> Result<(), ValidationError> + Send + Sync>,
}

impl Validator {
    /// Creates a validator from a check function.
    pub fn from_fn(
        check: impl Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            check: Arc::new(check),
        }
    }

    /// Validates a single value.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        (self.check)(value)
    }

    /// Succeeds if either validator passes. If both fail, the failure
    /// messages are joined with " or ".
    pub fn or(self, other: Validator) -> Validator {
        Validator::from_fn(move |value| {
            let first = match self.validate(value) {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            let second = match other.validate(value) {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };
            Err(ValidationError::new(format!("{first} or {second}")))
        })
    }

    /// Succeeds if both validators pass, short-circuiting on the first
    /// failure.
    pub fn and(self, other: Validator) -> Validator {
        Validator::from_fn(move |value| {
            self.validate(value)?;
            other.validate(value)
        })
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator")
    }
}

/// Returns the plain text form of a value for comparisons and messages.
///
/// Strings render without quotes; everything else uses its JSON form.
pub(crate) fn lexical(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses a value as f64, accepting JSON numbers and numeric strings.
fn as_number(value: &Value, message: &str) -> Result<f64, ValidationError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| ValidationError::new(message)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::new(message)),
        _ => Err(ValidationError::new(message)),
    }
}

/// Validates that the value parses as an integer.
pub fn is_int() -> Validator {
    Validator::from_fn(|value| {
        parse_int(value).map(|_| ())
    })
}

/// Validates that the value is exactly the given integer.
pub fn is_int_exact(exact: i64) -> Validator {
    Validator::from_fn(move |value| {
        let parsed = parse_int(value)?;
        if parsed != exact {
            return Err(ValidationError::new(format!("must be exactly {exact}")));
        }
        Ok(())
    })
}

fn parse_int(value: &Value) -> Result<i64, ValidationError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ValidationError::new("must be an integer")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::new("must be an integer")),
        _ => Err(ValidationError::new("must be an integer")),
    }
}

/// Validates that the value parses as a float.
pub fn is_float() -> Validator {
    Validator::from_fn(|value| as_number(value, "must be a float").map(|_| ()))
}

/// Validates that the value is greater than or equal to the given number.
pub fn is_gte(limit: f64) -> Validator {
    Validator::from_fn(move |value| {
        let parsed = as_number(value, "must be a number")?;
        if parsed >= limit {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "must be greater than or equal to {limit}"
            )))
        }
    })
}

/// Validates that the value is strictly greater than the given number.
pub fn is_gt(limit: f64) -> Validator {
    Validator::from_fn(move |value| {
        let parsed = as_number(value, "must be a number")?;
        if parsed > limit {
            Ok(())
        } else {
            Err(ValidationError::new(format!("must be greater than {limit}")))
        }
    })
}

/// Validates that the value is less than or equal to the given number.
pub fn is_lte(limit: f64) -> Validator {
    Validator::from_fn(move |value| {
        let parsed = as_number(value, "must be a number")?;
        if parsed <= limit {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "must be less than or equal to {limit}"
            )))
        }
    })
}

/// Validates that the value is strictly less than the given number.
pub fn is_lt(limit: f64) -> Validator {
    Validator::from_fn(move |value| {
        let parsed = as_number(value, "must be a number")?;
        if parsed < limit {
            Ok(())
        } else {
            Err(ValidationError::new(format!("must be less than {limit}")))
        }
    })
}

/// Validates that the value lies strictly between min and max.
pub fn is_between(min: f64, max: f64) -> Validator {
    Validator::from_fn(move |value| {
        let parsed = as_number(value, "must be a number")?;
        if min < parsed && parsed < max {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "must be between {min} and {max}"
            )))
        }
    })
}

/// Validates that the value equals the expected value.
///
/// String values compare by text; other values compare structurally.
pub fn is_equal(expected: impl Into<Value>) -> Validator {
    let expected = expected.into();
    Validator::from_fn(move |value| {
        let matches = match (&expected, value) {
            (Value::String(a), b) => *a == lexical(b),
            (a, b) => a == b,
        };
        if matches {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "must be equal to {}",
                lexical(&expected)
            )))
        }
    })
}

/// Length of a value: character count for strings, element count for arrays.
fn value_len(value: &Value) -> Result<usize, ValidationError> {
    match value {
        Value::String(s) => Ok(s.chars().count()),
        Value::Array(items) => Ok(items.len()),
        _ => Err(ValidationError::new("has no length")),
    }
}

/// Validates that the value has exactly the given length.
pub fn length_exact(exact: usize) -> Validator {
    Validator::from_fn(move |value| {
        if value_len(value)? != exact {
            return Err(ValidationError::new(format!("length must be {exact}")));
        }
        Ok(())
    })
}

/// Validates that the value is at least `min` long.
pub fn length_min(min: usize) -> Validator {
    Validator::from_fn(move |value| {
        if value_len(value)? < min {
            return Err(ValidationError::new(format!(
                "length must be greater than {min}"
            )));
        }
        Ok(())
    })
}

/// Validates that the value is at most `max` long.
pub fn length_max(max: usize) -> Validator {
    Validator::from_fn(move |value| {
        if value_len(value)? > max {
            return Err(ValidationError::new(format!(
                "length must be less than {max}"
            )));
        }
        Ok(())
    })
}

/// Validates that the value is one of the given choices.
///
/// Never returns a silent false: a value outside the choice set is a
/// [`ValidationError`] listing the accepted choices.
pub fn one_of(choices: impl IntoIterator<Item = impl Into<String>>) -> Validator {
    let mut choices: Vec<String> = choices.into_iter().map(Into::into).collect();
    choices.sort();
    choices.dedup();
    Validator::from_fn(move |value| {
        let text = lexical(value);
        if choices.iter().any(|choice| *choice == text) {
            Ok(())
        } else {
            Err(ValidationError::new(format!(
                "must be one of: {}",
                choices.join(", ")
            )))
        }
    })
}

/// Validates that the value matches the given regular expression.
///
/// An invalid pattern produces a validator that always fails, so the
/// mistake surfaces as a diagnostic instead of a panic.
pub fn matches_regex(pattern: &str) -> Validator {
    let compiled = Regex::new(pattern);
    Validator::from_fn(move |value| match &compiled {
        Ok(re) if re.is_match(&lexical(value)) => Ok(()),
        Ok(_) => Err(ValidationError::new("has invalid format")),
        Err(_) => Err(ValidationError::new("has an invalid validation pattern")),
    })
}

/// Maps a validator over every element of an array value.
pub fn list_of(validator: Validator) -> Validator {
    Validator::from_fn(move |value| match value {
        Value::Array(items) => {
            for item in items {
                validator.validate(item)?;
            }
            Ok(())
        }
        other => validator.validate(other),
    })
}
