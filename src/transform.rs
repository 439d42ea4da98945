//! Composable argument transforms.
//!
//! A [`Transform`] maps one argument value to another (string → bool,
//! string → number, capture extraction, …) and may declare a syntactic
//! pre-validator that runs during command matching, so an unparseable
//! value reclassifies the command as a partial match before any expensive
//! work happens.
//!
//! A [`TransformChain`] applies steps in order and short-circuits on the
//! first failure. Chains are applied to one value at a time; greedy
//! argument binding maps the whole chain over each collected element.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::ValidationError;
use crate::validation::{is_float, is_int, lexical, one_of, Validator};

/// String forms accepted as true by [`to_bool`].
pub const TRUE_CHOICES: [&str; 5] = ["true", "1", "on", "yes", "enable"];
/// String forms accepted as false by [`to_bool`].
pub const FALSE_CHOICES: [&str; 5] = ["false", "0", "off", "no", "disable"];

/// A single value-mapping step with an optional syntactic pre-validator.
#[derive(Clone)]
pub struct Transform {
    apply: Arc<dyn Fn(Value) -> Result<Value, ValidationError> + Send + Sync>,
    syntax: Option<Validator>,
}

impl Transform {
    /// Creates a transform from a mapping function.
    pub fn from_fn(
        apply: impl Fn(Value) -> Result<Value, ValidationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            apply: Arc::new(apply),
            syntax: None,
        }
    }

    /// Declares a syntactic validator that runs during matching, before
    /// the transform itself is ever applied.
    pub fn with_syntax(mut self, validator: Validator) -> Self {
        self.syntax = Some(validator);
        self
    }

    /// Applies the transform to a value.
    pub fn apply(&self, value: Value) -> Result<Value, ValidationError> {
        (self.apply)(value)
    }

    /// Returns the syntactic pre-validator, if one was declared.
    pub fn syntax(&self) -> Option<&Validator> {
        self.syntax.as_ref()
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Transform")
    }
}

/// An ordered sequence of transforms applied to one argument value.
#[derive(Debug, Clone, Default)]
pub struct TransformChain {
    steps: Vec<Transform>,
}

impl TransformChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step to the chain.
    pub fn then(mut self, step: Transform) -> Self {
        self.steps.push(step);
        self
    }

    /// Applies all steps in order, short-circuiting on the first failure.
    pub fn apply(&self, mut value: Value) -> Result<Value, ValidationError> {
        for step in &self.steps {
            value = step.apply(value)?;
        }
        Ok(value)
    }

    /// Runs every step's syntactic pre-validator against a raw argument.
    ///
    /// Used during matching to catch values that cannot be parsed before
    /// the command is selected.
    pub fn check_syntax(&self, raw: &str) -> Result<(), ValidationError> {
        let value = Value::String(raw.to_owned());
        for step in &self.steps {
            if let Some(validator) = step.syntax() {
                validator.validate(&value)?;
            }
        }
        Ok(())
    }

    /// Returns true if the chain has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl From<Transform> for TransformChain {
    fn from(step: Transform) -> Self {
        TransformChain::new().then(step)
    }
}

/// Applies a chain to a value. Convenience for host code holding chains.
pub fn transform_value(chain: &TransformChain, value: Value) -> Result<Value, ValidationError> {
    chain.apply(value)
}

/// Converts the documented truthy/falsy strings to a boolean.
///
/// Accepts exactly [`TRUE_CHOICES`] ∪ [`FALSE_CHOICES`]; anything else is
/// a validation error listing the accepted forms.
pub fn to_bool() -> Transform {
    let accepted = one_of(TRUE_CHOICES.iter().chain(FALSE_CHOICES.iter()).copied());
    Transform::from_fn(|value| {
        let text = lexical(&value);
        if TRUE_CHOICES.contains(&text.as_str()) {
            Ok(Value::Bool(true))
        } else if FALSE_CHOICES.contains(&text.as_str()) {
            Ok(Value::Bool(false))
        } else {
            Err(ValidationError::new(format!(
                "must be one of: {}",
                TRUE_CHOICES
                    .iter()
                    .chain(FALSE_CHOICES.iter())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    })
    .with_syntax(accepted)
}

/// Parses the value as an integer.
pub fn to_int() -> Transform {
    Transform::from_fn(|value| match &value {
        Value::Number(n) if n.is_i64() => Ok(value),
        other => lexical(other)
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| ValidationError::new("must be an integer")),
    })
    .with_syntax(is_int())
}

/// Parses the value as a float.
pub fn to_float() -> Transform {
    Transform::from_fn(|value| match &value {
        Value::Number(_) => Ok(value),
        other => lexical(other)
            .trim()
            .parse::<f64>()
            .map(Value::from)
            .map_err(|_| ValidationError::new("must be a float")),
    })
    .with_syntax(is_float())
}

/// Extracts regex captures from the value.
///
/// Named groups produce an object keyed by group name; with no named
/// groups the result is an array of the positional captures. A value the
/// pattern does not match is a validation error.
pub fn from_regex(pattern: &str) -> Transform {
    let compiled = Regex::new(pattern);
    let syntax = crate::validation::matches_regex(pattern);
    Transform::from_fn(move |value| {
        let re = compiled
            .as_ref()
            .map_err(|_| ValidationError::new("has an invalid transform pattern"))?;
        let text = lexical(&value);
        let caps = re
            .captures(&text)
            .ok_or_else(|| ValidationError::new("has invalid format"))?;

        let names: Vec<&str> = re.capture_names().flatten().collect();
        if names.is_empty() {
            let groups: Vec<Value> = caps
                .iter()
                .skip(1)
                .map(|m| match m {
                    Some(m) => Value::String(m.as_str().to_owned()),
                    None => Value::Null,
                })
                .collect();
            Ok(Value::Array(groups))
        } else {
            let mut object = serde_json::Map::new();
            for name in names {
                let entry = match caps.name(name) {
                    Some(m) => Value::String(m.as_str().to_owned()),
                    None => Value::Null,
                };
                object.insert(name.to_owned(), entry);
            }
            Ok(Value::Object(object))
        }
    })
    .with_syntax(syntax)
}

/// Flattens one level of nested arrays, keeping non-array items as-is.
pub fn flatten() -> Transform {
    Transform::from_fn(|value| match value {
        Value::Array(items) => {
            let mut result = Vec::new();
            for item in items {
                match item {
                    Value::Array(inner) => result.extend(inner),
                    other => result.push(other),
                }
            }
            Ok(Value::Array(result))
        }
        other => Ok(other),
    })
}

/// Removes duplicate array items while preserving item order.
pub fn unique() -> Transform {
    Transform::from_fn(|value| match value {
        Value::Array(items) => {
            let mut result: Vec<Value> = Vec::new();
            for item in items {
                if !result.contains(&item) {
                    result.push(item);
                }
            }
            Ok(Value::Array(result))
        }
        other => Ok(other),
    })
}
