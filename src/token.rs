//! Token model for command patterns.
//!
//! A command's shape is an ordered chain of tokens. Each token describes
//! one positional slot: either a literal keyword the user must type, or a
//! named variable that captures an argument. Variables carry the optional
//! / greedy / choices / transform / validator metadata that drives matching
//! and argument binding.

use serde_json::Value;

use crate::error::ValidationError;
use crate::render::tag;
use crate::transform::TransformChain;
use crate::validation::{one_of, Validator};

/// The two kinds of pattern slots.
#[derive(Debug, Clone)]
pub enum TokenKind {
    /// A fixed keyword, optionally with accepted aliases.
    Literal { value: String, aliases: Vec<String> },
    /// A named variable capturing an argument.
    Variable { name: String },
}

/// One positional slot of a command pattern.
#[derive(Debug, Clone)]
pub struct Token {
    kind: TokenKind,
    optional: bool,
    greedy: bool,
    choices: Vec<String>,
    transform: Option<TransformChain>,
    validator: Option<Validator>,
    description: Option<String>,
}

/// Creates a literal keyword token.
pub fn lit(value: impl Into<String>) -> Token {
    Token {
        kind: TokenKind::Literal {
            value: value.into(),
            aliases: Vec::new(),
        },
        optional: false,
        greedy: false,
        choices: Vec::new(),
        transform: None,
        validator: None,
        description: None,
    }
}

/// Creates a named variable token.
pub fn var(name: impl Into<String>) -> Token {
    Token {
        kind: TokenKind::Variable { name: name.into() },
        optional: false,
        greedy: false,
        choices: Vec::new(),
        transform: None,
        validator: None,
        description: None,
    }
}

impl Token {
    /// Marks the token as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the token as greedy: placed last in a chain it absorbs every
    /// remaining argument into one array value.
    pub fn greedy(mut self) -> Self {
        self.greedy = true;
        self
    }

    /// Restricts the variable to a fixed set of accepted values.
    pub fn choices(mut self, choices: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.choices = choices.into_iter().map(Into::into).collect();
        self.choices.sort();
        self.choices.dedup();
        self
    }

    /// Attaches a transform (or chain) applied during argument binding.
    pub fn transform(mut self, chain: impl Into<TransformChain>) -> Self {
        self.transform = Some(chain.into());
        self
    }

    /// Attaches a validator that runs during matching.
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Adds an accepted alias. Only meaningful on literal tokens; on a
    /// variable this is rejected at registration.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let TokenKind::Literal { aliases, .. } = &mut self.kind {
            aliases.push(alias.into());
        }
        self
    }

    /// Attaches a description shown in help output.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the variable name, if this is a variable token.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Variable { name } => Some(name),
            TokenKind::Literal { .. } => None,
        }
    }

    /// Returns the keyword, if this is a literal token.
    pub fn literal(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Literal { value, .. } => Some(value),
            TokenKind::Variable { .. } => None,
        }
    }

    /// Returns true if this token is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self.kind, TokenKind::Variable { .. })
    }

    /// Returns true if this token may be omitted.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns true if this token absorbs all remaining arguments.
    pub fn is_greedy(&self) -> bool {
        self.greedy
    }

    /// Returns the accepted choices.
    pub fn choice_values(&self) -> &[String] {
        &self.choices
    }

    /// Returns the transform chain, if one was attached.
    pub fn transform_chain(&self) -> Option<&TransformChain> {
        self.transform.as_ref()
    }

    /// Returns the help description, if one was attached.
    pub fn description(&self) -> Option<&str> {
        self.description.as_ref().map(String::as_str)
    }

    /// Tests one raw argument against this token.
    ///
    /// A literal either matches or it does not — a structurally wrong
    /// command. A variable always matches structurally, but its syntax
    /// checks, choices, and validator may raise a [`ValidationError`]: the
    /// user likely meant this command and supplied a malformed argument,
    /// so the caller records a mismatch instead of discarding the command.
    pub fn matches(&self, raw: &str) -> Result<bool, ValidationError> {
        match &self.kind {
            TokenKind::Literal { value, aliases } => {
                Ok(value == raw || aliases.iter().any(|alias| alias == raw))
            }
            TokenKind::Variable { name } => {
                let attach = |err: ValidationError| err.for_field(name.clone());
                if let Some(chain) = &self.transform {
                    chain.check_syntax(raw).map_err(attach)?;
                }
                if !self.choices.is_empty() {
                    one_of(self.choices.iter().cloned())
                        .validate(&Value::String(raw.to_owned()))
                        .map_err(attach)?;
                }
                if let Some(validator) = &self.validator {
                    validator
                        .validate(&Value::String(raw.to_owned()))
                        .map_err(attach)?;
                }
                Ok(true)
            }
        }
    }

    /// Renders the token's tagged label for usage lines and diagnostics.
    ///
    /// Variables render uppercase; greedy tokens show a `[...]` tail;
    /// optional tokens are bracketed and dimmed, or marked as errors when
    /// `with_error` is set.
    pub fn label(&self, with_error: bool) -> String {
        let mut label = match &self.kind {
            TokenKind::Variable { name } => name.to_uppercase(),
            TokenKind::Literal { value, .. } => value.clone(),
        };

        if self.greedy {
            label = format!("[{label} [...]]");
        }
        if self.optional {
            let inner = if with_error {
                tag::error(&label)
            } else {
                tag::optional(&label)
            };
            label = format!("[{inner}]");
        }
        if self.is_variable() && !self.optional {
            label = tag::var(&label);
        }

        label
    }

    /// Applies the transform chain to a bound value. Array values map the
    /// chain over each element; scalars pass through the chain once.
    pub fn bind(&self, value: Value) -> Result<Value, ValidationError> {
        let Some(chain) = &self.transform else {
            return Ok(value);
        };
        let attach = |err: ValidationError| match self.name() {
            Some(name) => err.for_field(name),
            None => err,
        };
        match value {
            Value::Array(items) => {
                let mapped: Result<Vec<Value>, ValidationError> =
                    items.into_iter().map(|item| chain.apply(item)).collect();
                Ok(Value::Array(mapped.map_err(attach)?))
            }
            scalar => chain.apply(scalar).map_err(attach),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::to_bool;
    use crate::validation::matches_regex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_literal_matches_exact_value() {
        let token = lit("say");
        assert_eq!(token.matches("say").unwrap(), true);
        assert_eq!(token.matches("shout").unwrap(), false);
    }

    #[test]
    fn test_literal_matches_alias() {
        let token = lit("quit").alias("exit");
        assert!(token.matches("exit").unwrap());
        assert!(!token.matches("leave").unwrap());
    }

    #[test]
    fn test_variable_matches_structurally() {
        let token = var("name");
        assert!(token.matches("anything").unwrap());
    }

    #[test]
    fn test_variable_choices_raise_instead_of_false() {
        let token = var("state").choices(["a", "b"]);
        assert!(token.matches("a").unwrap());
        let err = token.matches("c").unwrap_err();
        assert_eq!(err.to_string(), "must be one of: a, b");
        assert_eq!(err.field.as_deref(), Some("state"));
    }

    #[test]
    fn test_variable_transform_syntax_runs_during_match() {
        let token = var("state").transform(to_bool());
        assert!(token.matches("on").unwrap());
        assert!(token.matches("sideways").is_err());
    }

    #[test]
    fn test_variable_validator_runs_during_match() {
        let token = var("name").validate(matches_regex("^[a-z]+$"));
        assert!(token.matches("beyonce").unwrap());
        assert!(token.matches("BEYONCE").is_err());
    }

    #[test]
    fn test_label_variable_uppercased_and_tagged() {
        assert_eq!(var("name").label(false), "<var>NAME</var>");
    }

    #[test]
    fn test_label_literal_plain() {
        assert_eq!(lit("say").label(false), "say");
    }

    #[test]
    fn test_label_optional_variable() {
        assert_eq!(
            var("name").optional().label(false),
            "[<optional>NAME</optional>]"
        );
    }

    #[test]
    fn test_label_optional_with_error() {
        assert_eq!(
            var("name").optional().label(true),
            "[<error>NAME</error>]"
        );
    }

    #[test]
    fn test_label_greedy() {
        assert_eq!(var("words").greedy().label(false), "<var>[WORDS [...]]</var>");
    }

    #[test]
    fn test_bind_applies_transform() {
        let token = var("state").transform(to_bool());
        assert_eq!(token.bind(json!("on")).unwrap(), json!(true));
    }

    #[test]
    fn test_bind_maps_chain_over_array() {
        let token = var("states").greedy().transform(to_bool());
        assert_eq!(
            token.bind(json!(["on", "off", "1"])).unwrap(),
            json!([true, false, true])
        );
    }

    #[test]
    fn test_bind_without_transform_passes_through() {
        let token = var("name");
        assert_eq!(token.bind(json!("x")).unwrap(), json!("x"));
    }
}
