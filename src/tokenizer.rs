//! Tokenizer for input lines.
//!
//! Splits a raw input line into whitespace-separated argument words with
//! support for:
//! - Quoted strings (single and double quotes)
//! - Escape sequences within quotes
//! - Comment lines (configurable marker, `#` by default)
//!
//! Anything fancier — pipes, redirection, substitution — is deliberately
//! out of scope; command grammars are purely positional.

/// Outcome of tokenizing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tokenized {
    /// The line held arguments to resolve.
    Args(Vec<String>),
    /// The line was blank or a comment and must not be resolved.
    Skip,
}

/// Tokenizes an input line into argument words.
///
/// A line whose trimmed form is empty or starts with `comment_marker`
/// yields [`Tokenized::Skip`]. Quotes group words (`say "hello world"` is
/// two arguments) and support escape sequences (`\n`, `\t`, `\r`, `\\`,
/// `\"`, `\'`).
pub fn tokenize(input: &str, comment_marker: &str) -> Tokenized {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.starts_with(comment_marker) {
        return Tokenized::Skip;
    }

    let mut words = Vec::new();
    let mut chars = trimmed.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        words.push(collect_word(&mut chars));
    }

    Tokenized::Args(words)
}

/// Collects one word, entering quoted mode whenever a quote is found.
fn collect_word(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut word = String::new();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        if c == '"' || c == '\'' {
            chars.next();
            word.push_str(&collect_quoted(chars, c));
            continue;
        }
        chars.next();
        word.push(c);
    }

    word
}

/// Collects characters inside quotes, handling escape sequences.
fn collect_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, quote: char) -> String {
    let mut result = String::new();
    let mut escaped = false;

    while let Some(&c) = chars.peek() {
        chars.next();

        if escaped {
            match c {
                'n' => result.push('\n'),
                't' => result.push('\t'),
                'r' => result.push('\r'),
                '\\' => result.push('\\'),
                '"' => result.push('"'),
                '\'' => result.push('\''),
                _ => {
                    // Unknown escape, keep as-is
                    result.push('\\');
                    result.push(c);
                }
            }
            escaped = false;
            continue;
        }

        if c == '\\' {
            escaped = true;
            continue;
        }

        if c == quote {
            break;
        }

        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(input: &str) -> Vec<String> {
        match tokenize(input, "#") {
            Tokenized::Args(words) => words,
            Tokenized::Skip => panic!("expected arguments for {input:?}"),
        }
    }

    #[test]
    fn test_simple_words() {
        assert_eq!(args("say my name"), vec!["say", "my", "name"]);
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(args("  say   my\tname "), vec!["say", "my", "name"]);
    }

    #[test]
    fn test_double_quoted_word() {
        assert_eq!(args(r#"say "hello world""#), vec!["say", "hello world"]);
    }

    #[test]
    fn test_single_quoted_word() {
        assert_eq!(args("say 'hello world'"), vec!["say", "hello world"]);
    }

    #[test]
    fn test_quote_inside_word() {
        assert_eq!(args(r#"name="John Doe""#), vec!["name=John Doe"]);
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(args(r#"say "a \"b\" c""#), vec!["say", "a \"b\" c"]);
    }

    #[test]
    fn test_escape_sequences() {
        assert_eq!(args(r#""line1\nline2\ttab""#), vec!["line1\nline2\ttab"]);
    }

    #[test]
    fn test_unknown_escape_kept() {
        assert_eq!(args(r#""a\qb""#), vec![r"a\qb"]);
    }

    #[test]
    fn test_empty_line_skips() {
        assert_eq!(tokenize("", "#"), Tokenized::Skip);
        assert_eq!(tokenize("   \t ", "#"), Tokenized::Skip);
    }

    #[test]
    fn test_comment_line_skips() {
        assert_eq!(tokenize("# just a note", "#"), Tokenized::Skip);
        assert_eq!(tokenize("   # indented note", "#"), Tokenized::Skip);
    }

    #[test]
    fn test_custom_comment_marker() {
        assert_eq!(tokenize("// note", "//"), Tokenized::Skip);
        assert_eq!(tokenize("# not a comment", "//"), Tokenized::Args(vec!["#".into(), "not".into(), "a".into(), "comment".into()]));
    }

    #[test]
    fn test_comment_marker_mid_line_is_literal() {
        assert_eq!(args("say #tag"), vec!["say", "#tag"]);
    }

    #[test]
    fn test_unterminated_quote_is_tolerated() {
        assert_eq!(args(r#"say "unterminated"#), vec!["say", "unterminated"]);
    }
}
