//! Inline style tags and text layout helpers.
//!
//! Messages produced by the matcher and the help renderer carry lightweight
//! inline style tags (`<var>`, `<error>`, `<label>`, `<help>`, `<header>`,
//! `<optional>`). A console host either strips them ([`strip_tags`]) or maps
//! them to terminal styling ([`render_tags`]); machine consumers use the
//! JSON wire shape and never see them.

use std::sync::OnceLock;

use console::Style;
use regex::Regex;

/// Tag constructors used when composing renderable messages.
pub mod tag {
    /// Marks a variable token name.
    pub fn var(text: impl AsRef<str>) -> String {
        wrap("var", text.as_ref())
    }

    /// Marks an optional token.
    pub fn optional(text: impl AsRef<str>) -> String {
        wrap("optional", text.as_ref())
    }

    /// Marks an error.
    pub fn error(text: impl AsRef<str>) -> String {
        wrap("error", text.as_ref())
    }

    /// Marks a section label.
    pub fn label(text: impl AsRef<str>) -> String {
        wrap("label", text.as_ref())
    }

    /// Marks explanatory help text.
    pub fn help(text: impl AsRef<str>) -> String {
        wrap("help", text.as_ref())
    }

    /// Marks a heading.
    pub fn header(text: impl AsRef<str>) -> String {
        wrap("header", text.as_ref())
    }

    fn wrap(tag: &str, text: &str) -> String {
        format!("<{tag}>{text}</{tag}>")
    }
}

fn any_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // not an html processor; these are our own simple one-line tags
    RE.get_or_init(|| Regex::new(r"<[^<]+?>").expect("static pattern"))
}

fn innermost_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<([a-z]+)>([^<]*)</([a-z]+)>").expect("static pattern"))
}

/// Removes all style tags, leaving plain text.
pub fn strip_tags(text: &str) -> String {
    any_tag_regex().replace_all(text, "").into_owned()
}

/// Replaces style tags with terminal styling.
///
/// Tags may be nested, so innermost pairs are replaced until none remain.
/// A mismatched pair loses its tags but keeps its content.
pub fn render_tags(text: &str) -> String {
    let mut current = text.to_owned();
    loop {
        let replaced = {
            let Some(caps) = innermost_tag_regex().captures(&current) else {
                return current;
            };
            let full = caps.get(0).expect("match exists");
            let (open, content, close) = (&caps[1], &caps[2], &caps[3]);
            let replacement = if open == close {
                style_for(open).apply_to(content).to_string()
            } else {
                content.to_owned()
            };
            (full.range(), replacement)
        };
        current.replace_range(replaced.0, &replaced.1);
    }
}

fn style_for(tag: &str) -> Style {
    let style = match tag {
        "var" => Style::new().bold(),
        "optional" => Style::new().dim(),
        "error" => Style::new().red(),
        "label" => Style::new().bold(),
        "help" => Style::new().italic().dim(),
        _ => Style::new(),
    };
    style.force_styling(true)
}

/// Aligns separator-delimited columns across the lines of a text block.
///
/// Each line is split on `separator`; every column is padded to the width
/// of its widest cell and the cells are re-joined with two spaces.
pub fn columns(text: &str, separator: char) -> String {
    let rows: Vec<Vec<&str>> = text.lines().map(|line| line.split(separator).collect()).collect();
    let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; column_count];
    for row in &rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            let fitted: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(index, cell)| format!("{cell:<width$}", width = widths[index]))
                .collect();
            fitted.join("  ").trim_end().to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedy word wrap to the given width. Words longer than the width get a
/// line of their own.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
