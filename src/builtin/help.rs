//! Builtin `help` command set.
//!
//! `help` lists every root command; `help <command>` renders the command
//! tree under that root, grouped and with per-token documentation. The
//! handler reads the registry through the reserved commands catalog, so it
//! stays current as commanders are composed.

use crate::command::{CatalogEntry, CommandCatalog, CommandId};
use crate::commander::{Commander, COMMANDS_KEY};
use crate::error::{CommandError, Result};
use crate::inject::require;
use crate::render::{tag, wrap};
use crate::result::{stream_error, stream_one, CommandResult, CommandStream};
use crate::token::{lit, var};

/// Registers the `help` commands and returns the abstract root's handle.
pub fn register(commander: &mut Commander) -> Result<CommandId> {
    let root = commander
        .command()
        .token(lit("help"))
        .abstract_command()
        .describe("Shows available commands and documentation")
        .register()?;

    commander
        .command()
        .token(var("command").optional().describe("name of a root command"))
        .parent(root)
        .inject(require(COMMANDS_KEY).bind_as("catalog"))
        .inject(require("output_width").default_value(80usize))
        .handler(handle_help)
        .register()?;

    Ok(root)
}

fn handle_help(invocation: crate::command::Invocation) -> CommandStream {
    let Some(catalog) = invocation.injected.get::<CommandCatalog>("catalog") else {
        return stream_error(CommandError::injection(COMMANDS_KEY, "catalog"));
    };
    let width = invocation
        .injected
        .get::<usize>("output_width")
        .map(|w| *w)
        .unwrap_or(80);

    match invocation.args.str("command") {
        None => stream_one(CommandResult::ok(describe_command_list(&catalog))),
        Some(name) => {
            let root = catalog
                .roots()
                .into_iter()
                .find(|entry| entry.plain_label == name);
            match root {
                Some(root) => stream_one(CommandResult::ok(describe_command(
                    &catalog, root, width,
                ))),
                None => stream_error(CommandError::new(format!(
                    "No help for command \"{name}\" available"
                ))),
            }
        }
    }
}

/// Renders the list of root commands.
pub fn describe_command_list(catalog: &CommandCatalog) -> String {
    let mut lines = vec![tag::label("Supported Commands")];
    for root in catalog.roots() {
        lines.push(format!("\t{}", root.label));
    }
    lines.push(format!(
        "Use \"help {}\" for a detailed help on individual commands",
        tag::var("COMMAND")
    ));
    lines.join("\n")
}

/// Renders the command tree under one root, grouped by [`Group`] with
/// descriptions and token documentation.
///
/// [`Group`]: crate::command::Group
pub fn describe_command(catalog: &CommandCatalog, root: &CatalogEntry, width: usize) -> String {
    let mut lines = vec![tag::header(format!("{} command", root.plain_label))];
    if let Some(description) = &root.description {
        for wrapped in wrap(description, width) {
            lines.push(tag::help(wrapped));
        }
    }
    lines.push(String::new());
    lines.push(tag::label("Supported Subcommands"));

    let mut current_group: Option<Option<String>> = None;
    for entry in catalog.under(root.id) {
        let group_name = entry.group.as_ref().map(|group| group.name.clone());
        if current_group.as_ref() != Some(&group_name) {
            if current_group.is_some() {
                lines.push(String::new());
            }
            if let Some(group) = &entry.group {
                lines.push(format!("\t{}", tag::label(&group.name)));
                if let Some(description) = &group.description {
                    for wrapped in wrap(description, width.saturating_sub(10)) {
                        lines.push(format!("\t  {}", tag::help(wrapped)));
                    }
                }
            }
            current_group = Some(group_name);
        }
        lines.push(render_entry(entry, width));
    }

    lines.join("\n")
}

fn render_entry(entry: &CatalogEntry, width: usize) -> String {
    let mut lines = vec![format!("\t{}", entry.label)];
    if let Some(description) = &entry.description {
        let mut first = true;
        for wrapped in wrap(description, width.saturating_sub(12)) {
            let prefix = if first { "\t    - " } else { "\t      " };
            first = false;
            lines.push(format!("{prefix}{}", tag::help(wrapped)));
        }
    }
    for token in &entry.tokens {
        let mut doc = format!("\t    {}: ", token.label);
        if let Some(description) = &token.description {
            doc.push_str(description);
        }
        if !token.choices.is_empty() {
            if token.description.is_some() {
                doc.push(' ');
            }
            doc.push_str(&token.choices.join(" | "));
        }
        lines.push(tag::help(doc));
    }
    lines.join("\n")
}
