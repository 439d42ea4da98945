//! Interactive demo: a tiny console built on the commander.
//!
//! Registers an abstract `say` root with a `say my name [NAME]` leaf whose
//! argument must be lowercase letters or the number 11, plus the builtin
//! `help` and `quit` command sets, then drives a stdin/stdout loop.
//!
//! Run with: `cargo run --example say-my-name`

use std::io::{self, BufRead, Write};

use anyhow::Result;
use parley::builtin::{help, quit};
use parley::inject::require;
use parley::render::render_tags;
use parley::result::stream_one;
use parley::validation::{is_int_exact, matches_regex};
use parley::{
    lit, var, CommandOutput, CommandResult, Commander, ControlAction, DispatchOutcome,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const MEMBERS: [&str; 6] = [
    "beyonce",
    "kelly",
    "michelle",
    "latavia",
    "letoya",
    "farrah",
];

fn build_commander() -> Result<Commander> {
    let mut commander = Commander::new("destiny's child");

    let say = commander
        .command()
        .token(lit("say"))
        .abstract_command()
        .describe("Say things to whoever is listening")
        .register()?;

    commander
        .command()
        .tokens([
            lit("my"),
            lit("name"),
            var("name")
                .optional()
                .describe("lowercase name, or the number 11")
                .validate(matches_regex("^[a-z]+$").or(is_int_exact(11))),
        ])
        .parent(say)
        .inject(require("members").bind_as("names"))
        .describe("declare your love for a name")
        .handler(|inv| {
            let names = inv
                .injected
                .get::<Vec<String>>("names")
                .map(|names| (*names).clone())
                .unwrap_or_default();
            let name = inv
                .args
                .str("name")
                .map(str::to_owned)
                .or_else(|| names.first().cloned())
                .unwrap_or_else(|| "nobody".to_owned());
            let message = format!("baby, i mean {name}, i love you");
            stream_one(CommandResult::ok(message.clone()).with_data(json!({
                "name": name,
                "message": message,
            })))
        })
        .register()?;

    help::register(&mut commander)?;
    quit::register(&mut commander)?;
    commander
        .provide(
            "members",
            MEMBERS.iter().map(|&m| m.to_owned()).collect::<Vec<_>>(),
        )
        .persist();

    Ok(commander)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let commander = build_commander()?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "# ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF requests exit, like a quit command would
            writeln!(stdout)?;
            return Ok(());
        }

        let stream = match commander.dispatch(&line) {
            DispatchOutcome::SkipLine => continue,
            DispatchOutcome::Results(stream) => stream,
        };

        // drain lazily: a command may block between items, and the user
        // may interrupt in between
        for item in stream {
            match item {
                Ok(CommandOutput::Result(result)) => {
                    writeln!(stdout, "{}", render_tags(&result.message))?;
                }
                Ok(CommandOutput::Control(ControlAction::Exit)) => return Ok(()),
                Ok(CommandOutput::Control(ControlAction::Stop)) => break,
                Err(err) => {
                    writeln!(stdout, "{}", render_tags(&format!("<error>{err}</error>")))?;
                    break;
                }
            }
        }
    }
}
