//! Builtin help and quit command sets, driven through a composed root.

use parley::builtin::{help, quit};
use parley::inject::require;
use parley::render::strip_tags;
use parley::result::stream_one;
use parley::{lit, var, CommandOutput, CommandResult, Commander, ControlAction, DispatchOutcome, Group};

/// A root commander composed from a domain module plus the builtins, the
/// way a host application assembles its command set.
fn composed_root() -> Commander {
    let mut names = Commander::new("names");
    let say = names
        .command()
        .token(lit("say"))
        .abstract_command()
        .describe("Say things out loud")
        .register()
        .unwrap();
    names
        .command()
        .tokens([lit("my"), lit("name"), var("name").optional()])
        .parent(say)
        .group(Group::new("names").describe("name dropping"))
        .describe("say a name")
        .inject(require("members").bind_as("names"))
        .handler(|inv| {
            let name = inv.args.str("name").unwrap_or("someone").to_owned();
            stream_one(CommandResult::ok(name))
        })
        .register()
        .unwrap();
    names.provide("members", vec!["beyonce".to_owned()]).persist();

    let mut root = Commander::new("root");
    help::register(&mut root).unwrap();
    quit::register(&mut root).unwrap();
    root.compose([names]);
    root
}

#[test]
fn help_lists_roots_from_composed_commanders() {
    let root = composed_root();
    let results = root.fire("help").unwrap();
    let plain = strip_tags(&results[0].message);
    assert!(plain.contains("say"));
    assert!(plain.contains("quit"));
    assert!(plain.contains("exit"));
}

#[test]
fn help_describes_a_composed_root_command() {
    let root = composed_root();
    let results = root.fire("help say").unwrap();
    let plain = strip_tags(&results[0].message);
    assert!(plain.contains("say command"));
    assert!(plain.contains("Say things out loud"));
    assert!(plain.contains("say my name"));
    assert!(plain.contains("name dropping"));
}

#[test]
fn help_for_unknown_command_reports_an_error() {
    let root = composed_root();
    let err = root.fire("help missing").unwrap_err();
    assert!(err.to_string().contains("No help for command"));
}

#[test]
fn quit_yields_an_exit_control_action() {
    let root = composed_root();
    match root.dispatch("quit") {
        DispatchOutcome::Results(mut stream) => {
            let first = stream.next().unwrap().unwrap();
            assert!(matches!(first, CommandOutput::Control(ControlAction::Exit)));
        }
        other => panic!("expected results, got {other:?}"),
    }
}

#[test]
fn composed_commands_still_dispatch() {
    let root = composed_root();
    let results = root.fire("say my name beyonce").unwrap();
    assert_eq!(results[0].message, "beyonce");
}
