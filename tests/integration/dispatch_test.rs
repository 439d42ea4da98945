//! End-to-end dispatch tests: registration through result streams.

use parley::error::code;
use parley::inject::require;
use parley::result::stream_one;
use parley::validation::{is_int_exact, matches_regex};
use parley::{lit, var, CommandResult, Commander, DispatchOutcome};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Builds the canonical demo command set: an abstract `say` root, a
/// `say my name [NAME]` leaf with an Or-ed validator, and an injected
/// member list for the no-argument case.
fn say_commander() -> Commander {
    let mut commander = Commander::new("destiny's child");

    let say = commander
        .command()
        .token(lit("say"))
        .abstract_command()
        .register()
        .expect("abstract root registers");

    commander
        .command()
        .tokens([
            lit("my"),
            lit("name"),
            var("name")
                .optional()
                .validate(matches_regex("^[a-z]+$").or(is_int_exact(11))),
        ])
        .parent(say)
        .inject(require("members").bind_as("names"))
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
                .unwrap_or_default();
            let message = format!("baby, i mean {name}, i love you");
            stream_one(CommandResult::ok(message.clone()).with_data(json!({
                "name": name,
                "message": message,
            })))
        })
        .register()
        .expect("leaf registers");

    commander
        .provide("members", vec!["beyonce".to_owned(), "kelly".to_owned()])
        .persist();
    commander
}

#[test]
fn dispatching_say_my_name_binds_the_variable() {
    let commander = say_commander();
    let results = commander.fire("say my name beyonce").unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].success);
    assert_eq!(results[0].data.as_ref().unwrap()["name"], json!("beyonce"));
}

#[test]
fn numeric_branch_of_the_or_validator_accepts_11() {
    let commander = say_commander();
    let results = commander.fire("say my name 11").unwrap();
    assert!(results[0].success);
    assert_eq!(results[0].data.as_ref().unwrap()["name"], json!("11"));
}

#[test]
fn uppercase_name_is_a_partial_match_with_format_code() {
    let commander = say_commander();
    let results = commander.fire("say my name BEYONCE").unwrap();
    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    assert_eq!(
        results[0].code.as_deref(),
        Some(code::INVALID_ARGUMENT_FORMAT)
    );
    assert!(results[0].message.contains("NAME"));
}

#[test]
fn omitted_optional_variable_falls_back_to_injected_members() {
    let commander = say_commander();
    let results = commander.fire("say my name").unwrap();
    assert!(results[0].success);
    assert_eq!(results[0].data.as_ref().unwrap()["name"], json!("beyonce"));
}

#[test]
fn insufficient_arguments_render_usage() {
    let commander = say_commander();
    let results = commander.fire("say my").unwrap();
    assert!(!results[0].success);
    assert!(results[0].message.contains("Insufficient arguments"));
    assert!(results[0].message.contains("say my name"));
}

#[test]
fn excess_arguments_are_found_by_shrinking() {
    let commander = say_commander();
    let results = commander.fire("say my name beyonce knowles").unwrap();
    assert!(!results[0].success);
    assert!(results[0].message.contains("Too many arguments"));
}

#[test]
fn comments_and_blank_lines_skip_resolution() {
    let commander = say_commander();
    assert!(matches!(
        commander.dispatch("# say my name beyonce"),
        DispatchOutcome::SkipLine
    ));
    assert!(matches!(commander.dispatch(""), DispatchOutcome::SkipLine));
}

#[test]
fn simulate_describes_instead_of_executing() {
    let commander = say_commander();
    let results = commander
        .simulate("say my name beyonce")
        .collect_results()
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0].message.contains("provided args:"));
    assert!(results[0].message.contains("Selected command"));
}

#[test]
fn quoted_arguments_stay_one_token() {
    let mut commander = Commander::new("test");
    commander
        .command()
        .tokens([lit("print"), var("text")])
        .handler(|inv| {
            stream_one(CommandResult::ok(inv.args.str("text").unwrap_or_default().to_owned()))
        })
        .register()
        .unwrap();

    let results = commander.fire("print \"hello world\"").unwrap();
    assert_eq!(results[0].message, "hello world");
}

#[test]
fn all_tokens_concatenate_across_three_levels() {
    let mut commander = Commander::new("test");
    let top = commander
        .command()
        .token(lit("net"))
        .abstract_command()
        .register()
        .unwrap();
    let middle = commander
        .command()
        .token(lit("iface"))
        .parent(top)
        .abstract_command()
        .register()
        .unwrap();
    let leaf = commander
        .command()
        .tokens([lit("up"), var("device")])
        .parent(middle)
        .handler(|inv| {
            stream_one(CommandResult::ok(inv.args.str("device").unwrap_or_default().to_owned()))
        })
        .register()
        .unwrap();

    assert_eq!(commander.registry().plain_label(leaf), "net iface up DEVICE");
    let results = commander.fire("net iface up eth0").unwrap();
    assert_eq!(results[0].message, "eth0");
}

#[test]
fn greedy_tail_collects_every_remaining_argument() {
    let mut commander = Commander::new("test");
    commander
        .command()
        .tokens([lit("join"), var("words").greedy()])
        .handler(|inv| {
            let words: Vec<String> = inv
                .args
                .list("words")
                .unwrap_or_default()
                .iter()
                .filter_map(|value| value.as_str().map(str::to_owned))
                .collect();
            stream_one(CommandResult::ok(words.join("+")))
        })
        .register()
        .unwrap();

    let results = commander.fire("join x y z").unwrap();
    assert_eq!(results[0].message, "x+y+z");
}

#[test]
fn ambiguous_exact_shapes_raise_only_for_exact_input() {
    let mut commander = Commander::new("test");
    for _ in 0..2 {
        commander
            .command()
            .tokens([lit("dup"), var("arg")])
            .handler(|_| stream_one(CommandResult::ok("dup")))
            .register()
            .unwrap();
    }

    // exact for both: configuration bug
    let err = commander.fire("dup value").unwrap_err();
    assert_eq!(err.code.as_deref(), Some(code::AMBIGUOUS_COMMAND));

    // merely partial for both: regular suggestion path
    let results = commander.fire("dup").unwrap();
    assert_eq!(results[0].code.as_deref(), Some(code::INVALID_COMMAND));
}

#[test]
fn mount_rejects_parent_cycles() {
    let mut commander = Commander::new("test");
    let a = commander
        .command()
        .token(lit("a"))
        .abstract_command()
        .register()
        .unwrap();
    let b = commander
        .command()
        .token(lit("b"))
        .parent(a)
        .abstract_command()
        .register()
        .unwrap();

    let err = commander.mount(a, Some(b)).unwrap_err();
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn wire_shape_serializes_data_status_code() {
    let commander = say_commander();
    let results = commander.fire("say my name beyonce").unwrap();
    let wire = serde_json::to_value(results[0].wire()).unwrap();
    assert_eq!(wire["status"], json!(0));
    assert_eq!(wire["code"], json!(null));
    assert_eq!(wire["data"]["name"], json!("beyonce"));
}
