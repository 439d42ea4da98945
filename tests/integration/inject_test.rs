//! Dependency injection and provider scoping, exercised end-to-end.

use parley::error::code;
use parley::inject::require;
use parley::result::stream_one;
use parley::{lit, CommandResult, Commander};
use pretty_assertions::assert_eq;

fn whoami_commander() -> Commander {
    let mut commander = Commander::new("test");
    commander
        .command()
        .token(lit("whoami"))
        .inject(require("user"))
        .handler(|inv| {
            let user = inv
                .injected
                .get::<String>("user")
                .map(|user| (*user).clone())
                .unwrap_or_default();
            stream_one(CommandResult::ok(user))
        })
        .register()
        .unwrap();
    commander
}

#[test]
fn nested_scopes_restore_the_outer_value() {
    let commander = whoami_commander();
    let _outer = commander.provide("user", "A".to_owned());
    {
        let _inner = commander.provide("user", "B".to_owned());
        assert_eq!(commander.fire("whoami").unwrap()[0].message, "B");
    }
    // the inner scope's exit must not remove the outer provision
    assert_eq!(commander.fire("whoami").unwrap()[0].message, "A");
}

#[test]
fn missing_provider_is_a_configuration_error() {
    let commander = whoami_commander();
    let err = commander.fire("whoami").unwrap_err();
    assert_eq!(err.code.as_deref(), Some(code::MISSING_DEPENDENCY));
    assert!(err.to_string().contains("user"));
}

#[test]
fn getter_values_resolve_fresh_on_every_dispatch() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let mut commander = Commander::new("test");
    commander
        .command()
        .token(lit("width"))
        .inject(require("output_width"))
        .handler(|inv| {
            let width = inv.injected.get::<usize>("output_width").unwrap();
            stream_one(CommandResult::ok(width.to_string()))
        })
        .register()
        .unwrap();

    let width = Arc::new(AtomicUsize::new(80));
    let shared = width.clone();
    commander
        .provide_getter("output_width", move || shared.load(Ordering::SeqCst))
        .persist();

    assert_eq!(commander.fire("width").unwrap()[0].message, "80");
    width.store(120, Ordering::SeqCst);
    assert_eq!(commander.fire("width").unwrap()[0].message, "120");
}

#[test]
fn collected_injections_gather_values_across_composed_commanders() {
    let mut root = Commander::new("root");
    root.command()
        .token(lit("peers"))
        .inject(require("peer").collect())
        .handler(|inv| {
            let peers: Vec<String> = inv
                .injected
                .all::<String>("peer")
                .iter()
                .map(|peer| (**peer).clone())
                .collect();
            stream_one(CommandResult::ok(peers.join(",")))
        })
        .register()
        .unwrap();
    root.provide("peer", "alpha".to_owned()).persist();

    let first = Commander::new("first");
    first.provide("peer", "bravo".to_owned()).persist();
    let second = Commander::new("second");
    second.provide("peer", "charlie".to_owned()).persist();
    root.compose([first, second]);

    assert_eq!(
        root.fire("peers").unwrap()[0].message,
        "alpha,bravo,charlie"
    );
}

#[test]
fn injection_defaults_fill_in_for_absent_providers() {
    let mut commander = Commander::new("test");
    commander
        .command()
        .token(lit("width"))
        .inject(require("output_width").default_value(80usize))
        .handler(|inv| {
            let width = inv.injected.get::<usize>("output_width").unwrap();
            stream_one(CommandResult::ok(width.to_string()))
        })
        .register()
        .unwrap();

    assert_eq!(commander.fire("width").unwrap()[0].message, "80");
}

#[test]
fn parent_injections_flow_into_child_commands() {
    let mut commander = Commander::new("test");
    let base = commander
        .command()
        .token(lit("net"))
        .abstract_command()
        .inject(require("device"))
        .register()
        .unwrap();
    commander
        .command()
        .token(lit("up"))
        .parent(base)
        .handler(|inv| {
            let device = inv.injected.get::<String>("device").unwrap();
            stream_one(CommandResult::ok(format!("{device} up")))
        })
        .register()
        .unwrap();
    commander.provide("device", "eth0".to_owned()).persist();

    assert_eq!(commander.fire("net up").unwrap()[0].message, "eth0 up");
}
