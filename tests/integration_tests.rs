//! Integration tests for parley.
//!
//! Exercise the public API end-to-end: registration, dispatch, injection,
//! and help rendering.
//!
//! Run with: `cargo test --test integration_tests`

mod integration;
