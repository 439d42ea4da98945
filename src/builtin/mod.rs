//! Builtin command sets.
//!
//! Ready-made commands any commander can register: `help` for command
//! discovery and `quit`/`exit` for leaving the interpreter.

pub mod help;
pub mod quit;
