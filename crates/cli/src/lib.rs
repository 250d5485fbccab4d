//! `jobtrack-cli` library crate.
//!
//! Argument parsing, dispatch and terminal rendering for the `jobtrack`
//! binary, exposed for testing. The entrypoint lives in `main.rs`.

pub mod cli;
pub mod watch;
