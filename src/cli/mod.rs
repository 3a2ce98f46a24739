//! CLI module - command-line interface
//!
//! Contains the REPL and command parsing.

pub mod commands;
pub mod repl;

pub use repl::{print_worker, Repl};
