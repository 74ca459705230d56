//! Terminal host for form definitions: mounts one controller per field and
//! drives the form from a command shell.

pub mod commands;
pub mod core;
mod help;
pub mod host;
pub mod output;
mod prompts;
pub mod registry;
mod shell;

pub use shell::{run_cli, SCRIPT_ENV};
