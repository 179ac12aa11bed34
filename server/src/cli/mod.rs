// server/src/cli/mod.rs

// Command-line entry point: argument parsing, configuration and server start.

pub mod cli;

pub use cli::{run_server, shutdown_signal, start_cli, CliArgs};
