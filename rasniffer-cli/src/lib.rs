//! CLI interface for rasniffer-rs
//!
//! Argument parsing, logging setup and the capture runner behind the
//! `rasniffer` binary.

pub mod args;
pub mod runner;

pub use args::Cli;
pub use runner::run;

/// Install the fmt subscriber. Logs go to stderr so stdout carries only
/// advertisement reports.
pub fn init_tracing(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}
