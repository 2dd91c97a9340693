//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod watch;

pub use watch::run_watch;
