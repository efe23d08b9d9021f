//! Command Line Interface (CLI) layer for bpmn-print.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`): logging setup, merging a config
//! file with command-line flags, and the folder conversion itself via
//! `bpmn_print::api`.
//!
//! If you are embedding bpmn-print into another application, prefer using
//! the high-level `bpmn_print::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
