//! Command Line Interface (CLI) layer for salcrop.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-file and batch
//! flows. It wires user-provided options to the library API exposed via
//! `salcrop::api`.
//!
//! If you are embedding salcrop into another application, prefer using
//! the high-level `salcrop::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
