//! CLI, output rendering, calendar export
//!
//! This crate provides the `nextrace` command-line interface.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
