//! Subcommand implementations.

pub mod calendar;
pub mod categories;
pub mod config;
pub mod races;
