//! CLI command handlers

pub mod commands;

pub use commands::{defaults, inspect, options};
