//! Command-line front end for the EcoTachos client.
//!
//! This crate provides:
//! - The `clap` command tree
//! - Command handlers over the backend, AI and serverless clients
//! - Plain-text rendering of detection results

pub mod cli;
pub mod commands;
pub mod output;

pub use cli::{Cli, ClassifyArgs, Command};
pub use commands::{run, Context};
