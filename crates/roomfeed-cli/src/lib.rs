//! CLI, configuration loading and feed rendering
//!
//! This crate provides the `roomfeed` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod secret;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
