//! PubChat CLI library
//!
//! Argument parsing, configuration loading and the command handlers behind
//! the `pubchat` binary.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use app::ChatApp;
pub use cli::{Cli, Commands};
pub use config::AppConfig;
pub use error::{CliError, Result};
