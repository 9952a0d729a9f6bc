//! Error handling for the PubChat CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Chat error: {0}")]
    Chat(#[from] pubchat_core::ChatError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Subscription not live within {secs}s")]
    ConnectTimeout { secs: u64 },

    #[error("No echo for the published message within {secs}s")]
    EchoTimeout { secs: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
