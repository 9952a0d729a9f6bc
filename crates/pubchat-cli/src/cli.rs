//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Use the in-process loopback network instead of PubNub
    #[arg(long, global = true)]
    pub offline: bool,

    /// Sender name put in outgoing messages
    #[arg(short, long, global = true)]
    pub name: Option<String>,

    /// Channel to join
    #[arg(long, global = true)]
    pub channel: Option<String>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Interactive chat: prints the channel and publishes each line typed
    Chat,
    /// Publish one message, wait for it to come back, and exit
    Send {
        /// Message text
        message: String,
        /// Seconds to wait for the echo (defaults to the configured value)
        #[arg(short, long)]
        wait_secs: Option<u64>,
    },
}
