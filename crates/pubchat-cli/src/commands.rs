//! Command handlers for the PubChat CLI

use crate::app::ChatApp;
use crate::cli::Commands;
use crate::error::{CliError, Result};
use pubchat_runtime::{AppEvent, ChatError, ChatHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Duration;
use tracing::{info, warn};

const QUIT: &str = "/quit";

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(command: Commands, app: ChatApp) -> Result<()> {
        match command {
            Commands::Chat => Self::handle_chat_command(app).await,
            Commands::Send { message, wait_secs } => {
                Self::handle_send_command(app, message, wait_secs).await
            }
        }
    }

    /// Print the channel as it grows and publish each line read from stdin
    async fn handle_chat_command(mut app: ChatApp) -> Result<()> {
        let handle = app.handle()?;
        let mut app_events = app
            .take_app_events()
            .ok_or_else(|| CliError::Config("app events already taken".to_string()))?;

        let printer = tokio::spawn(async move {
            while let Some(event) = app_events.recv().await {
                match event {
                    AppEvent::SessionBound { channel } => {
                        println!("Joined {channel}. Type {QUIT} to leave.")
                    }
                    AppEvent::MessageAppended { message } => println!("{message}"),
                }
            }
        });

        let result = Self::read_input(&handle).await;

        app.stop().await?;
        printer.abort();
        result
    }

    async fn read_input(handle: &ChatHandle) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim() == QUIT {
                info!("Leaving chat");
                break;
            }
            match handle.publish(&line) {
                Ok(_) => {}
                Err(ChatError::Publish(e)) => warn!("Message not sent: {}", e),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Publish once and print the echo
    async fn handle_send_command(
        mut app: ChatApp,
        message: String,
        wait_secs: Option<u64>,
    ) -> Result<()> {
        let wait = Duration::from_secs(wait_secs.unwrap_or(app.config().cli.send_wait_secs));
        let result = app.send_and_confirm(&message, wait).await;
        app.stop().await?;

        match result? {
            Some(echo) => println!("{echo}"),
            None => warn!("Nothing sent: message is blank"),
        }
        Ok(())
    }
}
