//! PubChat CLI Configuration
//!
//! Configuration is read from an optional TOML file and then overridden by
//! command line flags:
//!
//! ```toml
//! [session]
//! channel = "the_guide"
//! display_name = "Ford"
//!
//! [pubnub]
//! publish_key = "demo"
//! subscribe_key = "demo"
//!
//! [cli]
//! offline = false
//! send_wait_secs = 5
//! ```

use crate::cli::Cli;
use crate::error::{CliError, Result};
use pubchat_core::{ChannelName, SessionConfig};
use pubchat_pubnub::PubNubConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration for the CLI application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub pubnub: PubNubConfig,
    pub cli: CliConfig,
}

/// CLI-specific options
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Run against the in-process loopback network
    pub offline: bool,
    /// How long `send` waits for its echo
    pub send_wait_secs: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            offline: false,
            send_wait_secs: 5,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Command line flags win over file values
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if cli.offline {
            self.cli.offline = true;
        }
        if let Some(name) = &cli.name {
            self.session.display_name = Some(name.clone());
        }
        if let Some(channel) = &cli.channel {
            self.session.channel = ChannelName::new(channel.as_str());
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.session.validate()?;
        if !self.cli.offline {
            self.pubnub.validate()?;
        }
        if self.cli.send_wait_secs == 0 {
            return Err(CliError::Config("send_wait_secs must be non-zero".to_string()));
        }
        Ok(())
    }
}
