use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::engine::session::DEFAULT_ROOM;
use crate::engine::user_session::MAX_OUTBOUND_QUEUE;

/// Top-level server configuration, loaded from telchat.toml.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub limits: LimitsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub address: String,
    /// Shown in the connect banner.
    pub server_name: String,
    /// Room every session enters after picking a name.
    pub default_room: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: "0.0.0.0:8007".into(),
            server_name: "XYZ".into(),
            default_room: DEFAULT_ROOM.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsSection {
    /// Maximum bytes per input line; longer lines close the connection.
    pub max_line_length: usize,
    /// Outbound events buffered per session before new ones are dropped.
    pub outbound_queue: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            max_line_length: 4096,
            outbound_queue: MAX_OUTBOUND_QUEUE,
        }
    }
}

impl ServerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file doesn't exist.
    /// Environment variables override TOML values.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        } else {
            info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TELCHAT_ADDRESS") {
            self.server.address = v;
        }
        if let Ok(v) = std::env::var("TELCHAT_SERVER_NAME") {
            self.server.server_name = v;
        }
        if let Ok(v) = std::env::var("TELCHAT_DEFAULT_ROOM") {
            self.server.default_room = v;
        }
        if let Ok(v) = std::env::var("TELCHAT_MAX_LINE_LENGTH")
            && let Ok(len) = v.parse()
        {
            self.limits.max_line_length = len;
        }
        if let Ok(v) = std::env::var("TELCHAT_OUTBOUND_QUEUE")
            && let Ok(len) = v.parse()
        {
            self.limits.outbound_queue = len;
        }
    }

    /// Replace the port of the listen address, keeping the host.
    pub fn set_port(&mut self, port: u16) {
        let host = self
            .server
            .address
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        self.server.address = format!("{host}:{port}");
    }
}
