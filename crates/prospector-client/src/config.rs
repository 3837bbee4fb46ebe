use prospector_protocol_versions::VersionTables;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_protocol_version")]
    pub protocol_version: i32,
    /// Tried in order, each with a fresh session, after a server fails.
    #[serde(default)]
    pub fallback_protocol_versions: Vec<i32>,
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_protocol_version() -> i32 {
    767
}

fn default_port() -> u16 {
    25565
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            protocol_version: default_protocol_version(),
            fallback_protocol_versions: Vec::new(),
            servers: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: ClientConfig = toml::from_str(&contents)?;
            config
        } else {
            tracing::info!("No config file found at {}, using defaults", path.display());
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Status pings work at any protocol version; ones without codec tables only
    /// get a warning.
    pub fn validate(&self) -> anyhow::Result<()> {
        for &version in std::iter::once(&self.protocol_version).chain(&self.fallback_protocol_versions) {
            if version < 0 {
                anyhow::bail!("protocol version {} is negative", version);
            }
            if let Err(e) = VersionTables::for_protocol(version) {
                tracing::warn!("{}; only the status exchange is available", e);
            }
        }
        if self.timeout_ms == 0 {
            anyhow::bail!("timeout_ms must be greater than zero");
        }
        Ok(())
    }

    /// One session per configured server, at the primary protocol version.
    pub fn sessions(&self) -> Vec<SessionConfig> {
        self.servers
            .iter()
            .map(|server| SessionConfig {
                host: server.host.clone(),
                port: server.port,
                protocol_version: self.protocol_version,
                timeout: Duration::from_millis(self.timeout_ms),
            })
            .collect()
    }
}

/// Parameters of a single status session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: i32,
    /// Budget for the whole session, not for each operation.
    pub timeout: Duration,
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            protocol_version: default_protocol_version(),
            timeout: Duration::from_millis(default_timeout_ms()),
        }
    }

    pub fn with_protocol_version(mut self, protocol_version: i32) -> Self {
        self.protocol_version = protocol_version;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
