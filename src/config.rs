use std::fmt;
use std::time::Duration;

use anyhow::Context;
use tracing::trace;

/// Host and port of one side of the bridge
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct BridgeConfig {
    /// Munin node the stats are read from
    #[serde(default = "default_munin")]
    pub munin: Endpoint,

    /// Carbon listener the stats are forwarded to
    #[serde(default = "default_carbon")]
    pub carbon: Endpoint,

    /// Seconds between the start of two fetch cycles
    #[serde(default = "crate::util::get_interval")]
    pub interval: u64,

    /// Seconds any single connect, read or write may take
    #[serde(default = "crate::util::get_timeout")]
    pub timeout: u64,

    /// Root segment of every metric name
    #[serde(default = "crate::util::get_prefix")]
    pub prefix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            munin: default_munin(),
            carbon: default_carbon(),
            interval: crate::util::get_interval(),
            timeout: crate::util::get_timeout(),
            prefix: crate::util::get_prefix(),
        }
    }
}

impl BridgeConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Whether carbon still points at the built-in default host
    pub fn uses_default_carbon_host(&self) -> bool {
        self.carbon.host == crate::util::get_carbon_host()
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.interval == 0 {
            anyhow::bail!("interval must be at least one second");
        }
        if self.timeout == 0 {
            anyhow::bail!("timeout must be at least one second");
        }
        if self.prefix.contains(' ') {
            anyhow::bail!("prefix must not contain spaces");
        }
        Ok(self)
    }
}

fn default_munin() -> Endpoint {
    Endpoint::new(crate::util::get_munin_host(), crate::util::get_munin_port())
}

fn default_carbon() -> Endpoint {
    Endpoint::new(crate::util::get_carbon_host(), crate::util::get_carbon_port())
}

pub fn read_config_file(path: &str) -> anyhow::Result<BridgeConfig> {
    let file_content =
        std::fs::read_to_string(path).with_context(|| format!("cannot read {path}"))?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> anyhow::Result<BridgeConfig> {
    serde_json::from_str::<BridgeConfig>(content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))?
        .validate()
        .inspect(|config| trace!("loaded config: {config:?}"))
}
