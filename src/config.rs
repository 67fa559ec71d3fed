use crate::ntp::NTP_PORT;
use crate::timestamp::DisplayZone;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
    pub samples: usize,     // Number of queries the driver sends
    pub interval_ms: u64,   // Pause between queries
    pub zone: DisplayZone,
    pub reverse_dns: bool,  // Resolve NTPv3 secondary reference addresses
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            host: "pool.ntp.org".to_string(),
            port: NTP_PORT,
            timeout_ms: 5_000,
            samples: 1,
            interval_ms: 1_000,
            zone: DisplayZone::Local,
            reverse_dns: true,
        }
    }
}

impl QueryConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: QueryConfig = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(anyhow!("NTP server host must not be empty"));
        }
        if self.timeout_ms == 0 {
            return Err(anyhow!("Timeout must be greater than zero"));
        }
        if self.samples == 0 {
            return Err(anyhow!("At least one sample is required"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
