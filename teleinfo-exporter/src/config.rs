use serde::Deserialize;
use std::{fs, path::PathBuf, time::Duration};

use anyhow::Context;

fn default_read_timeout_ms() -> u64 {
    1000
}

fn default_baud_rate() -> u32 {
    1200
}

fn default_max_frame_bytes() -> usize {
    teleinfo_core::frame::extractor::DEFAULT_MAX_FRAME_LEN
}

fn default_bind_addr() -> String {
    "0.0.0.0:9569".to_string()
}

fn default_namespace() -> String {
    teleinfo_core::exposition::MetricDescriptors::DEFAULT_NAMESPACE.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    /// Character device the meter is wired to.
    pub device: PathBuf,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl SerialConfig {
    pub fn for_device<P: Into<PathBuf>>(device: P) -> Self {
        Self {
            device: device.into(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            namespace: default_namespace(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub serial: SerialConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("TELEINFO_CONFIG").unwrap_or_else(|_| "teleinfo-config.toml".to_string());
        let contents = fs::read_to_string(&path).with_context(|| format!("failed to read config file {path}"))?;
        Self::from_toml_str(&contents).with_context(|| format!("invalid config file {path}"))
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}
