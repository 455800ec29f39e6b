use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key. May be omitted in the file, in which case the `DBP_KEY`
    /// environment variable is read once at load time.
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://4.dbt.io/api".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> f64 {
    0.9
}

impl ApiConfig {
    pub fn key(&self) -> &str {
        self.key.as_deref().unwrap_or("")
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Key fallback: read the environment once here so no other call site
    // touches the process environment.
    if config.api.key.as_deref().map_or(true, str::is_empty) {
        config.api.key = std::env::var("DBP_KEY").ok().filter(|k| !k.is_empty());
    }

    if config.api.base_url.is_empty() {
        anyhow::bail!("api.base_url must not be empty");
    }

    if config.api.key.is_none() {
        anyhow::bail!("api.key must be set (in the config file or via DBP_KEY)");
    }

    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be > 0");
    }

    if !(0.0..=1.0).contains(&config.matching.threshold) {
        anyhow::bail!("matching.threshold must be in [0.0, 1.0]");
    }

    Ok(config)
}
