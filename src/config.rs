use anyhow::{Context, Result};
use postdeck_core::models::is_valid_date_format;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    /// File path or `http(s)://` URL of the corpus.
    pub source: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
        }
    }
}

fn default_date_format() -> String {
    "%b %-d, %Y".to_string()
}

impl Config {
    /// Defaults for running without a config file; `source` comes from the
    /// command line.
    pub fn minimal(source: &str) -> Self {
        Self {
            corpus: CorpusConfig {
                source: source.to_string(),
                timeout_secs: default_timeout_secs(),
            },
            server: ServerConfig::default(),
            display: DisplayConfig::default(),
        }
    }

    /// Replace the corpus source, e.g. from `--corpus`.
    pub fn with_source(mut self, source: Option<&str>) -> Self {
        if let Some(source) = source {
            self.corpus.source = source.to_string();
        }
        self
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`] when a
/// corpus source was given on the command line.
pub fn resolve_config(path: &Path, corpus_override: Option<&str>) -> Result<Config> {
    let config = match (path.exists(), corpus_override) {
        (true, _) => load_config(path)?.with_source(corpus_override),
        (false, Some(source)) => Config::minimal(source),
        (false, None) => anyhow::bail!(
            "Config file not found: {} (pass --corpus to run without one)",
            path.display()
        ),
    };
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.corpus.source.trim().is_empty() {
        anyhow::bail!("corpus.source must not be empty");
    }

    if config.corpus.timeout_secs == 0 {
        anyhow::bail!("corpus.timeout_secs must be > 0");
    }

    config
        .server
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("server.bind is not a valid address: {}", config.server.bind))?;

    if config.display.date_format.trim().is_empty() {
        anyhow::bail!("display.date_format must not be empty");
    }

    if !is_valid_date_format(&config.display.date_format) {
        anyhow::bail!(
            "display.date_format is not a valid strftime format: {}",
            config.display.date_format
        );
    }

    Ok(())
}
