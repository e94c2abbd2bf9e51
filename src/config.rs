//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$DORMMAIL_CONFIG` (environment variable)
//! 2. `~/.config/dormmail/config.toml` (Linux/macOS)
//!    `%APPDATA%\dormmail\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::parser::ParseOptions;

/// Upstream page listing unclaimed packages.
pub const DEFAULT_SOURCE_URL: &str = "https://ccweb.ncnu.edu.tw/dormmail/Default.asp";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Upstream page and transport settings.
    pub source: SourceConfig,
    /// Record reconstruction settings.
    pub parser: ParserConfig,
    /// Export defaults.
    pub export: ExportConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Where and how the dorm mail page is fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Page URL.
    pub url: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent upstream.
    pub user_agent: String,
    /// Legacy encoding tried first when the page declares none.
    pub legacy_encoding: String,
    /// Last-resort encoding, used lossily when nothing decodes cleanly.
    pub final_encoding: String,
    /// Explicit proxy URL for all requests.
    pub proxy_url: Option<String>,
    /// Honour `HTTP_PROXY` / `HTTPS_PROXY` when no `proxy_url` is set.
    pub system_proxy: bool,
}

/// Record reconstruction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Oldest year accepted in a date anchor.
    pub min_year: i32,
    /// Newest year accepted in a date anchor (unset = next calendar year).
    pub max_year: Option<i32>,
}

/// Export defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Default export format: "json" or "csv".
    pub default_format: String,
    /// CSV field separator character.
    pub csv_separator: char,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SOURCE_URL.to_string(),
            timeout_secs: 10,
            user_agent: format!("Mozilla/5.0 (compatible; dormmail/{})", env!("CARGO_PKG_VERSION")),
            legacy_encoding: "big5".to_string(),
            final_encoding: "gb2312".to_string(),
            proxy_url: None,
            system_proxy: true,
        }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_year: 2010,
            max_year: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: "json".to_string(),
            csv_separator: ',',
        }
    }
}

impl SourceConfig {
    /// Request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ParserConfig {
    /// Resolve the year window into parser options.
    ///
    /// An unset `max_year` is pinned to next year at this point, so the
    /// parse itself never looks at the clock.
    pub fn options(&self) -> ParseOptions {
        let max_year = self
            .max_year
            .unwrap_or_else(|| chrono::Local::now().year() + 1);
        ParseOptions::new(self.min_year, max_year)
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(&path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("DORMMAIL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("dormmail").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dormmail")
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join("dormmail.log")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(cfg.source.timeout_secs, 10);
        assert_eq!(cfg.source.legacy_encoding, "big5");
        assert_eq!(cfg.parser.min_year, 2010);
        assert!(cfg.parser.max_year.is_none());
        assert_eq!(cfg.export.csv_separator, ',');
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.source.url, cfg.source.url);
        assert_eq!(parsed.source.final_encoding, cfg.source.final_encoding);
        assert_eq!(parsed.parser.min_year, cfg.parser.min_year);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[source]
timeout_secs = 3

[parser]
max_year = 2030
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.source.timeout(), Duration::from_secs(3));
        assert_eq!(cfg.parser.max_year, Some(2030));
        // Other fields use defaults
        assert_eq!(cfg.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(cfg.general.log_level, "warn");
    }

    #[test]
    fn test_unset_max_year_covers_current_year() {
        let opts = ParserConfig::default().options();
        let this_year = chrono::Local::now().year();
        assert!(opts.accepts_year(this_year));
        assert!(opts.accepts_year(2010));
        assert!(!opts.accepts_year(2009));
    }

    #[test]
    fn test_log_file_under_cache_dir() {
        let mut cfg = Config::default();
        cfg.general.cache_dir = Some(PathBuf::from("/tmp/dm-cache"));
        assert_eq!(log_file_path(&cfg), PathBuf::from("/tmp/dm-cache/dormmail.log"));
    }
}
