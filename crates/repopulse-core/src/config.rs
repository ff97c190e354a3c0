use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::liveness::Lifespan;
use crate::traffic::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};

const ENV_PREFIX: &str = "REPOPULSE";

/// Main configuration structure
///
/// Layered from defaults, then the config file, then `REPOPULSE_*`
/// environment variables (`REPOPULSE_GITHUB__TOKEN` and friends). CLI flags
/// are applied on top by the binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub report: ReportConfig,
}

impl Config {
    /// Load config from the default location. A missing file just means defaults.
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::Error::ConfigError(format!("Failed to load config: {}", e)))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.report.page_limit == 0 {
            return Err(crate::Error::ConfigError(
                "report.page_limit must be at least 1".into(),
            ));
        }
        if self.report.lifespan_weeks == 0 {
            return Err(crate::Error::ConfigError(
                "report.lifespan_weeks must be at least 1".into(),
            ));
        }
        if !(1..=MAX_WINDOW_DAYS).contains(&self.report.traffic_window_days) {
            return Err(crate::Error::ConfigError(format!(
                "report.traffic_window_days must be between 1 and {}",
                MAX_WINDOW_DAYS
            )));
        }
        Ok(())
    }

    pub fn lifespan(&self) -> Lifespan {
        Lifespan::weeks(self.report.lifespan_weeks)
    }

    /// Effective config as TOML, with the token blanked out
    pub fn to_redacted_toml(&self) -> crate::Result<String> {
        let mut shown = self.clone();
        if shown.github.token.is_some() {
            shown.github.token = Some("********".to_string());
        }

        toml::to_string_pretty(&shown)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))
    }

    /// Get the config file path
    /// Uses XDG on Linux/macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("repopulse");

        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Whose repositories we look at when a command doesn't name a user
    pub username: Option<String>,

    /// GitHub personal access token. Traffic needs push access.
    pub token: Option<String>,

    /// API URL (for GitHub Enterprise)
    pub api_url: String,
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            username: None,
            token: None,
            api_url: default_github_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// A fork pushed to within this many weeks is alive
    pub lifespan_weeks: u32,

    /// Most pages any listing will fetch
    pub page_limit: u32,

    /// Trailing days of traffic the API reports
    pub traffic_window_days: u32,

    /// Where the traffic ledger is kept
    pub ledger_path: PathBuf,
}

fn default_lifespan_weeks() -> u32 {
    26 // half a year without a push and a fork is probably done
}

fn default_ledger_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("repopulse"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("traffic.json")
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            lifespan_weeks: default_lifespan_weeks(),
            page_limit: repopulse_api::DEFAULT_PAGE_LIMIT,
            traffic_window_days: DEFAULT_WINDOW_DAYS,
            ledger_path: default_ledger_path(),
        }
    }
}
