//! Application configuration.
//!
//! - `layout`: panel dimensions and the widget layout registry
//! - [`Settings`]: runtime settings read from `dashboard.toml` (or the file
//!   named by `DASHBOARD_CONFIG`), with a handful of environment overrides
//!
//! A missing config file is not an error; every field has a default.

pub mod layout;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// Re-export layout constants at config level for convenience
pub use layout::{Bounds, SCREEN_HEIGHT, SCREEN_SIZE, SCREEN_WIDTH, WIDGET_BOUNDS, slot};

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "DASHBOARD_CONFIG";

/// Config file used when `DASHBOARD_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "dashboard.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display: DisplaySettings,
    pub schedule: ScheduleSettings,
    pub http: HttpSettings,
    pub news: NewsSettings,
    pub social: SocialSettings,
}

/// Which panel backend to drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverKind {
    /// Waveshare panel on ARM hosts built with `hardware`, PNG output elsewhere.
    #[default]
    Auto,
    Waveshare,
    Png,
}

impl DriverKind {
    /// Resolve `Auto` for the current build.
    pub const fn resolve(self) -> Self {
        match self {
            Self::Auto => {
                if cfg!(all(feature = "hardware", any(target_arch = "arm", target_arch = "aarch64"))) {
                    Self::Waveshare
                } else {
                    Self::Png
                }
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub driver: DriverKind,
    /// Frame file written by the PNG panel.
    pub output: PathBuf,
    pub spi_device: String,
    /// BCM GPIO numbers of the Waveshare HAT.
    pub busy_pin: u64,
    pub dc_pin: u64,
    pub rst_pin: u64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            driver: DriverKind::Auto,
            output: PathBuf::from("frame.png"),
            spi_device: String::from("/dev/spidev0.0"),
            busy_pin: 24,
            dc_pin: 25,
            rst_pin: 17,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// Idle time between refresh cycles. This is also the retry policy.
    pub interval_secs: u64,
    /// Time the panel gets to finish its physical refresh before sleeping.
    pub settle_secs: u64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            settle_secs: 2,
        }
    }
}

impl ScheduleSettings {
    pub const fn interval(&self) -> Duration { Duration::from_secs(self.interval_secs) }

    pub const fn settle(&self) -> Duration { Duration::from_secs(self.settle_secs) }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: format!("epd-dashboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpSettings {
    pub const fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    /// BBC feed category (`world`, `technology`, ...). Empty means top stories.
    pub category: String,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            category: String::from("world"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SocialSettings {
    pub bearer_token: String,
    /// Account whose latest post is shown. The widget is disabled when empty.
    pub screen_name: String,
}

impl SocialSettings {
    pub fn is_enabled(&self) -> bool { !self.screen_name.is_empty() }
}

// =============================================================================
// Loading
// =============================================================================

impl Settings {
    /// Load settings from the configured path and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        let mut settings = Self::from_file(&path)?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Read a TOML file, falling back to defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::info!(path = %path.display(), "Loaded config file");
                Self::from_toml_str(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> { Ok(toml::from_str(text)?) }

    /// Apply `NEWS_CATEGORY`, `TWITTER_BEARER_TOKEN` and `TWITTER_SCREEN_NAME`.
    pub fn apply_overrides<F>(
        &mut self,
        lookup: F,
    ) where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(category) = lookup("NEWS_CATEGORY") {
            self.news.category = category;
        }
        if let Some(token) = lookup("TWITTER_BEARER_TOKEN") {
            self.social.bearer_token = token;
        }
        if let Some(name) = lookup("TWITTER_SCREEN_NAME") {
            self.social.screen_name = name;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.schedule.interval(), Duration::from_secs(60));
        assert_eq!(settings.schedule.settle(), Duration::from_secs(2));
        assert_eq!(settings.news.category, "world");
        assert_eq!(settings.display.driver, DriverKind::Auto);
        assert!(!settings.social.is_enabled());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            [schedule]
            interval_secs = 300

            [social]
            screen_name = "rustlang"
            "#,
        )
        .unwrap();

        assert_eq!(settings.schedule.interval_secs, 300);
        assert_eq!(settings.schedule.settle_secs, 2);
        assert_eq!(settings.news.category, "world");
        assert!(settings.social.is_enabled());
    }

    #[test]
    fn test_driver_kind_parses_lowercase() {
        let settings = Settings::from_toml_str("[display]\ndriver = \"png\"\noutput = \"/tmp/out.png\"").unwrap();
        assert_eq!(settings.display.driver, DriverKind::Png);
        assert_eq!(settings.display.output, PathBuf::from("/tmp/out.png"));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Settings::from_toml_str("[schedule]\ninterval_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            "NEWS_CATEGORY" => Some("technology".to_owned()),
            "TWITTER_SCREEN_NAME" => Some("ferris".to_owned()),
            _ => None,
        });
        assert_eq!(settings.news.category, "technology");
        assert_eq!(settings.social.screen_name, "ferris");
        assert!(settings.social.bearer_token.is_empty());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[news]\ncategory = \"science_and_environment\"").unwrap();
        let settings = Settings::from_file(file.path()).unwrap();
        assert_eq!(settings.news.category, "science_and_environment");
    }

    #[test]
    fn test_auto_driver_resolves_to_concrete_kind() {
        assert_ne!(DriverKind::Auto.resolve(), DriverKind::Auto);
        assert_eq!(DriverKind::Png.resolve(), DriverKind::Png);
    }
}
