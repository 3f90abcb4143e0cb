use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CACHE_MINUTES: u64 = 15;
pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

/// User settings, stored as TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Organizations to search, in the order they were entered
    #[serde(default)]
    pub organizations: Vec<String>,

    /// Personal access token, empty when unset
    #[serde(default)]
    pub token: String,

    /// Minutes a fetched repository list stays fresh
    #[serde(default = "default_cache_minutes")]
    pub cache_minutes: u64,

    /// Base URL of the REST API (GitHub Enterprise installs differ)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_cache_minutes() -> u64 {
    DEFAULT_CACHE_MINUTES
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            organizations: Vec::new(),
            token: String::new(),
            cache_minutes: default_cache_minutes(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Settings {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reposcout")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Directory for the repository cache and the log file
    pub fn cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("reposcout")
    }

    pub fn cache_path() -> PathBuf {
        Self::cache_dir().join("repos.json")
    }

    /// Token to send, if one is configured
    pub fn token(&self) -> Option<&str> {
        let token = self.token.trim();
        (!token.is_empty()).then_some(token)
    }

    pub fn has_organizations(&self) -> bool {
        !self.organizations.is_empty()
    }

    /// Cache lifetime in milliseconds
    pub fn cache_ttl_ms(&self) -> i64 {
        i64::try_from(self.cache_minutes.saturating_mul(60_000)).unwrap_or(i64::MAX)
    }

    /// Parse a settings document, repairing values that are out of range
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut settings: Settings = toml::from_str(content)?;
        if settings.cache_minutes == 0 {
            tracing::warn!("cache_minutes must be positive, using {}", DEFAULT_CACHE_MINUTES);
            settings.cache_minutes = DEFAULT_CACHE_MINUTES;
        }
        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build settings from user input the way the settings form does:
    /// entries are trimmed, blanks dropped, at least one organization required
    pub fn from_input(
        organizations: &[String],
        token: &str,
        cache_minutes: u64,
        base: &Settings,
    ) -> Result<Self> {
        let organizations: Vec<String> = organizations
            .iter()
            .map(|org| org.trim().to_string())
            .filter(|org| !org.is_empty())
            .collect();

        if organizations.is_empty() {
            return Err(Error::InvalidSettings(
                "Please enter at least one organization".to_string(),
            ));
        }
        if cache_minutes == 0 {
            return Err(Error::InvalidSettings(
                "Cache duration must be at least one minute".to_string(),
            ));
        }

        Ok(Self {
            organizations,
            token: token.trim().to_string(),
            cache_minutes,
            ..base.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.cache_minutes, 15);
        assert!(settings.token().is_none());
    }

    #[test]
    fn zero_cache_minutes_falls_back_to_default() {
        let settings = Settings::from_toml("organizations = [\"acme\"]\ncache_minutes = 0\n").unwrap();
        assert_eq!(settings.cache_minutes, DEFAULT_CACHE_MINUTES);
        assert_eq!(settings.organizations, vec!["acme"]);
    }

    #[test]
    fn organizations_keep_input_order_and_duplicates() {
        let settings =
            Settings::from_toml("organizations = [\"zeta\", \"acme\", \"zeta\"]\n").unwrap();
        assert_eq!(settings.organizations, vec!["zeta", "acme", "zeta"]);
    }

    #[test]
    fn input_is_trimmed_and_blank_lines_dropped() {
        let input = vec!["  acme ".to_string(), "".to_string(), "globex".to_string()];
        let settings = Settings::from_input(&input, " tok ", 30, &Settings::default()).unwrap();
        assert_eq!(settings.organizations, vec!["acme", "globex"]);
        assert_eq!(settings.token(), Some("tok"));
        assert_eq!(settings.cache_minutes, 30);
    }

    #[test]
    fn input_without_organizations_is_rejected() {
        let input = vec!["   ".to_string()];
        let err = Settings::from_input(&input, "", 15, &Settings::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidSettings(_)));
    }

    #[test]
    fn ttl_is_minutes_in_millis() {
        let settings = Settings { cache_minutes: 2, ..Settings::default() };
        assert_eq!(settings.cache_ttl_ms(), 120_000);
    }

    #[test]
    fn toml_roundtrip_keeps_custom_api_url() {
        let settings = Settings {
            organizations: vec!["acme".into()],
            api_url: "https://ghe.example.com/api/v3".into(),
            ..Settings::default()
        };
        let parsed = Settings::from_toml(&settings.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, settings);
    }
}
