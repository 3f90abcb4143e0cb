use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching, caching or configuring repositories
#[derive(Error, Debug)]
pub enum Error {
    #[error("Organization '{org}' not found")]
    NotFound { org: String },

    #[error("Invalid GitHub token")]
    Unauthorized,

    #[error("API rate limit exceeded. Add a token in settings.")]
    RateLimited,

    #[error("GitHub API error: {status}")]
    Api { status: u16 },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Cancelled")]
    Cancelled,

    #[error("Storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt repository cache: {0}")]
    CacheFormat(#[from] serde_json::Error),

    #[error("Invalid settings file: {0}")]
    SettingsFormat(#[from] toml::de::Error),

    #[error("Could not serialize settings: {0}")]
    SettingsSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    InvalidSettings(String),
}

impl Error {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Storage { path: path.into(), source }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_status_line_text() {
        assert_eq!(
            Error::NotFound { org: "acme".into() }.to_string(),
            "Organization 'acme' not found"
        );
        assert_eq!(Error::Unauthorized.to_string(), "Invalid GitHub token");
        assert_eq!(
            Error::RateLimited.to_string(),
            "API rate limit exceeded. Add a token in settings."
        );
        assert_eq!(Error::Api { status: 502 }.to_string(), "GitHub API error: 502");
    }

    #[test]
    fn storage_error_names_the_path() {
        let err = Error::storage(
            "/tmp/repos.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/repos.json"));
    }
}
