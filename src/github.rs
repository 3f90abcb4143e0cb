use crate::config::Settings;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Repositories requested per page; a shorter page is the last one
pub const PAGE_SIZE: usize = 100;

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("reposcout/", env!("CARGO_PKG_VERSION"));

/// A repository as shown in the search list and stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    pub name: String,
    pub full_name: String,
    pub url: String,
    pub description: Option<String>,
    /// Organization as configured by the user, not as reported by the API
    pub org: String,
}

impl RepositoryRecord {
    /// Command copied to the clipboard for cloning
    pub fn clone_command(&self) -> String {
        format!("gh repo clone {}/{}", self.org, self.name)
    }
}

// REST response type
#[derive(Debug, Deserialize)]
struct ApiRepo {
    name: String,
    full_name: String,
    html_url: String,
    description: Option<String>,
}

impl ApiRepo {
    fn into_record(self, org: &str) -> RepositoryRecord {
        RepositoryRecord {
            name: self.name,
            full_name: self.full_name,
            url: self.html_url,
            description: self.description,
            org: org.to_string(),
        }
    }
}

/// Anything that can list the repositories of one organization
#[async_trait]
pub trait RepoSource: Send + Sync {
    async fn fetch_org_repos(
        &self,
        org: &str,
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RepositoryRecord>>;
}

/// Client for the `/orgs/{org}/repos` REST endpoint
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
}

impl GitHubClient {
    pub fn new(api_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        let api_url = Url::parse(api_url)
            .map_err(|e| Error::InvalidSettings(format!("Invalid API URL '{api_url}': {e}")))?;
        if api_url.cannot_be_a_base() {
            return Err(Error::InvalidSettings(format!("Invalid API URL '{api_url}'")));
        }

        Ok(Self { http, api_url })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.api_url,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    /// `{api_url}/orgs/{org}/repos` with `org` encoded as a single path segment
    fn org_repos_url(&self, org: &str) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["orgs", org, "repos"]);
        }
        url
    }

    async fn fetch_page(&self, org: &str, token: Option<&str>, page: usize) -> Result<Vec<ApiRepo>> {
        let mut request = self
            .http
            .get(self.org_repos_url(org))
            .query(&[("page", page), ("per_page", PAGE_SIZE)])
            .query(&[("sort", "full_name")])
            .header(ACCEPT, ACCEPT_V3);

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            request = request.header(AUTHORIZATION, format!("token {token}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, org));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl RepoSource for GitHubClient {
    async fn fetch_org_repos(
        &self,
        org: &str,
        token: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<RepositoryRecord>> {
        let mut repos = Vec::new();
        let mut page = 1;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let batch = tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                batch = self.fetch_page(org, token, page) => batch?,
            };

            let count = batch.len();
            debug!(org, page, count, "Fetched repository page");
            repos.extend(batch.into_iter().map(|r| r.into_record(org)));

            if count < PAGE_SIZE {
                break;
            }
            page += 1;
        }

        Ok(repos)
    }
}

fn status_error(status: StatusCode, org: &str) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound { org: org.to_string() },
        StatusCode::UNAUTHORIZED => Error::Unauthorized,
        StatusCode::FORBIDDEN => Error::RateLimited,
        other => Error::Api { status: other.as_u16() },
    }
}

/// Fetch every organization in order and merge the results sorted by name.
///
/// A failing organization is logged and skipped. Only cancellation aborts the
/// whole run, so a partial list never reaches the cache.
pub async fn fetch_all_repos<S: RepoSource + ?Sized>(
    source: &S,
    organizations: &[String],
    token: Option<&str>,
    cancel: &CancellationToken,
) -> Result<Vec<RepositoryRecord>> {
    let mut repos = Vec::new();

    for org in organizations {
        match source.fetch_org_repos(org, token, cancel).await {
            Ok(org_repos) => {
                info!(org = %org, count = org_repos.len(), "Fetched repositories");
                repos.extend(org_repos);
            }
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => warn!(org = %org, "Error fetching repos: {e}"),
        }
    }

    repos.sort_by(|a, b| locale_cmp(&a.name, &b.name));
    Ok(repos)
}

// Punctuation in collation order, all of it before digits and letters
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Primary weight of a lowercased char: whitespace, punctuation, digits, then letters
fn collation_weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        (0, c as u32)
    } else if let Some(pos) = PUNCTUATION_ORDER.find(c) {
        (1, pos as u32)
    } else if c.is_numeric() {
        (2, c.to_digit(10).unwrap_or(c as u32))
    } else {
        (3, c as u32)
    }
}

/// Name ordering close to a root-locale collator: case-insensitive, `_` and
/// other punctuation before digits and letters, lowercase first on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = |s: &str| {
        s.chars()
            .flat_map(char::to_lowercase)
            .map(collation_weight)
            .collect::<Vec<_>>()
    };
    let folded = primary(a).cmp(&primary(b));

    folded.then_with(|| {
        a.chars()
            .map(char::is_uppercase)
            .cmp(b.chars().map(char::is_uppercase))
    })
}
