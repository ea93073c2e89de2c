//! GitHub repository fetcher
//!
//! Handles GitHub repository root URLs. Repository pages are heavy and their
//! Open Graph data is generic, so the REST API is asked instead.

use crate::client::FetchOptions;
use crate::error::CardError;
use crate::fetchers::Fetcher;
use crate::types::LinkMetadata;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, USER_AGENT};
use serde::Deserialize;
use url::Url;

const GITHUB_API: &str = "https://api.github.com";

const GITHUB_FAVICON: &str = "https://github.com/favicon.ico";

/// Top-level github.com paths that are not user or org names
const RESERVED: &[&str] = &[
    "settings",
    "explore",
    "trending",
    "collections",
    "events",
    "sponsors",
    "notifications",
    "marketplace",
    "pulls",
    "issues",
    "codespaces",
    "features",
    "enterprise",
    "organizations",
    "pricing",
    "about",
    "team",
    "security",
    "login",
    "join",
];

/// GitHub repository fetcher
///
/// Matches GitHub repository root URLs (`https://github.com/{owner}/{repo}`)
/// and builds metadata from the repository API.
pub struct GitHubRepoFetcher {
    api_base: String,
}

impl GitHubRepoFetcher {
    /// Create a new GitHub repo fetcher
    pub fn new() -> Self {
        Self::with_api_base(GITHUB_API)
    }

    /// Create a fetcher that talks to a different API host
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Extract owner and repo from a GitHub URL
    fn parse_github_url(url: &Url) -> Option<(String, String)> {
        if url.host_str() != Some("github.com") {
            return None;
        }

        let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();

        // Only repository roots; /owner/repo/issues etc. get their own page metadata
        if segments.len() != 2 {
            return None;
        }

        let owner = segments[0];
        let repo = segments[1];

        if owner.is_empty() || repo.is_empty() || RESERVED.contains(&owner) {
            return None;
        }

        Some((owner.to_string(), repo.to_string()))
    }
}

impl Default for GitHubRepoFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// GitHub API repository response (partial)
#[derive(Debug, Deserialize)]
struct GitHubRepo {
    full_name: String,
    description: Option<String>,
    owner: GitHubOwner,
}

#[derive(Debug, Deserialize)]
struct GitHubOwner {
    avatar_url: Option<String>,
}

#[async_trait]
impl Fetcher for GitHubRepoFetcher {
    fn name(&self) -> &'static str {
        "github_repo"
    }

    fn matches(&self, url: &Url) -> bool {
        Self::parse_github_url(url).is_some()
    }

    async fn fetch(
        &self,
        raw: &str,
        url: &Url,
        options: &FetchOptions,
    ) -> Result<LinkMetadata, CardError> {
        let (owner, repo) = Self::parse_github_url(url).ok_or_else(|| {
            CardError::FetcherError("Not a valid GitHub repository URL".to_string())
        })?;

        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let client = reqwest::Client::builder()
            .connect_timeout(options.timeout)
            .timeout(options.timeout)
            .build()
            .map_err(CardError::ClientBuildError)?;

        let repo_url = format!("{}/repos/{}/{}", self.api_base, owner, repo);
        let response = client
            .get(&repo_url)
            .header(
                USER_AGENT,
                HeaderValue::from_str(user_agent)
                    .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
            )
            .header(
                ACCEPT,
                HeaderValue::from_static("application/vnd.github+json"),
            )
            .send()
            .await
            .map_err(CardError::from_reqwest)?;

        let status_code = response.status().as_u16();
        if status_code != 200 {
            return Err(CardError::BadStatus(status_code));
        }

        let repo_data: GitHubRepo = response
            .json()
            .await
            .map_err(|e| CardError::FetcherError(format!("Failed to parse repo data: {}", e)))?;

        Ok(repo_metadata(raw, repo_data))
    }
}

fn repo_metadata(raw: &str, repo: GitHubRepo) -> LinkMetadata {
    let description = repo
        .description
        .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|d| !d.is_empty());

    LinkMetadata {
        url: raw.to_string(),
        title: repo.full_name,
        description,
        image: repo.owner.avatar_url.filter(|a| !a.is_empty()),
        favicon: Some(GITHUB_FAVICON.to_string()),
        host: Some("github.com".to_string()),
    }
}
