//! Fetcher system for link metadata
//!
//! Design: Each fetcher handles specific URL patterns with custom logic.
//! FetcherRegistry dispatches to the first matching fetcher.

mod default;
mod github_repo;

pub use default::DefaultFetcher;
pub use github_repo::GitHubRepoFetcher;

use crate::check::has_http_scheme;
use crate::client::FetchOptions;
use crate::error::CardError;
use crate::types::LinkMetadata;
use async_trait::async_trait;
use std::fmt;
use url::Url;

/// Trait for metadata fetchers
///
/// Implement this trait to create custom fetchers for specific URL patterns.
/// Each fetcher declares what URLs it can handle via `matches()` and
/// produces metadata via `fetch()`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Unique identifier for this fetcher (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Returns true if this fetcher can handle the given URL
    ///
    /// More specific fetchers should be registered before generic ones.
    fn matches(&self, url: &Url) -> bool;

    /// Fetch metadata for the URL
    ///
    /// Called only if `matches()` returned true. `raw` is the URL exactly
    /// as the user pasted it and should be used as [`LinkMetadata::url`].
    async fn fetch(
        &self,
        raw: &str,
        url: &Url,
        options: &FetchOptions,
    ) -> Result<LinkMetadata, CardError>;
}

/// Registry of fetchers that dispatches to the appropriate handler
///
/// Maintains an ordered list of fetchers. When fetching a URL, iterates
/// through fetchers and uses the first one that matches.
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl Default for FetcherRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FetcherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.fetchers.iter().map(|f| f.name()))
            .finish()
    }
}

impl FetcherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            fetchers: Vec::new(),
        }
    }

    /// Create a registry with default fetchers pre-registered
    ///
    /// Includes (in order of priority):
    /// 1. GitHubRepoFetcher - handles GitHub repository URLs
    /// 2. DefaultFetcher - handles all HTTP/HTTPS URLs
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_defaults();
        registry
    }

    /// Append the built-in fetchers after any already registered
    pub fn register_defaults(&mut self) {
        self.register(Box::new(GitHubRepoFetcher::new()));
        // catches all remaining URLs
        self.register(Box::new(DefaultFetcher::new()));
    }

    /// Register a fetcher
    ///
    /// Fetchers are checked in registration order, so register more
    /// specific fetchers before generic ones.
    pub fn register(&mut self, fetcher: Box<dyn Fetcher>) {
        self.fetchers.push(fetcher);
    }

    /// Names of registered fetchers, in priority order
    pub fn names(&self) -> Vec<&'static str> {
        self.fetchers.iter().map(|f| f.name()).collect()
    }

    /// Fetch metadata using the appropriate fetcher
    ///
    /// Validates the scheme and the allow/block lists, then uses the first
    /// fetcher that matches the URL.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<LinkMetadata, CardError> {
        if url.is_empty() {
            return Err(CardError::MissingUrl);
        }

        if !has_http_scheme(url) {
            return Err(CardError::InvalidUrlScheme);
        }

        let parsed_url = Url::parse(url).map_err(|_| CardError::InvalidUrlScheme)?;

        if !options.allow_prefixes.is_empty()
            && !options
                .allow_prefixes
                .iter()
                .any(|prefix| url.starts_with(prefix))
        {
            return Err(CardError::BlockedUrl);
        }

        if options
            .block_prefixes
            .iter()
            .any(|prefix| url.starts_with(prefix))
        {
            return Err(CardError::BlockedUrl);
        }

        for fetcher in &self.fetchers {
            if fetcher.matches(&parsed_url) {
                tracing::debug!(fetcher = fetcher.name(), url = %url, "Using fetcher");
                return fetcher.fetch(url, &parsed_url, options).await;
            }
        }

        Err(CardError::FetcherError(
            "No fetcher available for URL".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;

    #[async_trait]
    impl Fetcher for Stub {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn matches(&self, url: &Url) -> bool {
            url.host_str() == Some("stub.test")
        }

        async fn fetch(
            &self,
            raw: &str,
            _url: &Url,
            _options: &FetchOptions,
        ) -> Result<LinkMetadata, CardError> {
            Ok(LinkMetadata::new(raw, "Stubbed"))
        }
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = FetcherRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["github_repo", "default"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = FetcherRegistry::new();
        assert!(registry.names().is_empty());
        assert_eq!(format!("{:?}", registry), "[]");
    }

    #[tokio::test]
    async fn test_dispatches_to_first_match() {
        let mut registry = FetcherRegistry::new();
        registry.register(Box::new(Stub));
        registry.register_defaults();

        let meta = registry
            .fetch("https://stub.test/page", &FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(meta.title, "Stubbed");
        assert_eq!(meta.url, "https://stub.test/page");
    }

    #[tokio::test]
    async fn test_no_matching_fetcher() {
        let mut registry = FetcherRegistry::new();
        registry.register(Box::new(Stub));

        let result = registry
            .fetch("https://other.test/", &FetchOptions::default())
            .await;
        assert!(matches!(result, Err(CardError::FetcherError(_))));
    }

    #[tokio::test]
    async fn test_prefix_lists() {
        let mut registry = FetcherRegistry::new();
        registry.register(Box::new(Stub));

        let options = FetchOptions {
            allow_prefixes: vec!["https://allowed.test".to_string()],
            ..Default::default()
        };
        let result = registry.fetch("https://stub.test/", &options).await;
        assert!(matches!(result, Err(CardError::BlockedUrl)));

        let options = FetchOptions {
            block_prefixes: vec!["https://stub.test".to_string()],
            ..Default::default()
        };
        let result = registry.fetch("https://stub.test/", &options).await;
        assert!(matches!(result, Err(CardError::BlockedUrl)));
    }

    #[tokio::test]
    async fn test_rejects_bad_urls() {
        let registry = FetcherRegistry::with_defaults();
        let options = FetchOptions::default();
        assert!(matches!(
            registry.fetch("", &options).await,
            Err(CardError::MissingUrl)
        ));
        assert!(matches!(
            registry.fetch("mailto:me@example.com", &options).await,
            Err(CardError::InvalidUrlScheme)
        ));
        assert!(matches!(
            registry.fetch("https://", &options).await,
            Err(CardError::InvalidUrlScheme)
        ));
    }

    #[tokio::test]
    async fn test_rejects_what_is_url_rejects() {
        let mut registry = FetcherRegistry::new();
        registry.register(Box::new(Stub));
        let options = FetchOptions::default();

        for raw in ["HTTPS://stub.test/", "http:stub.test", "https:/stub.test"] {
            assert!(!crate::check::is_url(raw), "{}", raw);
            assert!(
                matches!(
                    registry.fetch(raw, &options).await,
                    Err(CardError::InvalidUrlScheme)
                ),
                "{}",
                raw
            );
        }
    }
}
