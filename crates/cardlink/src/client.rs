//! Metadata client for CardLink
//!
//! This module provides the plain entry points for fetching link metadata.
//! The actual fetch logic is implemented by fetchers in the [`fetchers`](crate::fetchers) module.

use crate::error::CardError;
use crate::fetchers::FetcherRegistry;
use crate::types::LinkMetadata;
use std::time::Duration;

/// Default total request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch options that can be configured via the linker builder
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Custom User-Agent
    pub user_agent: Option<String>,
    /// Allow list of URL prefixes
    pub allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    pub block_prefixes: Vec<String>,
    /// Timeout for connect and response headers
    pub timeout: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: None,
            allow_prefixes: Vec::new(),
            block_prefixes: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Fetch metadata for a URL
///
/// Uses the default fetcher registry with all built-in fetchers.
/// For custom options, use [`fetch_metadata_with_options`].
pub async fn fetch_metadata(url: &str) -> Result<LinkMetadata, CardError> {
    fetch_metadata_with_options(url, &FetchOptions::default()).await
}

/// Fetch metadata for a URL with custom options
///
/// Uses the default fetcher registry with all built-in fetchers.
/// For custom fetcher configuration, use [`FetcherRegistry`] directly.
pub async fn fetch_metadata_with_options(
    url: &str,
    options: &FetchOptions,
) -> Result<LinkMetadata, CardError> {
    // Validate URL early
    if url.is_empty() {
        return Err(CardError::MissingUrl);
    }

    let registry = FetcherRegistry::with_defaults();
    registry.fetch(url, options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_empty_url() {
        let result = fetch_metadata("").await;
        assert!(matches!(result, Err(CardError::MissingUrl)));
    }

    #[tokio::test]
    async fn test_fetch_invalid_scheme() {
        let result = fetch_metadata("ftp://example.com").await;
        assert!(matches!(result, Err(CardError::InvalidUrlScheme)));
    }

    #[test]
    fn test_fetch_options_default() {
        let options = FetchOptions::default();
        assert!(options.user_agent.is_none());
        assert!(options.allow_prefixes.is_empty());
        assert!(options.block_prefixes.is_empty());
        assert_eq!(options.timeout, DEFAULT_TIMEOUT);
    }
}
