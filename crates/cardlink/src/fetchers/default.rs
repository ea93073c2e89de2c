//! Default HTML page fetcher
//!
//! Handles general HTTP/HTTPS URLs by fetching the page and reading its
//! Open Graph and HTML metadata. This is the fallback fetcher that handles
//! any URL not matched by specialized fetchers.

use crate::client::FetchOptions;
use crate::error::CardError;
use crate::fetchers::Fetcher;
use crate::parser::LinkMetadataParser;
use crate::types::LinkMetadata;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::fmt;
use std::pin::pin;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Binary content type prefixes
const BINARY_PREFIXES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "application/octet-stream",
    "application/pdf",
    "application/zip",
    "application/gzip",
    "application/x-tar",
    "application/x-rar",
    "application/x-7z",
    "application/vnd.ms-",
    "application/vnd.openxmlformats",
    "font/",
];

/// Metadata lives in <head>; no need to read huge pages in full
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const ACCEPT_HTML: &str = "text/html, application/xhtml+xml, */*;q=0.8";

/// Default HTML page fetcher
///
/// Handles all HTTP/HTTPS URLs with:
/// - a single GET request
/// - binary content rejection
/// - body size and time limits, parsing whatever arrived
pub struct DefaultFetcher;

impl DefaultFetcher {
    /// Create a new default fetcher
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for DefaultFetcher {
    fn name(&self) -> &'static str {
        "default"
    }

    fn matches(&self, _url: &Url) -> bool {
        // Default fetcher matches all URLs
        true
    }

    async fn fetch(
        &self,
        raw: &str,
        url: &Url,
        options: &FetchOptions,
    ) -> Result<LinkMetadata, CardError> {
        let mut headers = HeaderMap::new();
        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

        // Headers and body get separate deadlines, so no client-wide timeout
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(options.timeout)
            .build()
            .map_err(CardError::ClientBuildError)?;

        let response = tokio::time::timeout(options.timeout, client.get(url.as_str()).send())
            .await
            .map_err(|_| CardError::Timeout)?
            .map_err(CardError::from_reqwest)?;

        let status_code = response.status().as_u16();
        if status_code != 200 {
            debug!(url = %raw, status_code, "Bad response");
            return Err(CardError::BadStatus(status_code));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(ref ct) = content_type {
            if is_binary_content_type(ct) {
                return Err(CardError::UnsupportedContent(ct.clone()));
            }
        }

        // Relative references resolve against where we ended up
        let final_url = response.url().clone();

        let (body, truncated) =
            read_body_limited(response.bytes_stream(), options.timeout, MAX_BODY_BYTES).await;
        if truncated {
            debug!(url = %raw, bytes = body.len(), "Parsing truncated body");
        }

        let html = String::from_utf8_lossy(&body);
        parse_metadata(raw, &final_url, &html)
    }
}

/// Run the parser synchronously; the parsed DOM never crosses an await
fn parse_metadata(raw: &str, base: &Url, html: &str) -> Result<LinkMetadata, CardError> {
    LinkMetadataParser::new(raw, Some(base), html)
        .parse()
        .ok_or(CardError::MissingTitle)
}

/// Check if content type indicates binary content
fn is_binary_content_type(content_type: &str) -> bool {
    let ct_lower = content_type.to_lowercase();
    BINARY_PREFIXES
        .iter()
        .any(|prefix| ct_lower.starts_with(prefix))
}

/// Read the response body until it ends, the deadline passes or `limit`
/// bytes have arrived. Returns the bytes and whether reading stopped early.
async fn read_body_limited<S, E>(stream: S, timeout: Duration, limit: usize) -> (Bytes, bool)
where
    S: Stream<Item = Result<Bytes, E>>,
    E: fmt::Display,
{
    let mut body = Vec::new();
    let mut stream = pin!(stream);
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let chunk_future = stream.next();
        let timeout_future = tokio::time::sleep_until(deadline);

        tokio::select! {
            chunk = chunk_future => {
                match chunk {
                    Some(Ok(bytes)) => {
                        body.extend_from_slice(&bytes);
                        if body.len() >= limit {
                            body.truncate(limit);
                            return (Bytes::from(body), true);
                        }
                    }
                    Some(Err(e)) => {
                        error!("Error reading body chunk: {}", e);
                        let has_content = !body.is_empty();
                        return (Bytes::from(body), has_content);
                    }
                    None => {
                        return (Bytes::from(body), false);
                    }
                }
            }
            _ = timeout_future => {
                warn!("Body timeout reached, parsing partial content");
                return (Bytes::from(body), true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_binary_content_type() {
        assert!(is_binary_content_type("image/png"));
        assert!(is_binary_content_type("Image/JPEG"));
        assert!(is_binary_content_type("video/mp4"));
        assert!(is_binary_content_type("application/pdf"));
        assert!(is_binary_content_type("application/octet-stream"));
        assert!(is_binary_content_type(
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        ));
        assert!(is_binary_content_type("font/woff2"));

        assert!(!is_binary_content_type("text/html; charset=utf-8"));
        assert!(!is_binary_content_type("application/xhtml+xml"));
        assert!(!is_binary_content_type("text/plain"));
    }

    #[test]
    fn test_parse_metadata_missing_title() {
        let base = Url::parse("https://example.com/").unwrap();
        let result = parse_metadata("https://example.com/", &base, "<p>no head</p>");
        assert!(matches!(result, Err(CardError::MissingTitle)));
    }

    #[test]
    fn test_parse_metadata_uses_raw_url() {
        let base = Url::parse("https://example.com/landing").unwrap();
        let html = "<html><head><title>Landing</title></head></html>";
        let meta = parse_metadata("https://example.com/go", &base, html).unwrap();
        assert_eq!(meta.url, "https://example.com/go");
        assert_eq!(meta.title, "Landing");
    }

    fn chunks(parts: &[&'static str]) -> Vec<Result<Bytes, String>> {
        parts
            .iter()
            .copied()
            .map(|p| Ok(Bytes::from_static(p.as_bytes())))
            .collect()
    }

    #[tokio::test]
    async fn test_read_body_complete() {
        let stream = futures::stream::iter(chunks(&["<title>", "Done", "</title>"]));
        let (body, truncated) = read_body_limited(stream, Duration::from_secs(5), 1024).await;
        assert_eq!(&body[..], b"<title>Done</title>");
        assert!(!truncated);
    }

    #[tokio::test]
    async fn test_read_body_stops_at_limit() {
        let stream = futures::stream::iter(chunks(&["0123456789", "abcdef"]));
        let (body, truncated) = read_body_limited(stream, Duration::from_secs(5), 12).await;
        assert_eq!(&body[..], b"0123456789ab");
        assert!(truncated);
    }

    #[tokio::test]
    async fn test_read_body_keeps_partial_content_on_deadline() {
        // first chunk arrives, then the stream stalls forever
        let stream = futures::stream::iter(chunks(&["<title>Slow</title>"]))
            .chain(futures::stream::pending());
        let (body, truncated) =
            read_body_limited(stream, Duration::from_millis(50), 1024).await;
        assert_eq!(&body[..], b"<title>Slow</title>");
        assert!(truncated);

        let base = Url::parse("https://example.com/").unwrap();
        let html = String::from_utf8_lossy(&body);
        let meta = parse_metadata("https://example.com/", &base, &html).unwrap();
        assert_eq!(meta.title, "Slow");
    }

    #[tokio::test]
    async fn test_read_body_chunk_error() {
        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err("connection reset".to_string()),
        ]);
        let (body, truncated) = read_body_limited(stream, Duration::from_secs(5), 1024).await;
        assert_eq!(&body[..], b"partial");
        assert!(truncated);
    }

    #[test]
    fn test_default_fetcher_matches_all() {
        let fetcher = DefaultFetcher::new();
        let url = Url::parse("https://example.com").unwrap();
        assert!(fetcher.matches(&url));

        let url = Url::parse("https://github.com/owner/repo").unwrap();
        assert!(fetcher.matches(&url));
    }
}
