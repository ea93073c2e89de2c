//! Text classification helpers

use url::Url;

/// True when `text` starts with a lowercase `http://` or `https://` scheme
///
/// This is the scheme rule the fetcher registry enforces, so anything
/// [`is_url`] accepts can actually be fetched.
pub(crate) fn has_http_scheme(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

/// True when `text` is a single absolute http(s) URL with a host
pub fn is_url(text: &str) -> bool {
    let text = text.trim();
    if !has_http_scheme(text) || text.chars().any(char::is_whitespace) {
        return false;
    }
    match Url::parse(text) {
        Ok(url) => url.host_str().is_some(),
        Err(_) => false,
    }
}
