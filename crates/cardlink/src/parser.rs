//! HTML metadata extraction
//!
//! Reads Open Graph tags with plain HTML fallbacks:
//! - title: `og:title`, then the `<title>` in `<head>`
//! - description: `og:description`, then `<meta name="description">`
//! - image: `og:image`
//! - favicon: first `<link rel~="icon">`
//!
//! Relative image and icon references are resolved against the base URL,
//! which is the final response URL after redirects.

use crate::types::LinkMetadata;
use scraper::{Html, Selector};
use url::Url;

/// Extracts [`LinkMetadata`] from an HTML document
pub struct LinkMetadataParser<'a> {
    url: &'a str,
    base: Option<Url>,
    document: Html,
}

impl<'a> LinkMetadataParser<'a> {
    /// Create a parser for `html` fetched from `url`
    ///
    /// `base` is used to resolve relative references. When `None`, `url`
    /// itself is used.
    pub fn new(url: &'a str, base: Option<&Url>, html: &str) -> Self {
        let base = base.cloned().or_else(|| Url::parse(url).ok());
        Self {
            url,
            base,
            document: Html::parse_document(html),
        }
    }

    /// Extract metadata, or `None` when the page has no title
    pub fn parse(&self) -> Option<LinkMetadata> {
        let title = self.title()?;

        Some(LinkMetadata {
            url: self.url.to_string(),
            title,
            description: self.description(),
            image: self.image(),
            favicon: self.favicon(),
            host: self.host(),
        })
    }

    fn title(&self) -> Option<String> {
        self.meta_property("og:title")
            .or_else(|| self.text_of("head > title"))
    }

    fn description(&self) -> Option<String> {
        self.meta_property("og:description")
            .or_else(|| self.meta_name("description"))
    }

    fn image(&self) -> Option<String> {
        self.meta_property("og:image")
            .and_then(|href| self.resolve(&href))
    }

    fn favicon(&self) -> Option<String> {
        self.attr_of(r#"link[rel~="icon"]"#, "href")
            .and_then(|href| self.resolve(&href))
    }

    fn host(&self) -> Option<String> {
        Url::parse(self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }

    fn meta_property(&self, property: &str) -> Option<String> {
        self.attr_of(&format!(r#"meta[property="{}"]"#, property), "content")
    }

    fn meta_name(&self, name: &str) -> Option<String> {
        self.attr_of(&format!(r#"meta[name="{}"]"#, name), "content")
    }

    /// First non-empty value of `attr` on elements matching `selector`
    fn attr_of(&self, selector: &str, attr: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        self.document
            .select(&selector)
            .filter_map(|el| el.value().attr(attr))
            .map(normalize_text)
            .find(|s| !s.is_empty())
    }

    fn text_of(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        self.document
            .select(&selector)
            .map(|el| normalize_text(&el.text().collect::<String>()))
            .find(|s| !s.is_empty())
    }

    fn resolve(&self, href: &str) -> Option<String> {
        match &self.base {
            Some(base) => base.join(href).ok().map(|u| u.to_string()),
            None => Url::parse(href).ok().map(|u| u.to_string()),
        }
    }
}

/// Collapse whitespace runs (including newlines) into single spaces
fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Fallback Title</title>
    <meta property="og:title" content="OG Title">
    <meta property="og:description" content="A page
        about things">
    <meta name="description" content="Plain description">
    <meta property="og:image" content="/images/cover.png">
    <link rel="shortcut icon" href="//cdn.example.com/favicon.ico">
</head>
<body><p>Hello</p></body>
</html>"#;

    fn parse(url: &str, html: &str) -> Option<LinkMetadata> {
        LinkMetadataParser::new(url, None, html).parse()
    }

    #[test]
    fn test_prefers_open_graph() {
        let meta = parse("https://example.com/post/1", PAGE).unwrap();
        assert_eq!(meta.url, "https://example.com/post/1");
        assert_eq!(meta.title, "OG Title");
        assert_eq!(meta.description.as_deref(), Some("A page about things"));
        assert_eq!(meta.host.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_resolves_relative_references() {
        let meta = parse("https://example.com/post/1", PAGE).unwrap();
        assert_eq!(
            meta.image.as_deref(),
            Some("https://example.com/images/cover.png")
        );
        assert_eq!(
            meta.favicon.as_deref(),
            Some("https://cdn.example.com/favicon.ico")
        );
    }

    #[test]
    fn test_resolves_against_explicit_base() {
        let base = Url::parse("https://www.example.org/landing/").unwrap();
        let meta = LinkMetadataParser::new("https://short.ly/abc", Some(&base), PAGE)
            .parse()
            .unwrap();
        assert_eq!(
            meta.image.as_deref(),
            Some("https://www.example.org/images/cover.png")
        );
        // host always comes from the pasted URL
        assert_eq!(meta.host.as_deref(), Some("short.ly"));
    }

    #[test]
    fn test_falls_back_to_plain_html() {
        let html = r#"<html><head>
            <title>
                Plain   Title
            </title>
            <meta name="description" content="Plain description">
            <link rel="icon" href="https://example.com/icon.png">
        </head></html>"#;
        let meta = parse("http://example.com:8080/", html).unwrap();
        assert_eq!(meta.title, "Plain Title");
        assert_eq!(meta.description.as_deref(), Some("Plain description"));
        assert_eq!(meta.image, None);
        assert_eq!(meta.favicon.as_deref(), Some("https://example.com/icon.png"));
        assert_eq!(meta.host.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_empty_og_title_uses_title_tag() {
        let html = r#"<html><head>
            <meta property="og:title" content="   ">
            <title>Real Title</title>
        </head></html>"#;
        let meta = parse("https://example.com", html).unwrap();
        assert_eq!(meta.title, "Real Title");
    }

    #[test]
    fn test_no_title_gives_none() {
        let html = r#"<html><head><meta name="description" content="x"></head></html>"#;
        assert!(parse("https://example.com", html).is_none());
        assert!(parse("https://example.com", "").is_none());
    }

    #[test]
    fn test_ignores_svg_title_in_body() {
        let icon = r#"<svg><title>Close menu</title><path d="M0 0"/></svg>"#;

        let html = format!("<html><head></head><body>{}</body></html>", icon);
        assert!(parse("https://example.com", &html).is_none());

        let html = format!(
            "<html><head><title>Page</title></head><body>{}</body></html>",
            icon
        );
        assert_eq!(parse("https://example.com", &html).unwrap().title, "Page");
    }

    #[test]
    fn test_absolute_image_kept() {
        let html = r#"<html><head>
            <title>T</title>
            <meta property="og:image" content="https://img.example.net/a.jpg">
        </head></html>"#;
        let meta = parse("https://example.com", html).unwrap();
        assert_eq!(meta.image.as_deref(), Some("https://img.example.net/a.jpg"));
    }
}
