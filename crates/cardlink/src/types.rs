//! Core types for CardLink

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata extracted from a linked page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LinkMetadata {
    /// The URL that was pasted
    pub url: String,

    /// Page title (og:title or <title>)
    pub title: String,

    /// Page description (og:description or meta description)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Absolute URL of the preview image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Absolute URL of the site icon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,

    /// Host name of the pasted URL, without port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl LinkMetadata {
    /// Create metadata with only the required fields set
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Request to render a card for a URL
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CardRequest {
    /// The URL to render (required, must be http:// or https://)
    pub url: String,
}

impl CardRequest {
    /// Create a new request with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
