//! Linker builder and entry point for CardLink

use crate::client::{FetchOptions, DEFAULT_TIMEOUT};
use crate::editor::Editor;
use crate::error::CardError;
use crate::fetchers::{Fetcher, FetcherRegistry};
use crate::generator::{CardGenerator, Conversion};
use crate::render::render_card;
use crate::types::{CardRequest, LinkMetadata};
use crate::{TOOL_DESCRIPTION, TOOL_LLMTXT};
use schemars::schema_for;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Builder for configuring a [`CardLinker`]
pub struct CardLinkerBuilder {
    user_agent: Option<String>,
    allow_prefixes: Vec<String>,
    block_prefixes: Vec<String>,
    timeout: Duration,
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl Default for CardLinkerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CardLinkerBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self {
            user_agent: None,
            allow_prefixes: Vec::new(),
            block_prefixes: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            fetchers: Vec::new(),
        }
    }

    /// Set custom User-Agent
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Add URL prefix to allow list
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.allow_prefixes.push(prefix.into());
        self
    }

    /// Add URL prefix to block list
    pub fn block_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.block_prefixes.push(prefix.into());
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a custom fetcher, checked before the built-in ones
    pub fn fetcher(mut self, fetcher: Box<dyn Fetcher>) -> Self {
        self.fetchers.push(fetcher);
        self
    }

    /// Build the linker
    pub fn build(self) -> CardLinker {
        let mut registry = FetcherRegistry::new();
        for fetcher in self.fetchers {
            registry.register(fetcher);
        }
        registry.register_defaults();

        CardLinker {
            options: FetchOptions {
                user_agent: self.user_agent,
                allow_prefixes: self.allow_prefixes,
                block_prefixes: self.block_prefixes,
                timeout: self.timeout,
            },
            registry: Arc::new(registry),
        }
    }
}

/// Configured link card generator
#[derive(Clone)]
pub struct CardLinker {
    options: FetchOptions,
    registry: Arc<FetcherRegistry>,
}

impl Default for CardLinker {
    fn default() -> Self {
        CardLinkerBuilder::new().build()
    }
}

impl fmt::Debug for CardLinker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardLinker")
            .field("options", &self.options)
            .field("fetchers", &self.registry)
            .finish()
    }
}

impl CardLinker {
    /// Create a new linker builder
    pub fn builder() -> CardLinkerBuilder {
        CardLinkerBuilder::new()
    }

    /// Options used for every fetch
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    /// Get tool description
    pub fn description(&self) -> &'static str {
        TOOL_DESCRIPTION
    }

    /// Get full documentation (llmtxt)
    pub fn llmtxt(&self) -> &'static str {
        TOOL_LLMTXT
    }

    /// Get input schema as JSON
    pub fn input_schema(&self) -> serde_json::Value {
        let schema = schema_for!(CardRequest);
        serde_json::to_value(schema).unwrap_or_default()
    }

    /// Fetch metadata for a URL
    pub async fn fetch_metadata(&self, url: &str) -> Result<LinkMetadata, CardError> {
        self.registry.fetch(url, &self.options).await
    }

    /// Fetch metadata and render it as card markup
    pub async fn card(&self, url: &str) -> Result<String, CardError> {
        let meta = self.fetch_metadata(url).await?;
        Ok(render_card(&meta))
    }

    /// Replace the editor's selection with a card for `url`
    pub async fn convert_url<E: Editor + ?Sized>(&self, editor: &mut E, url: &str) -> Conversion {
        CardGenerator::new(editor, self).convert_url_to_card(url).await
    }

    /// Convert the editor's selected URL into a card
    pub async fn convert_selection<E: Editor + ?Sized>(
        &self,
        editor: &mut E,
    ) -> Result<Conversion, CardError> {
        CardGenerator::new(editor, self).convert_selected_url().await
    }
}
