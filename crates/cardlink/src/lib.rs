//! CardLink - turn pasted URLs into link preview cards
//!
//! Fetches a page, extracts its metadata (title, description, image,
//! favicon, host) and renders a `card-link` callout block. Inside an
//! editor, the pasted URL is first replaced with a placeholder, which is
//! swapped for the card once the metadata arrives, or for the original
//! text if the fetch fails.
//!
//! ## Fetcher System
//!
//! Metadata comes from a pluggable fetcher system where specialized
//! fetchers handle specific URL patterns. The [`FetcherRegistry`]
//! dispatches requests to the appropriate fetcher based on URL matching.
//!
//! Built-in fetchers:
//! - [`DefaultFetcher`] - any HTTP/HTTPS page, via Open Graph and HTML tags
//! - [`GitHubRepoFetcher`] - GitHub repository roots, via the REST API
//!
//! ## Example
//!
//! ```rust,no_run
//! use cardlink::{CardLinker, Position, TextBuffer};
//!
//! # async fn example() {
//! let linker = CardLinker::default();
//! let mut doc = TextBuffer::new("Reading list:\n\n");
//! doc.set_cursor(Position::new(1, 0));
//!
//! let outcome = linker.convert_url(&mut doc, "https://www.rust-lang.org").await;
//! if let Some(notice) = outcome.notice() {
//!     eprintln!("{}", notice);
//! }
//! println!("{}", doc.text());
//! # }
//! ```

pub mod check;
pub mod client;
pub mod editor;
mod error;
pub mod fetchers;
mod generator;
mod linker;
mod parser;
mod render;
mod types;

pub use check::is_url;
pub use client::{fetch_metadata, fetch_metadata_with_options, FetchOptions};
pub use editor::{offset_from_position, position_from_index, Editor, Position, TextBuffer};
pub use error::{CardError, FETCH_FAILED_NOTICE};
pub use fetchers::{DefaultFetcher, Fetcher, FetcherRegistry, GitHubRepoFetcher};
pub use generator::{new_paste_id, placeholder_text, CardGenerator, Conversion};
pub use linker::{CardLinker, CardLinkerBuilder};
pub use parser::LinkMetadataParser;
pub use render::render_card;
pub use types::{CardRequest, LinkMetadata};

/// Default User-Agent string
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; CardLink/1.0)";

/// Tool description for LLM consumption
pub const TOOL_DESCRIPTION: &str = r#"Fetches a URL and returns a markdown link preview card.

- Reads Open Graph and HTML metadata (title, description, image, favicon)
- Returns a `> [!card-link]` callout block
- Fails when the page is unreachable, not HTML, or has no title"#;

/// Extended documentation for LLM consumption (llmtxt)
pub const TOOL_LLMTXT: &str = r#"# CardLink Tool

Fetches a URL and renders its metadata as a markdown link preview card.

## Capabilities
- Open Graph metadata with HTML fallbacks
- Relative image and favicon URLs resolved against the final page URL
- GitHub repository URLs resolved through the GitHub API

## Input Parameters
- `url` (required): The URL to render (must be http:// or https://)

## Output
A callout block:

```markdown
> [!card-link] [![](image)](url)
> ### [![favicon](favicon)Title](url)
> Description
>
> [host](https://host)
```

Lines for image, favicon, description and host are omitted when the page
does not provide them.

## Examples

### Render a card
```json
{"url": "https://www.rust-lang.org"}
```

## Error Handling
- Invalid URLs return an error
- Non-200 responses return an error
- Binary content returns an error
- Pages without a title return an error
"#;
