//! Card markup rendering

use crate::types::LinkMetadata;

/// Render metadata as a `card-link` callout block
///
/// The block starts with a blank line and ends with a newline so it can be
/// dropped into the middle of a paragraph.
pub fn render_card(meta: &LinkMetadata) -> String {
    let title_link = match &meta.image {
        Some(image) => format!("[![]({})]({})", image, meta.url),
        None => format!("[]({})", meta.url),
    };
    let mut lines = vec![format!("\n> [!card-link] {}", title_link)];

    let header = match &meta.favicon {
        Some(favicon) => format!(
            "> ### [![favicon]({}){}]({})",
            favicon, meta.title, meta.url
        ),
        None => format!("> ### [{}]({})", meta.title, meta.url),
    };
    lines.push(header);

    if let Some(ref description) = meta.description {
        lines.push(format!("> {}", description));
    }

    if let Some(ref host) = meta.host {
        lines.push(format!(">\n> [{}](https://{})", host, host));
    }

    let mut block = lines.join("\n");
    block.push('\n');
    block
}
