//! URL to card conversion inside an editor
//!
//! The conversion runs in four steps:
//! 1. a placeholder tagged with a random paste id replaces the selection,
//!    so the paste is visible immediately
//! 2. metadata is fetched
//! 3. the placeholder is looked up again in the *current* document text
//! 4. it is replaced with the card, or with the fallback text on failure
//!
//! If the placeholder disappeared while fetching, the document is left alone.

use crate::check::is_url;
use crate::editor::{position_from_index, Editor};
use crate::error::{CardError, FETCH_FAILED_NOTICE};
use crate::linker::CardLinker;
use crate::render::render_card;
use rand::Rng;
use tracing::{debug, warn};

const PASTE_ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const PASTE_ID_LEN: usize = 4;

/// Random id used to find the placeholder again after the fetch
pub fn new_paste_id() -> String {
    let mut rng = rand::thread_rng();
    (0..PASTE_ID_LEN)
        .map(|_| PASTE_ID_CHARS[rng.gen_range(0..PASTE_ID_CHARS.len())] as char)
        .collect()
}

/// Text shown in the document while metadata is being fetched
pub fn placeholder_text(paste_id: &str, url: &str) -> String {
    format!("[Fetching Data#{}]({})", paste_id, url)
}

/// Result of a conversion
#[derive(Debug)]
pub enum Conversion {
    /// Placeholder was replaced with the card markup
    Card {
        /// Inserted markup
        markup: String,
    },
    /// Metadata could not be fetched; placeholder was replaced with the fallback
    Reverted {
        /// Text restored in place of the placeholder
        replacement: String,
        /// Why the fetch failed
        error: CardError,
    },
    /// Placeholder was no longer in the document; nothing was replaced
    PlaceholderMissing {
        /// Placeholder text that was searched for
        placeholder: String,
    },
}

impl Conversion {
    /// True when a card was inserted
    pub fn is_card(&self) -> bool {
        matches!(self, Conversion::Card { .. })
    }

    /// Notice to show the user, if any
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Conversion::Reverted { .. } => Some(FETCH_FAILED_NOTICE),
            _ => None,
        }
    }
}

/// Converts URLs into cards inside an [`Editor`]
pub struct CardGenerator<'a, E: Editor + ?Sized> {
    editor: &'a mut E,
    linker: &'a CardLinker,
}

impl<'a, E: Editor + ?Sized> CardGenerator<'a, E> {
    /// Create a generator working on `editor`
    pub fn new(editor: &'a mut E, linker: &'a CardLinker) -> Self {
        Self { editor, linker }
    }

    /// Replace the current selection with a card for `url`
    ///
    /// Fetch failures are not errors here: the placeholder is replaced with
    /// the selected text (or `url` when nothing was selected) and the error
    /// is returned inside [`Conversion::Reverted`].
    pub async fn convert_url_to_card(&mut self, url: &str) -> Conversion {
        let selected_text = self.editor.selection();

        let placeholder = placeholder_text(&new_paste_id(), url);
        self.editor.replace_selection(&placeholder);

        let metadata = self.linker.fetch_metadata(url).await;

        let text = self.editor.value();
        let Some(start) = text.find(&placeholder) else {
            warn!(
                placeholder = %placeholder,
                url = %url,
                "Unable to find placeholder in current document, bailing out"
            );
            return Conversion::PlaceholderMissing { placeholder };
        };
        let end = start + placeholder.len();
        let start_pos = position_from_index(&text, start);
        let end_pos = position_from_index(&text, end);

        match metadata {
            Ok(meta) => {
                let markup = render_card(&meta);
                self.editor.replace_range(&markup, start_pos, end_pos);
                debug!(url = %url, "Inserted card");
                Conversion::Card { markup }
            }
            Err(error) => {
                warn!(url = %url, error = %error, "{}", FETCH_FAILED_NOTICE);
                let replacement = if selected_text.is_empty() {
                    url.to_string()
                } else {
                    selected_text
                };
                self.editor.replace_range(&replacement, start_pos, end_pos);
                Conversion::Reverted { replacement, error }
            }
        }
    }

    /// Convert the selected text, which must be a URL, into a card
    pub async fn convert_selected_url(&mut self) -> Result<Conversion, CardError> {
        let selected = self.editor.selection();
        if !is_url(&selected) {
            return Err(CardError::NotAUrl(selected));
        }
        let url = selected.trim().to_string();
        Ok(self.convert_url_to_card(&url).await)
    }
}
