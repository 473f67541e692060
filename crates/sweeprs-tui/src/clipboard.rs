//! Clipboard access for copying passwords.

use anyhow::{Context, Result};

/// Destination for copied text.
pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        let clipboard = match self.inner.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().context("Clipboard unavailable")?,
        };
        let clipboard = self.inner.insert(clipboard);
        clipboard
            .set_text(text.to_owned())
            .context("Failed to write to clipboard")
    }
}
