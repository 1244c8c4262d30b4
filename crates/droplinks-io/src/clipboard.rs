//! Clipboard capability.

use tracing::warn;

/// Plain-text clipboard reader.
pub trait ClipboardText: Send {
    /// Clipboard contents, or `None` when the clipboard is unavailable or
    /// holds no text.
    fn read_text(&mut self) -> Option<String>;
}

/// System clipboard backed by `arboard`.
///
/// Construction never fails: when the platform clipboard cannot be
/// opened the reader stays inert and every read yields `None`.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        match arboard::Clipboard::new() {
            Ok(clipboard) => Self {
                inner: Some(clipboard),
            },
            Err(error) => {
                warn!(?error, "clipboard unavailable");
                Self { inner: None }
            }
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardText for SystemClipboard {
    fn read_text(&mut self) -> Option<String> {
        let clipboard = self.inner.as_mut()?;
        match clipboard.get_text() {
            Ok(text) => Some(text),
            Err(error) => {
                warn!(?error, "failed to read clipboard text");
                None
            }
        }
    }
}

/// Scripted clipboard for tests and headless sessions.
#[derive(Debug, Default)]
pub struct StaticClipboard {
    text: Option<String>,
}

impl StaticClipboard {
    pub fn new(text: Option<String>) -> Self {
        Self { text }
    }

    pub fn set(&mut self, text: Option<String>) {
        self.text = text;
    }
}

impl ClipboardText for StaticClipboard {
    fn read_text(&mut self) -> Option<String> {
        self.text.clone()
    }
}
