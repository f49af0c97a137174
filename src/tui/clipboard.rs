use std::cell::RefCell;

use log::{debug, warn};

/// Somewhere to put copied text.
pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<(), String>;
}

/// The system clipboard via `arboard`.
///
/// The handle is created on first use and kept for the rest of the session:
/// on X11 the copied text is only served while the owning handle is alive.
#[derive(Default)]
pub struct SystemClipboard {
    handle: RefCell<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), String> {
        let mut handle = self.handle.borrow_mut();
        if handle.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|e| {
                warn!("Clipboard init failed: {e}");
                format!("Clipboard Init Error: {e}")
            })?;
            *handle = Some(clipboard);
        }

        let Some(clipboard) = handle.as_mut() else {
            return Err("Clipboard unavailable".to_string());
        };
        clipboard.set_text(text.to_string()).map_err(|e| {
            warn!("Clipboard write failed: {e}");
            format!("Clipboard Error: {e}")
        })?;
        debug!("Copied {} bytes to clipboard", text.len());
        Ok(())
    }
}
