use web_sys::Storage;

use chatwidget_core::SessionStore;
use chatwidget_types::{Result, WidgetError};

/// `window.sessionStorage`. Access can be denied (sandboxed iframes,
/// privacy modes); every call then fails and the widget carries on.
#[derive(Debug, Clone)]
pub struct BrowserSessionStore {
    storage: Option<Storage>,
}

impl BrowserSessionStore {
    pub fn new() -> Self {
        let storage = crate::window()
            .ok()
            .and_then(|window| window.session_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("sessionStorage unavailable; conversation will not persist");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| WidgetError::Storage("sessionStorage unavailable".to_string()))
    }
}

impl Default for BrowserSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for BrowserSessionStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.storage()?
            .get_item(key)
            .map_err(|e| WidgetError::Storage(format!("{:?}", e)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| WidgetError::Storage(format!("{:?}", e)))
    }
}
