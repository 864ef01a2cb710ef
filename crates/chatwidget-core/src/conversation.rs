//! The visible conversation and its session-storage mirror.
//!
//! Persistence is best effort: a storage that is full, disabled or holding
//! garbage never stops a message from being shown.

use std::cell::RefCell;
use std::rc::Rc;

use chatwidget_types::{Message, Result, STORAGE_KEY};

use crate::platform::SessionStore;

pub struct Conversation {
    storage: Rc<dyn SessionStore>,
    key: String,
    messages: RefCell<Vec<Message>>,
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("key", &self.key)
            .field("messages", &self.messages.borrow().len())
            .finish()
    }
}

impl Conversation {
    pub fn new(storage: Rc<dyn SessionStore>) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: Rc<dyn SessionStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            messages: RefCell::new(Vec::new()),
        }
    }

    /// Read the stored history and adopt it as the in-memory conversation.
    /// Returns the restored messages (possibly none).
    pub fn restore(&self) -> Vec<Message> {
        let history = self.read_stored();
        *self.messages.borrow_mut() = history.clone();
        history
    }

    /// Append a message and write it through to storage
    pub fn record(&self, message: Message) {
        if let Err(e) = self.persist(&message) {
            log::warn!("Failed to persist chat message: {}", e);
        }
        self.messages.borrow_mut().push(message);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    fn read_stored(&self) -> Vec<Message> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Failed to read chat history: {}", e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable chat history: {}", e);
            Vec::new()
        })
    }

    /// Read-append-write, so other writers of the same key are not clobbered
    fn persist(&self, message: &Message) -> Result<()> {
        let mut stored = self.read_stored();
        stored.push(message.clone());
        let json = serde_json::to_string(&stored)?;
        self.storage.set_item(&self.key, &json)
    }
}
