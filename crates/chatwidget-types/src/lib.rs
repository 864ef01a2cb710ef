//! Core types and structures for the chat widget
//!
//! This crate provides the data model shared by the controller and the
//! browser bindings: messages, configuration and the widget error type.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;

pub use config::WidgetConfig;

// ============================================================================
// Constants
// ============================================================================

/// Session storage key holding the JSON-encoded conversation
pub const STORAGE_KEY: &str = "ai_chatbot_conversation";

/// Attribute prefix used for declarative configuration on the script element
pub const ATTRIBUTE_PREFIX: &str = "data-";

/// Attribute that opts a script element into automatic initialization
pub const AUTOLOAD_ATTRIBUTE: &str = "data-autoload";

/// Reply used when the endpoint answers without a usable `response` field
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't process your request.";

/// Reply used when the endpoint cannot be reached or its body cannot be parsed
pub const CONNECTION_APOLOGY: &str =
    "I'm having trouble connecting to my brain. Please try again later.";

// ============================================================================
// Message Types
// ============================================================================

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }

    /// CSS class of the message bubble for this sender
    pub fn css_class(&self) -> &'static str {
        match self {
            Sender::User => "user-message",
            Sender::Bot => "bot-message",
        }
    }
}

/// A single entry of the conversation, as rendered and as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
    /// ISO-8601 UTC timestamp, millisecond precision
    pub timestamp: String,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("dom error: {0}")]
    Dom(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WidgetError>;
