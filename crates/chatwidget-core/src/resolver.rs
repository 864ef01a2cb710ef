//! Reply generation: a remote endpoint when one is configured, otherwise a
//! handful of canned replies picked by keyword.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::rc::Rc;

use chatwidget_types::{WidgetConfig, CONNECTION_APOLOGY, FALLBACK_REPLY};

use crate::platform::HttpTransport;

pub const GREETING_REPLY: &str = "Hello! How can I assist you today?";
pub const HELP_REPLY: &str = "I'm here to help! What do you need assistance with?";
pub const THANKS_REPLY: &str = "You're welcome! Is there anything else I can help with?";
pub const GENERIC_REPLY: &str =
    "That's a great question! I'd be happy to help with that. Could you provide more details?";

/// Decides the bot's reply to a user message. Never fails: problems are
/// turned into user-facing text.
#[async_trait(?Send)]
pub trait ResponseResolver {
    async fn resolve(&self, message: &str) -> String;
}

/// Pick the resolver for the current configuration
pub fn for_config(config: &WidgetConfig, transport: Rc<dyn HttpTransport>) -> Box<dyn ResponseResolver> {
    match &config.api_endpoint {
        Some(endpoint) => Box::new(RemoteResolver::new(endpoint.clone(), transport)),
        None => Box::new(LocalResolver),
    }
}

// ============================================================================
// Local mode
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Help,
    Thanks,
    Other,
}

impl Intent {
    /// Case-insensitive keyword match, first rule wins. `hi` has to be a
    /// word of its own so that "this" or "which" are not greetings.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        let has_word = |word: &str| {
            lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|w| w == word)
        };

        if has_word("hi") || lower.contains("hello") {
            Intent::Greeting
        } else if lower.contains("help") {
            Intent::Help
        } else if lower.contains("thank") {
            Intent::Thanks
        } else {
            Intent::Other
        }
    }

    pub fn reply(&self) -> &'static str {
        match self {
            Intent::Greeting => GREETING_REPLY,
            Intent::Help => HELP_REPLY,
            Intent::Thanks => THANKS_REPLY,
            Intent::Other => GENERIC_REPLY,
        }
    }
}

/// Stateless canned replies, used when no endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResolver;

#[async_trait(?Send)]
impl ResponseResolver for LocalResolver {
    async fn resolve(&self, message: &str) -> String {
        let intent = Intent::classify(message);
        log::debug!("Local reply for intent {:?}", intent);
        intent.reply().to_string()
    }
}

// ============================================================================
// Remote mode
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

/// Single POST per message, no retry
pub struct RemoteResolver {
    endpoint: String,
    transport: Rc<dyn HttpTransport>,
}

impl std::fmt::Debug for RemoteResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteResolver")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl RemoteResolver {
    pub fn new(endpoint: String, transport: Rc<dyn HttpTransport>) -> Self {
        Self { endpoint, transport }
    }

    async fn request(&self, message: &str) -> Result<Value> {
        let body = serde_json::to_value(ChatRequest { message })?;
        let response = self.transport.post_json(&self.endpoint, &body).await?;

        if !response.is_success() {
            log::warn!(
                "Chat endpoint {} answered with status {}",
                self.endpoint,
                response.status
            );
        }

        serde_json::from_str(&response.body).context("Failed to parse endpoint response")
    }
}

/// The `response` field if it is truthy, as text
fn reply_text(body: &Value) -> Option<String> {
    match body.get("response")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        Value::Array(_) | Value::Object(_) => Some(body["response"].to_string()),
        _ => None,
    }
}

#[async_trait(?Send)]
impl ResponseResolver for RemoteResolver {
    async fn resolve(&self, message: &str) -> String {
        match self.request(message).await {
            Ok(body) => reply_text(&body).unwrap_or_else(|| FALLBACK_REPLY.to_string()),
            Err(e) => {
                log::error!("AI Chatbot API Error: {:#}", e);
                CONNECTION_APOLOGY.to_string()
            }
        }
    }
}
