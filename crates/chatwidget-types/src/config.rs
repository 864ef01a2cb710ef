use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

pub const DEFAULT_BOT_NAME: &str = "AI Assistant";
pub const DEFAULT_PRIMARY_COLOR: &str = "#8559DA";
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hi there! How can I help you today?";
pub const DEFAULT_PLACEHOLDER_TEXT: &str = "Type your message...";
pub const DEFAULT_WIDGET_ID: &str = "ai-chat-widget";
pub const DEFAULT_TYPING_DELAY_MS: u64 = 1000;

/// Widget configuration: built-in defaults overlaid with caller options.
///
/// Options are addressed by name in any of the spellings a host page may use
/// (`botName`, `bot-name`, `bot_name`, `botname`). Unknown options are kept
/// verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub bot_name: String,
    pub primary_color: String,
    pub welcome_message: String,
    pub placeholder_text: String,
    pub api_endpoint: Option<String>,
    #[serde(rename = "typingDelay")]
    pub typing_delay_ms: u64,
    pub widget_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            bot_name: DEFAULT_BOT_NAME.to_string(),
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            placeholder_text: DEFAULT_PLACEHOLDER_TEXT.to_string(),
            api_endpoint: None,
            typing_delay_ms: DEFAULT_TYPING_DELAY_MS,
            widget_id: DEFAULT_WIDGET_ID.to_string(),
            extra: Map::new(),
        }
    }
}

/// Known options, keyed by their normalized name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigKey {
    BotName,
    PrimaryColor,
    WelcomeMessage,
    PlaceholderText,
    ApiEndpoint,
    TypingDelay,
    WidgetId,
}

impl ConfigKey {
    fn parse(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "botname" => Some(Self::BotName),
            "primarycolor" | "primarycolour" => Some(Self::PrimaryColor),
            "welcomemessage" => Some(Self::WelcomeMessage),
            "placeholdertext" | "placeholder" => Some(Self::PlaceholderText),
            "apiendpoint" | "endpoint" => Some(Self::ApiEndpoint),
            "typingdelay" | "typingdelayms" => Some(Self::TypingDelay),
            "widgetid" => Some(Self::WidgetId),
            _ => None,
        }
    }
}

impl WidgetConfig {
    /// Defaults overlaid with every entry of `options`
    pub fn from_options(options: &Map<String, Value>) -> Self {
        let mut config = Self::default();
        config.merge(options);
        config
    }

    /// Overlay every entry of `options` onto this configuration
    pub fn merge(&mut self, options: &Map<String, Value>) {
        for (key, value) in options {
            self.set(key, value.clone());
        }
    }

    /// Set a single option. Values are not validated: text options take the
    /// value's string form, anything unrecognized is stored as-is.
    pub fn set(&mut self, key: &str, value: Value) {
        let Some(known) = ConfigKey::parse(key) else {
            self.extra.insert(key.to_string(), value);
            return;
        };

        match known {
            ConfigKey::BotName => self.bot_name = value_to_text(&value),
            ConfigKey::PrimaryColor => self.primary_color = value_to_text(&value),
            ConfigKey::WelcomeMessage => self.welcome_message = value_to_text(&value),
            ConfigKey::PlaceholderText => self.placeholder_text = value_to_text(&value),
            ConfigKey::WidgetId => self.widget_id = value_to_text(&value),
            ConfigKey::ApiEndpoint => {
                let endpoint = value_to_text(&value);
                let endpoint = endpoint.trim();
                self.api_endpoint = if endpoint.is_empty() || endpoint == "null" {
                    None
                } else {
                    Some(endpoint.to_string())
                };
            }
            ConfigKey::TypingDelay => {
                if let Some(ms) = value_to_millis(&value) {
                    self.typing_delay_ms = ms;
                }
            }
        }
    }

    /// Read a single option by any accepted spelling
    pub fn get(&self, key: &str) -> Option<Value> {
        let Some(known) = ConfigKey::parse(key) else {
            return self.extra.get(key).cloned();
        };

        Some(match known {
            ConfigKey::BotName => Value::String(self.bot_name.clone()),
            ConfigKey::PrimaryColor => Value::String(self.primary_color.clone()),
            ConfigKey::WelcomeMessage => Value::String(self.welcome_message.clone()),
            ConfigKey::PlaceholderText => Value::String(self.placeholder_text.clone()),
            ConfigKey::WidgetId => Value::String(self.widget_id.clone()),
            ConfigKey::ApiEndpoint => self
                .api_endpoint
                .clone()
                .map_or(Value::Null, Value::String),
            ConfigKey::TypingDelay => Value::from(self.typing_delay_ms),
        })
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn value_to_millis(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.bot_name, "AI Assistant");
        assert_eq!(config.primary_color, "#8559DA");
        assert_eq!(config.api_endpoint, None);
        assert_eq!(config.typing_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_known_keys_override_defaults() {
        let config = WidgetConfig::from_options(&options(json!({
            "botName": "Helper",
            "primaryColor": "#112233",
            "apiEndpoint": "https://example.com/chat",
            "typingDelay": 0
        })));

        assert_eq!(config.bot_name, "Helper");
        assert_eq!(config.primary_color, "#112233");
        assert_eq!(config.api_endpoint.as_deref(), Some("https://example.com/chat"));
        assert_eq!(config.typing_delay_ms, 0);
        assert_eq!(config.welcome_message, DEFAULT_WELCOME_MESSAGE);
    }

    #[test]
    fn test_attribute_spellings_map_to_same_option() {
        for key in ["botName", "bot-name", "bot_name", "botname"] {
            let mut attrs = Map::new();
            attrs.insert(key.to_string(), json!("Zed"));
            let config = WidgetConfig::from_options(&attrs);
            assert_eq!(config.bot_name, "Zed", "key {key}");
            assert!(config.extra.is_empty());
        }
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let config = WidgetConfig::from_options(&options(json!({
            "theme": { "dark": true },
            "locale": "fr"
        })));

        assert_eq!(config.extra.get("locale"), Some(&json!("fr")));
        assert_eq!(config.get("theme"), Some(json!({ "dark": true })));
    }

    #[test]
    fn test_values_are_not_validated() {
        let config = WidgetConfig::from_options(&options(json!({
            "botName": 42,
            "typingDelay": "250",
            "apiEndpoint": ""
        })));

        assert_eq!(config.bot_name, "42");
        assert_eq!(config.typing_delay_ms, 250);
        assert_eq!(config.api_endpoint, None);
    }

    #[test]
    fn test_bad_typing_delay_keeps_previous_value() {
        let mut config = WidgetConfig::default();
        config.set("typingDelay", json!("soon"));
        assert_eq!(config.typing_delay_ms, DEFAULT_TYPING_DELAY_MS);
    }

    #[test]
    fn test_null_endpoint_clears_remote_mode() {
        let mut config = WidgetConfig::default();
        config.set("apiEndpoint", json!("https://example.com"));
        config.set("api-endpoint", Value::Null);
        assert_eq!(config.api_endpoint, None);
        assert_eq!(config.get("apiEndpoint"), Some(Value::Null));
    }

    #[test]
    fn test_serializes_with_camel_case_and_extras() {
        let mut config = WidgetConfig::default();
        config.set("locale", json!("de"));

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["botName"], json!("AI Assistant"));
        assert_eq!(value["typingDelay"], json!(1000));
        assert_eq!(value["locale"], json!("de"));
    }
}
