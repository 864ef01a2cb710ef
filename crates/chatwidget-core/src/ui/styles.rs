//! Stylesheet injected once per widget instance.
//!
//! Every rule is scoped to the widget root id so two widgets on one page do
//! not restyle each other.

use chatwidget_types::config::{DEFAULT_PRIMARY_COLOR, DEFAULT_WIDGET_ID};
use chatwidget_types::WidgetConfig;

const TEMPLATE: &str = r#"
$SCOPE {
  position: fixed;
  bottom: 20px;
  right: 20px;
  z-index: 9999;
  display: flex;
  flex-direction: column-reverse;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
}
$SCOPE .chat-window {
  width: 360px;
  height: 500px;
  background: #fff;
  border-radius: 12px;
  box-shadow: 0 5px 15px rgba(0,0,0,0.1);
  display: flex;
  flex-direction: column;
  overflow: hidden;
  margin-bottom: 16px;
  transition: all 0.3s ease;
  opacity: 0;
  transform: translateY(20px);
  pointer-events: none;
}
$SCOPE .chat-window.active {
  opacity: 1;
  transform: translateY(0);
  pointer-events: all;
}
$SCOPE .chat-header {
  background-color: $PRIMARY;
  color: white;
  padding: 16px 20px;
  display: flex;
  justify-content: space-between;
  align-items: center;
}
$SCOPE .header-title {
  display: flex;
  align-items: center;
  gap: 12px;
}
$SCOPE .header-title h3 {
  font-size: 16px;
  font-weight: 600;
  margin: 0;
}
$SCOPE .avatar {
  width: 32px;
  height: 32px;
  background: rgba(255, 255, 255, 0.2);
  border-radius: 50%;
  display: flex;
  align-items: center;
  justify-content: center;
  color: white;
  font-weight: 600;
}
$SCOPE .close-btn {
  background: none;
  border: none;
  color: white;
  font-size: 20px;
  cursor: pointer;
}
$SCOPE .chat-messages {
  flex: 1;
  padding: 16px;
  overflow-y: auto;
  display: flex;
  flex-direction: column;
  gap: 16px;
}
$SCOPE .message {
  max-width: 80%;
  padding: 12px 16px;
  border-radius: 16px;
  position: relative;
  line-height: 1.5;
  font-size: 14px;
}
$SCOPE .bot-message {
  background: #f0f0f0;
  color: #333;
  align-self: flex-start;
  border-bottom-left-radius: 4px;
}
$SCOPE .user-message {
  background: $PRIMARY;
  color: white;
  align-self: flex-end;
  border-bottom-right-radius: 4px;
}
$SCOPE .chat-input {
  padding: 12px 16px;
  border-top: 1px solid #eee;
  display: flex;
  background: #f9f9f9;
}
$SCOPE .chat-input input {
  flex: 1;
  padding: 10px 16px;
  border: 1px solid #ddd;
  border-radius: 24px;
  outline: none;
  font-size: 14px;
}
$SCOPE .send-btn {
  width: 36px;
  height: 36px;
  background: $PRIMARY;
  color: white;
  border: none;
  border-radius: 50%;
  margin-left: 8px;
  cursor: pointer;
  display: flex;
  align-items: center;
  justify-content: center;
}
$SCOPE .toggle-chat {
  width: 60px;
  height: 60px;
  background: $PRIMARY;
  border-radius: 50%;
  box-shadow: 0 5px 15px rgba(0,0,0,0.1);
  color: white;
  border: none;
  font-size: 24px;
  cursor: pointer;
  align-self: flex-end;
  display: flex;
  align-items: center;
  justify-content: center;
  transition: transform 0.3s ease;
}
$SCOPE .toggle-chat:hover {
  transform: scale(1.05);
}
$SCOPE .toggle-chat .close {
  display: none;
}
$SCOPE .toggle-chat.active .open {
  display: none;
}
$SCOPE .toggle-chat.active .close {
  display: block;
}
$SCOPE .typing-indicator {
  display: flex;
  align-items: center;
  gap: 4px;
  padding: 6px 12px;
  background: #f0f0f0;
  border-radius: 16px;
  align-self: flex-start;
  margin-top: 8px;
  width: fit-content;
}
$SCOPE .typing-indicator span {
  width: 8px;
  height: 8px;
  background: #888;
  border-radius: 50%;
  display: block;
  animation: ai-chat-typing 1.4s infinite both;
}
$SCOPE .typing-indicator span:nth-child(2) {
  animation-delay: 0.2s;
}
$SCOPE .typing-indicator span:nth-child(3) {
  animation-delay: 0.4s;
}
@keyframes ai-chat-typing {
  0% { transform: translateY(0); }
  50% { transform: translateY(-5px); }
  100% { transform: translateY(0); }
}
"#;

/// CSS for one widget instance
pub fn stylesheet(config: &WidgetConfig) -> String {
    TEMPLATE
        .replace("$SCOPE", &format!("#{}", widget_dom_id(config)))
        .replace("$PRIMARY", safe_color(&config.primary_color))
}

/// Root element id. Anything that is not a plain identifier falls back to
/// the default so it can be used verbatim in selectors.
pub fn widget_dom_id(config: &WidgetConfig) -> &str {
    let id = config.widget_id.as_str();
    let valid = id
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        id
    } else {
        DEFAULT_WIDGET_ID
    }
}

/// Accepts `#hex`, named colours and `rgb()/rgba()/hsl()/hsla()` forms;
/// anything else could break out of the declaration and is replaced by the
/// default colour.
pub fn safe_color(color: &str) -> &str {
    let color = color.trim();

    let is_hex = color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()));

    let is_name = !color.is_empty() && color.chars().all(|c| c.is_ascii_alphabetic());

    let is_function = ["rgb(", "rgba(", "hsl(", "hsla("]
        .iter()
        .any(|prefix| color.to_ascii_lowercase().starts_with(prefix))
        && color.ends_with(')')
        && color[..color.len() - 1]
            .chars()
            .skip_while(|c| *c != '(')
            .skip(1)
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | ',' | '.' | '%' | '/'));

    if is_hex || is_name || is_function {
        color
    } else {
        log::warn!("Ignoring unsafe primary colour {:?}", color);
        DEFAULT_PRIMARY_COLOR
    }
}
