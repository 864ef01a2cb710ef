//! Element trees for the widget chrome, message bubbles and the typing
//! indicator.

use chatwidget_types::{Message, Sender, WidgetConfig};

use super::markup::Element;
use super::styles;

pub const ROOT_CLASS: &str = "ai-chat-widget";
pub const LAUNCHER_CLASS: &str = "toggle-chat";
pub const WINDOW_CLASS: &str = "chat-window";
pub const CLOSE_BUTTON_CLASS: &str = "close-btn";
pub const MESSAGES_CLASS: &str = "chat-messages";
pub const INPUT_CLASS: &str = "chat-input-field";
pub const SEND_BUTTON_CLASS: &str = "send-btn";
pub const TYPING_CLASS: &str = "typing-indicator";
pub const MESSAGE_CLASS: &str = "message";

/// Toggled on both the window and the launcher while the widget is open
pub const ACTIVE_CLASS: &str = "active";

/// `<style>` block for the head
pub fn stylesheet(config: &WidgetConfig) -> Element {
    Element::new("style")
        .attr("data-chat-widget", styles::widget_dom_id(config))
        .text(styles::stylesheet(config))
}

/// Widget root: launcher button plus the (initially hidden) chat window
pub fn widget(config: &WidgetConfig) -> Element {
    Element::new("div")
        .id(styles::widget_dom_id(config))
        .class(ROOT_CLASS)
        .child(launcher())
        .child(window(config))
}

fn launcher() -> Element {
    Element::new("button")
        .class(LAUNCHER_CLASS)
        .attr("type", "button")
        .attr("aria-label", "Open chat")
        .child(Element::new("span").class("open").text("💬"))
        .child(Element::new("span").class("close").text("✕"))
}

fn window(config: &WidgetConfig) -> Element {
    Element::new("div")
        .class(WINDOW_CLASS)
        .child(header(config))
        .child(
            Element::new("div")
                .class(MESSAGES_CLASS)
                .child(message_bubble(&Message::bot(config.welcome_message.clone()))),
        )
        .child(
            Element::new("div")
                .class("chat-input")
                .child(
                    Element::new("input")
                        .class(INPUT_CLASS)
                        .attr("type", "text")
                        .attr("placeholder", config.placeholder_text.clone()),
                )
                .child(
                    Element::new("button")
                        .class(SEND_BUTTON_CLASS)
                        .attr("type", "button")
                        .attr("aria-label", "Send")
                        .text("→"),
                ),
        )
}

fn header(config: &WidgetConfig) -> Element {
    Element::new("div")
        .class("chat-header")
        .child(
            Element::new("div")
                .class("header-title")
                .child(Element::new("div").class("avatar").text("AI"))
                .child(Element::new("h3").text(config.bot_name.clone())),
        )
        .child(
            Element::new("button")
                .class(CLOSE_BUTTON_CLASS)
                .attr("type", "button")
                .attr("aria-label", "Close chat")
                .text("✕"),
        )
}

pub fn message_bubble(message: &Message) -> Element {
    Element::new("div")
        .class(MESSAGE_CLASS)
        .class(message.sender.css_class())
        .attr("data-sender", message.sender.as_str())
        .text(message.text.clone())
}

pub fn typing_indicator() -> Element {
    Element::new("div")
        .class(TYPING_CLASS)
        .attr("data-sender", Sender::Bot.as_str())
        .child(Element::new("span"))
        .child(Element::new("span"))
        .child(Element::new("span"))
}
