mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::sleep;

use chatwidget_core::platform::MemoryStore;
use chatwidget_core::resolver::{GENERIC_REPLY, GREETING_REPLY, HELP_REPLY, THANKS_REPLY};
use chatwidget_core::{Document, Sender};
use common::{local, options, Harness, ScriptedTransport};

fn pair(sender: &str, text: &str) -> (String, String) {
    (sender.to_string(), text.to_string())
}

#[tokio::test(start_paused = true)]
async fn test_reply_waits_for_typing_delay() {
    local(async {
        let h = Harness::new();
        h.widget.init(None).unwrap();

        assert!(h.widget.send_message(Some("Hello there")));
        assert_eq!(h.typing_indicators(), 1);
        assert_eq!(h.widget.messages().len(), 1);

        sleep(Duration::from_millis(999)).await;
        assert_eq!(h.typing_indicators(), 1);
        assert_eq!(h.widget.messages().len(), 1);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(h.typing_indicators(), 0);
        assert_eq!(
            h.bubbles()[1..].to_vec(),
            vec![pair("user", "Hello there"), pair("bot", GREETING_REPLY)]
        );
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_slow_resolver_is_not_delayed_further() {
    local(async {
        let transport = ScriptedTransport::with_latency(r#"{"response":"late"}"#, Duration::from_secs(3));
        let h = Harness::with_transport(MemoryStore::new(), transport);
        h.widget
            .init(Some(&options(json!({ "apiEndpoint": "https://bot.example/chat" }))))
            .unwrap();

        h.widget.send_message(Some("anyone there?"));

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(h.typing_indicators(), 1);
        assert_eq!(h.widget.messages().len(), 1);

        sleep(Duration::from_millis(1501)).await;
        assert_eq!(h.typing_indicators(), 0);
        assert_eq!(h.widget.messages()[1].text, "late");
        assert_eq!(h.transport.calls(), 1);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_configured_delay_is_used() {
    local(async {
        let h = Harness::new();
        h.widget.init(Some(&options(json!({ "typingDelay": 250 })))).unwrap();

        h.widget.send_message(Some("thanks a lot"));
        sleep(Duration::from_millis(249)).await;
        assert_eq!(h.widget.messages().len(), 1);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(h.widget.messages()[1].text, THANKS_REPLY);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_zero_delay_replies_on_next_tick() {
    local(async {
        let h = Harness::new();
        h.widget.init(Some(&options(json!({ "typingDelay": 0 })))).unwrap();

        h.widget.send_message(Some("I need help"));
        sleep(Duration::from_millis(1)).await;

        let messages = h.widget.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].text, HELP_REPLY);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_sends_each_get_their_reply() {
    local(async {
        let h = Harness::new();
        h.widget.init(None).unwrap();

        h.widget.send_message(Some("hello"));
        sleep(Duration::from_millis(500)).await;
        h.widget.send_message(Some("thank you"));
        assert_eq!(h.typing_indicators(), 2);

        sleep(Duration::from_millis(501)).await;
        assert_eq!(h.typing_indicators(), 1);
        assert_eq!(h.widget.messages().len(), 3);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(h.typing_indicators(), 0);
        assert_eq!(
            h.bubbles()[1..].to_vec(),
            vec![
                pair("user", "hello"),
                pair("user", "thank you"),
                pair("bot", GREETING_REPLY),
                pair("bot", THANKS_REPLY),
            ]
        );
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_empty_input_is_ignored() {
    local(async {
        let transport = ScriptedTransport::new(r#"{"response":"unused"}"#);
        let h = Harness::with_transport(MemoryStore::new(), transport);
        h.widget
            .init(Some(&options(json!({ "apiEndpoint": "https://bot.example/chat" }))))
            .unwrap();

        assert!(!h.widget.send_message(Some("")));
        assert!(!h.widget.send_message(Some("   \t\n")));
        h.document.type_text(h.input(), "    ");
        assert!(!h.widget.send_message(None));

        sleep(Duration::from_secs(5)).await;
        assert!(h.widget.messages().is_empty());
        assert_eq!(h.typing_indicators(), 0);
        assert_eq!(h.transport.calls(), 0);
        assert_eq!(h.store.raw(chatwidget_core::STORAGE_KEY), None);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_empty_text_keeps_unsent_draft() {
    local(async {
        let h = Harness::new();
        h.widget.init(None).unwrap();

        h.document.type_text(h.input(), "half-typed draft");
        assert!(!h.widget.send_message(Some("")));
        assert!(!h.widget.send_message(Some("  \t ")));
        assert_eq!(h.document.value(&h.input()), "half-typed draft");
        assert!(h.widget.messages().is_empty());
        assert_eq!(h.typing_indicators(), 0);

        assert!(h.widget.send_message(None));
        assert_eq!(h.document.value(&h.input()), "");
        assert_eq!(h.widget.messages()[0].text, "half-typed draft");
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_input_is_trimmed_and_cleared() {
    local(async {
        let h = Harness::new();
        h.widget.init(None).unwrap();

        h.document.type_text(h.input(), "   what is this   ");
        assert!(h.widget.send_message(None));
        assert_eq!(h.document.value(&h.input()), "");
        assert_eq!(h.widget.messages()[0].text, "what is this");

        sleep(Duration::from_millis(1001)).await;
        assert_eq!(h.widget.messages()[1].text, GENERIC_REPLY);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_send_button_and_enter_key_send_input() {
    local(async {
        let h = Harness::new();
        h.widget.init(Some(&options(json!({ "typingDelay": 0 })))).unwrap();

        h.document.type_text(h.input(), "hi, I need help");
        h.document.press_enter(h.input());
        assert_eq!(h.widget.messages().len(), 1);

        h.document.click(h.node(chatwidget_core::ui::view::SEND_BUTTON_CLASS));
        assert_eq!(h.widget.messages().len(), 1);

        h.document.type_text(h.input(), "thanks");
        h.document.click(h.node(chatwidget_core::ui::view::SEND_BUTTON_CLASS));

        sleep(Duration::from_millis(10)).await;
        let texts: Vec<String> = h.widget.messages().into_iter().map(|m| m.text).collect();
        assert_eq!(texts.len(), 4);
        assert_eq!(texts[..2].to_vec(), vec!["hi, I need help", "thanks"]);
        // both replies are due at the same instant
        assert!(texts[2..].contains(&GREETING_REPLY.to_string()));
        assert!(texts[2..].contains(&THANKS_REPLY.to_string()));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_messages_scroll_into_view() {
    local(async {
        let h = Harness::new();
        h.widget.init(None).unwrap();
        let messages = h.node(chatwidget_core::ui::view::MESSAGES_CLASS);
        let before = h.document.scroll_requests(messages);

        h.widget.send_message(Some("hello"));
        sleep(Duration::from_secs(2)).await;

        // user message, indicator, bot reply
        assert_eq!(h.document.scroll_requests(messages) - before, 3);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_endpoint_change_after_init_applies_to_next_send() {
    local(async {
        let h = Harness::new();
        h.widget.init(Some(&options(json!({ "typingDelay": 0 })))).unwrap();

        h.widget.send_message(Some("hello"));
        sleep(Duration::from_millis(1)).await;
        assert_eq!(h.transport.calls(), 0);

        h.widget.set_option("apiEndpoint", json!("https://bot.example/chat"));
        h.widget.send_message(Some("hello again"));
        sleep(Duration::from_millis(1)).await;

        assert_eq!(h.transport.calls(), 1);
        assert_eq!(h.widget.messages()[3].text, "remote reply");
    })
    .await;
}
