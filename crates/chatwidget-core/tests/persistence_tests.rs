mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::sleep;

use chatwidget_core::platform::MemoryStore;
use chatwidget_core::resolver::{GREETING_REPLY, HELP_REPLY};
use chatwidget_core::{Message, Sender, STORAGE_KEY};
use common::{local, options, Harness};

fn stored(store: &MemoryStore) -> Vec<Message> {
    serde_json::from_str(&store.raw(STORAGE_KEY).expect("nothing stored")).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_every_message_is_persisted_in_order() {
    local(async {
        let h = Harness::new();
        h.widget.init(None).unwrap();

        h.widget.send_message(Some("hello"));
        assert_eq!(stored(&h.store).len(), 1);

        sleep(Duration::from_millis(1001)).await;
        h.widget.send_message(Some("help me"));
        sleep(Duration::from_millis(1001)).await;

        let entries: Vec<(Sender, String)> = stored(&h.store)
            .into_iter()
            .map(|m| (m.sender, m.text))
            .collect();
        assert_eq!(
            entries,
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::Bot, GREETING_REPLY.to_string()),
                (Sender::User, "help me".to_string()),
                (Sender::Bot, HELP_REPLY.to_string()),
            ]
        );
        assert_eq!(stored(&h.store), h.widget.messages());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_reload_replays_history_instead_of_welcome() {
    local(async {
        let store = MemoryStore::new();
        {
            let first = Harness::with_store(store.clone());
            first.widget.init(Some(&options(json!({ "typingDelay": 0 })))).unwrap();
            first.widget.send_message(Some("hello"));
            first.widget.send_message(Some("help"));
            sleep(Duration::from_millis(5)).await;
            assert_eq!(stored(&store).len(), 4);
        }

        let reloaded = Harness::with_store(store.clone());
        reloaded.widget.init(None).unwrap();

        let expected: Vec<(String, String)> = stored(&store)
            .into_iter()
            .map(|m| (m.sender.as_str().to_string(), m.text))
            .collect();
        assert_eq!(reloaded.bubbles(), expected);
        assert!(!reloaded
            .bubbles()
            .iter()
            .any(|(_, text)| text == "Hi there! How can I help you today?"));

        // replay must not write the history a second time
        assert_eq!(stored(&store).len(), 4);
        assert_eq!(reloaded.widget.messages().len(), 4);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_new_messages_after_reload_extend_history() {
    local(async {
        let store = MemoryStore::new();
        store.insert_raw(
            STORAGE_KEY,
            &serde_json::to_string(&vec![Message::user("earlier")]).unwrap(),
        );

        let h = Harness::with_store(store.clone());
        h.widget.init(Some(&options(json!({ "typingDelay": 0 })))).unwrap();
        h.widget.send_message(Some("hello"));
        sleep(Duration::from_millis(5)).await;

        let texts: Vec<String> = stored(&store).into_iter().map(|m| m.text).collect();
        assert_eq!(texts, vec!["earlier", "hello", GREETING_REPLY]);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_history_shows_welcome() {
    local(async {
        let store = MemoryStore::new();
        store.insert_raw(STORAGE_KEY, "[{\"text\": 1}");

        let h = Harness::with_store(store);
        h.widget.init(None).unwrap();
        assert_eq!(
            h.bubbles(),
            vec![("bot".to_string(), "Hi there! How can I help you today?".to_string())]
        );
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_storage_failure_does_not_break_chat() {
    local(async {
        let h = Harness::new();
        h.store.reject_writes(true);
        h.widget.init(None).unwrap();

        assert!(h.widget.send_message(Some("hello")));
        sleep(Duration::from_millis(1001)).await;

        assert_eq!(h.bubbles().len(), 3);
        assert_eq!(h.widget.messages()[1].text, GREETING_REPLY);
        assert_eq!(h.store.raw(STORAGE_KEY), None);
    })
    .await;
}
