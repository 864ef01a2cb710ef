#![allow(dead_code)]

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use chatwidget_core::platform::memory::{MemoryDocument, MemoryNode, MemoryStore};
use chatwidget_core::platform::native::{ReqwestTransport, TokioSpawner, TokioTimer};
use chatwidget_core::platform::{HttpResponse, HttpTransport, Services};
use chatwidget_core::ui::view;
use chatwidget_core::ChatWidget;

/// Run `future` inside a `LocalSet`, which the tokio spawner requires
pub async fn local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn options(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("options must be a JSON object")
}

/// Transport that answers every request with a fixed body after `latency`
pub struct ScriptedTransport {
    status: u16,
    body: String,
    latency: Duration,
    calls: Cell<usize>,
}

impl ScriptedTransport {
    pub fn new(body: &str) -> Rc<Self> {
        Self::with_latency(body, Duration::ZERO)
    }

    pub fn with_latency(body: &str, latency: Duration) -> Rc<Self> {
        Rc::new(Self {
            status: 200,
            body: body.to_string(),
            latency,
            calls: Cell::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl HttpTransport for ScriptedTransport {
    async fn post_json(&self, _url: &str, _body: &Value) -> Result<HttpResponse> {
        self.calls.set(self.calls.get() + 1);
        tokio::time::sleep(self.latency).await;
        Ok(HttpResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

pub fn services(store: &MemoryStore, transport: Rc<dyn HttpTransport>) -> Services {
    Services {
        storage: Rc::new(store.clone()),
        timer: Rc::new(TokioTimer),
        spawner: Rc::new(TokioSpawner),
        transport,
    }
}

/// A widget on a fresh in-memory page
pub struct Harness {
    pub widget: ChatWidget<MemoryDocument>,
    pub document: MemoryDocument,
    pub store: MemoryStore,
    pub transport: Rc<ScriptedTransport>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// New page, same tab storage: models a reload
    pub fn with_store(store: MemoryStore) -> Self {
        Self::with_transport(store, ScriptedTransport::new(r#"{"response":"remote reply"}"#))
    }

    pub fn with_transport(store: MemoryStore, transport: Rc<ScriptedTransport>) -> Self {
        init_logging();
        let document = MemoryDocument::new();
        let widget = ChatWidget::new(document.clone(), services(&store, transport.clone()));
        Self {
            widget,
            document,
            store,
            transport,
        }
    }

    /// A widget talking to a real endpoint through reqwest
    pub fn with_reqwest() -> ChatWidget<MemoryDocument> {
        init_logging();
        let store = MemoryStore::new();
        ChatWidget::new(
            MemoryDocument::new(),
            services(&store, Rc::new(ReqwestTransport::new())),
        )
    }

    pub fn node(&self, class: &str) -> MemoryNode {
        self.document
            .query(class)
            .unwrap_or_else(|| panic!("no .{class} in document"))
    }

    pub fn input(&self) -> MemoryNode {
        self.node(view::INPUT_CLASS)
    }

    pub fn typing_indicators(&self) -> usize {
        self.document.query_all(view::TYPING_CLASS).len()
    }

    pub fn bubbles(&self) -> Vec<(String, String)> {
        bubbles(&self.document)
    }
}

/// `(sender, text)` of every rendered message bubble, in display order
pub fn bubbles(document: &MemoryDocument) -> Vec<(String, String)> {
    document
        .query_all(view::MESSAGE_CLASS)
        .into_iter()
        .map(|node| {
            (
                document.attribute(node, "data-sender").unwrap_or_default(),
                document.text_content(node),
            )
        })
        .collect()
}

/// Poll `condition` on real time until it holds or `timeout` passes
pub async fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
