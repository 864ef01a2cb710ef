//! Platform seams between the widget controller and its host.
//!
//! The controller only talks to the page through these traits, so the same
//! logic runs against the browser DOM (see the wasm crate), the in-memory
//! document used by tests, or anything else that can provide them.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use serde_json::Value;
use std::rc::Rc;
use std::time::Duration;

use crate::ui::markup::Element;

pub mod memory;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;

pub use memory::{MemoryDocument, MemoryNode, MemoryStore};

/// UI events the widget listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    /// Enter pressed while the element has focus
    EnterKey,
}

/// DOM operations used by the widget, over an opaque node handle.
pub trait Document {
    type Node: Clone + 'static;

    fn head(&self) -> chatwidget_types::Result<Self::Node>;

    fn body(&self) -> chatwidget_types::Result<Self::Node>;

    /// Build a detached subtree from a structured element description.
    /// Text is always inserted as text, never parsed as markup.
    fn create(&self, element: &Element) -> chatwidget_types::Result<Self::Node>;

    fn append_child(&self, parent: &Self::Node, child: &Self::Node) -> chatwidget_types::Result<()>;

    /// Detach a node from its parent; no-op if already detached
    fn remove(&self, node: &Self::Node);

    fn clear_children(&self, node: &Self::Node);

    /// First descendant of `root` (excluding `root`) carrying `class`
    fn find_by_class(&self, root: &Self::Node, class: &str) -> Option<Self::Node>;

    fn set_class(&self, node: &Self::Node, class: &str, enabled: bool);

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn focus(&self, node: &Self::Node);

    /// Current value of an input element
    fn value(&self, input: &Self::Node) -> String;

    fn set_value(&self, input: &Self::Node, value: &str);

    fn scroll_to_bottom(&self, node: &Self::Node);

    fn listen(
        &self,
        node: &Self::Node,
        event: EventKind,
        handler: Box<dyn FnMut()>,
    ) -> chatwidget_types::Result<()>;
}

/// Tab-scoped key/value storage (`sessionStorage` in the browser)
pub trait SessionStore {
    fn get_item(&self, key: &str) -> chatwidget_types::Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> chatwidget_types::Result<()>;
}

/// Source of delays. The returned future starts counting when created.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Runs fire-and-forget tasks on the current (single) thread
pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Raw HTTP response as seen by the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP used in remote mode
#[async_trait(?Send)]
pub trait HttpTransport {
    /// POST `body` as JSON to `url`. Errors only for transport failures;
    /// non-2xx statuses are returned as responses.
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse>;
}

/// Everything besides the document that a widget instance needs
#[derive(Clone)]
pub struct Services {
    pub storage: Rc<dyn SessionStore>,
    pub timer: Rc<dyn Timer>,
    pub spawner: Rc<dyn Spawner>,
    pub transport: Rc<dyn HttpTransport>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
