//! # chatwidget-core
//!
//! Platform-independent logic of the embeddable chat widget:
//!
//! - **Widget controller**: one-time injection, open/close/toggle, the send
//!   pipeline with its typing indicator and minimum reply delay
//! - **Response resolver**: remote endpoint or local canned replies
//! - **Conversation**: session-scoped history, best-effort persistence
//! - **Markup**: structured elements with escaping, scoped stylesheet
//!
//! The page is reached only through the traits in [`platform`]; the wasm
//! crate implements them on top of `web-sys`, and [`platform::memory`]
//! implements them in memory.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use chatwidget_core::platform::{MemoryDocument, MemoryStore, Services};
//! use chatwidget_core::ChatWidget;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let local = tokio::task::LocalSet::new();
//!     local
//!         .run_until(async {
//!             let widget = ChatWidget::new(
//!                 MemoryDocument::new(),
//!                 Services::native(Rc::new(MemoryStore::new())),
//!             );
//!             widget.init(None)?;
//!             widget.open();
//!             widget.send_message(Some("hello"));
//!             tokio::time::sleep(std::time::Duration::from_secs(2)).await;
//!             println!("{:?}", widget.messages());
//!             Ok::<(), anyhow::Error>(())
//!         })
//!         .await
//! }
//! ```

pub mod autoload;
pub mod conversation;
pub mod platform;
pub mod resolver;
pub mod ui;
pub mod widget;

pub use chatwidget_types::{
    Message, Sender, WidgetConfig, WidgetError, CONNECTION_APOLOGY, FALLBACK_REPLY, STORAGE_KEY,
};

pub use autoload::config_from_attributes;
pub use conversation::Conversation;
pub use platform::{Document, EventKind, HttpResponse, HttpTransport, Services, SessionStore, Spawner, Timer};
pub use resolver::{LocalResolver, RemoteResolver, ResponseResolver};
pub use widget::ChatWidget;
