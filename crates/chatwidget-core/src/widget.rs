//! The widget controller: injection, event wiring, visibility and the
//! send/reply lifecycle.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};

use chatwidget_types::{Message, Result, WidgetConfig, WidgetError};

use crate::conversation::Conversation;
use crate::platform::{Document, EventKind, Services};
use crate::resolver;
use crate::ui::{styles, view};

/// Nodes the controller needs after mounting
#[derive(Clone)]
struct Mounted<N> {
    launcher: N,
    window: N,
    close_button: N,
    send_button: N,
    input: N,
    messages: N,
}

struct Inner<D: Document> {
    document: D,
    services: Services,
    config: RefCell<WidgetConfig>,
    initialized: Cell<bool>,
    mounted: RefCell<Option<Mounted<D::Node>>>,
    conversation: Conversation,
}

/// A chat widget instance. Cloning yields another handle to the same widget.
pub struct ChatWidget<D: Document + 'static> {
    inner: Rc<Inner<D>>,
}

impl<D: Document + 'static> Clone for ChatWidget<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<D: Document + 'static> std::fmt::Debug for ChatWidget<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("config", &self.inner.config.borrow())
            .field("initialized", &self.inner.initialized.get())
            .field("conversation", &self.inner.conversation)
            .finish()
    }
}

impl<D: Document + 'static> ChatWidget<D> {
    /// Create an uninitialized widget bound to a document and its services
    pub fn new(document: D, services: Services) -> Self {
        let conversation = Conversation::new(Rc::clone(&services.storage));
        Self {
            inner: Rc::new(Inner {
                document,
                services,
                config: RefCell::new(WidgetConfig::default()),
                initialized: Cell::new(false),
                mounted: RefCell::new(None),
                conversation,
            }),
        }
    }

    fn from_weak(weak: &Weak<Inner<D>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn document(&self) -> &D {
        &self.inner.document
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.initialized.get()
    }

    pub fn config(&self) -> WidgetConfig {
        self.inner.config.borrow().clone()
    }

    /// Overwrite one option. After `init` only options read per message
    /// (`apiEndpoint`, `typingDelay`) take visible effect.
    pub fn set_option(&self, key: &str, value: Value) {
        self.inner.config.borrow_mut().set(key, value);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.conversation.messages()
    }

    fn mounted(&self) -> Option<Mounted<D::Node>> {
        self.inner.mounted.borrow().clone()
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Merge `options` over the defaults, inject the stylesheet and the
    /// widget, wire events and replay the stored conversation. Calling it
    /// again once initialized does nothing.
    pub fn init(&self, options: Option<&Map<String, Value>>) -> Result<()> {
        if self.is_initialized() {
            log::debug!("Chat widget already initialized, ignoring init");
            return Ok(());
        }

        // Merged into a copy; stored only once the widget is on the page
        let mut config = self.config();
        if let Some(options) = options {
            config.merge(options);
        }
        if styles::widget_dom_id(&config) != config.widget_id {
            log::warn!("Ignoring unusable widget id {:?}", config.widget_id);
        }
        let document = &self.inner.document;

        let head = document.head()?;
        let body = document.body()?;
        let style = document.create(&view::stylesheet(&config))?;
        let root = document.create(&view::widget(&config))?;

        let find = |class: &str| {
            document
                .find_by_class(&root, class)
                .ok_or_else(|| WidgetError::Dom(format!("widget is missing .{}", class)))
        };
        let mounted = Mounted {
            launcher: find(view::LAUNCHER_CLASS)?,
            window: find(view::WINDOW_CLASS)?,
            close_button: find(view::CLOSE_BUTTON_CLASS)?,
            send_button: find(view::SEND_BUTTON_CLASS)?,
            input: find(view::INPUT_CLASS)?,
            messages: find(view::MESSAGES_CLASS)?,
        };

        // Listeners go on while the subtree is still detached, so a failure
        // leaves the page untouched and `init` can be retried.
        self.wire_events(&mounted)?;

        document.append_child(&head, &style)?;
        if let Err(e) = document.append_child(&body, &root) {
            document.remove(&style);
            return Err(e);
        }

        *self.inner.config.borrow_mut() = config.clone();
        *self.inner.mounted.borrow_mut() = Some(mounted.clone());
        self.inner.initialized.set(true);

        self.restore_history(&mounted);

        log::info!(
            "Chat widget '{}' initialized ({} mode)",
            config.widget_id,
            if config.api_endpoint.is_some() { "remote" } else { "local" }
        );
        Ok(())
    }

    fn wire_events(&self, ui: &Mounted<D::Node>) -> Result<()> {
        let document = &self.inner.document;

        let weak = Rc::downgrade(&self.inner);
        document.listen(
            &ui.launcher,
            EventKind::Click,
            Box::new(move || {
                if let Some(widget) = Self::from_weak(&weak) {
                    widget.toggle();
                }
            }),
        )?;

        let weak = Rc::downgrade(&self.inner);
        document.listen(
            &ui.close_button,
            EventKind::Click,
            Box::new(move || {
                if let Some(widget) = Self::from_weak(&weak) {
                    widget.close();
                }
            }),
        )?;

        for (node, event) in [(&ui.send_button, EventKind::Click), (&ui.input, EventKind::EnterKey)] {
            let weak = Rc::downgrade(&self.inner);
            document.listen(
                node,
                event,
                Box::new(move || {
                    if let Some(widget) = Self::from_weak(&weak) {
                        widget.send_message(None);
                    }
                }),
            )?;
        }

        Ok(())
    }

    /// Stored history replaces the welcome message. Replayed messages are
    /// rendered only; they are already in storage.
    fn restore_history(&self, ui: &Mounted<D::Node>) {
        let history = self.inner.conversation.restore();
        if history.is_empty() {
            return;
        }

        log::debug!("Restoring {} chat messages", history.len());
        self.inner.document.clear_children(&ui.messages);
        for message in &history {
            self.render_message(ui, message);
        }
    }

    // ========================================================================
    // Visibility
    // ========================================================================

    pub fn is_open(&self) -> bool {
        self.mounted()
            .is_some_and(|ui| self.inner.document.has_class(&ui.window, view::ACTIVE_CLASS))
    }

    pub fn open(&self) {
        self.set_open(true);
    }

    pub fn close(&self) {
        self.set_open(false);
    }

    pub fn toggle(&self) {
        self.set_open(!self.is_open());
    }

    fn set_open(&self, open: bool) {
        let Some(ui) = self.mounted() else {
            log::warn!("Chat widget is not initialized");
            return;
        };

        let document = &self.inner.document;
        document.set_class(&ui.window, view::ACTIVE_CLASS, open);
        document.set_class(&ui.launcher, view::ACTIVE_CLASS, open);
        if open {
            document.focus(&ui.input);
        }
    }

    // ========================================================================
    // Messages
    // ========================================================================

    /// Send `text`, or the current input value when `None`.
    ///
    /// Returns `false` without side effects when the trimmed text is empty.
    /// Otherwise the user message is shown at once and the bot reply follows
    /// once the resolver is done and the typing delay has passed, whichever
    /// is later. Sends do not wait for each other.
    pub fn send_message(&self, text: Option<&str>) -> bool {
        let Some(ui) = self.mounted() else {
            log::warn!("Chat widget is not initialized");
            return false;
        };
        let document = &self.inner.document;

        // An empty call leaves the input untouched
        let text = match text {
            Some(text) => text.trim().to_string(),
            None => document.value(&ui.input).trim().to_string(),
        };
        if text.is_empty() {
            return false;
        }

        self.add_message(&ui, Message::user(text.clone()));
        document.set_value(&ui.input, "");

        let indicator = self.show_typing_indicator(&ui);

        let config = self.config();
        let resolver = resolver::for_config(&config, Rc::clone(&self.inner.services.transport));
        let delay = self.inner.services.timer.sleep(config.typing_delay());
        let weak = Rc::downgrade(&self.inner);

        self.inner.services.spawner.spawn(Box::pin(async move {
            let (reply, ()) = futures::join!(resolver.resolve(&text), delay);

            let Some(widget) = Self::from_weak(&weak) else {
                return;
            };
            if let Some(indicator) = indicator {
                widget.inner.document.remove(&indicator);
            }
            widget.add_message(&ui, Message::bot(reply));
        }));

        true
    }

    fn show_typing_indicator(&self, ui: &Mounted<D::Node>) -> Option<D::Node> {
        let document = &self.inner.document;
        let shown = document
            .create(&view::typing_indicator())
            .and_then(|node| document.append_child(&ui.messages, &node).map(|()| node));

        match shown {
            Ok(node) => {
                document.scroll_to_bottom(&ui.messages);
                Some(node)
            }
            Err(e) => {
                log::warn!("Failed to show typing indicator: {}", e);
                None
            }
        }
    }

    fn add_message(&self, ui: &Mounted<D::Node>, message: Message) {
        self.render_message(ui, &message);
        self.inner.conversation.record(message);
    }

    fn render_message(&self, ui: &Mounted<D::Node>, message: &Message) {
        let document = &self.inner.document;
        let rendered = document
            .create(&view::message_bubble(message))
            .and_then(|node| document.append_child(&ui.messages, &node));

        if let Err(e) = rendered {
            log::warn!("Failed to render chat message: {}", e);
        }
        document.scroll_to_bottom(&ui.messages);
    }
}
