//! The `ChatWidget` class as seen from JavaScript.

use serde::Serialize;
use serde_json::{Map, Value};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use chatwidget_core::autoload::should_defer;
use chatwidget_core::{config_from_attributes, ChatWidget};

use crate::dom::WebDocument;
use crate::platform::browser_services;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// JS value to JSON via `JSON.stringify`; `undefined` and `null` become `None`
fn to_json(value: &JsValue) -> Result<Option<Value>, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    let text: String = js_sys::JSON::stringify(value)?.into();
    serde_json::from_str(&text).map(Some).map_err(js_error)
}

fn to_js(value: &impl Serialize) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(js_error)?;
    js_sys::JSON::parse(&text)
}

#[wasm_bindgen(js_name = ChatWidget)]
#[derive(Clone)]
pub struct WebChatWidget {
    widget: ChatWidget<WebDocument>,
}

#[wasm_bindgen(js_class = ChatWidget)]
impl WebChatWidget {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebChatWidget, JsValue> {
        Ok(Self {
            widget: ChatWidget::new(WebDocument::current()?, browser_services()),
        })
    }

    /// Inject the widget into the page. Only the first call has any effect.
    pub fn init(&self, config: JsValue) -> Result<(), JsValue> {
        let options = match to_json(&config)? {
            None => None,
            Some(Value::Object(map)) => Some(map),
            Some(other) => {
                log::warn!("Ignoring non-object widget config: {}", other);
                None
            }
        };
        self.widget.init(options.as_ref()).map_err(js_error)
    }

    pub fn open(&self) {
        self.widget.open();
    }

    pub fn close(&self) {
        self.widget.close();
    }

    pub fn toggle(&self) {
        self.widget.toggle();
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.widget.is_open()
    }

    /// Send `text`, or the input field's contents when omitted. Returns
    /// whether anything was sent.
    #[wasm_bindgen(js_name = sendMessage)]
    pub fn send_message(&self, text: Option<String>) -> bool {
        self.widget.send_message(text.as_deref())
    }

    #[wasm_bindgen(getter)]
    pub fn initialized(&self) -> bool {
        self.widget.is_initialized()
    }

    pub fn config(&self) -> Result<JsValue, JsValue> {
        to_js(&self.widget.config())
    }

    #[wasm_bindgen(js_name = setOption)]
    pub fn set_option(&self, key: &str, value: JsValue) -> Result<(), JsValue> {
        let value = to_json(&value)?.unwrap_or(Value::Null);
        self.widget.set_option(key, value);
        Ok(())
    }

    pub fn messages(&self) -> Result<JsValue, JsValue> {
        to_js(&self.widget.messages())
    }
}

/// Factory for independent widget instances
#[wasm_bindgen(js_name = createWidget)]
pub fn create_widget() -> Result<WebChatWidget, JsValue> {
    WebChatWidget::new()
}

fn attributes(element: &web_sys::Element) -> Vec<(String, String)> {
    element
        .get_attribute_names()
        .iter()
        .filter_map(|name| name.as_string())
        .filter_map(|name| {
            let value = element.get_attribute(&name)?;
            Some((name, value))
        })
        .collect()
}

fn init_logged(widget: &WebChatWidget, options: &Map<String, Value>) {
    if let Err(e) = widget.widget.init(Some(options)) {
        log::error!("Chat widget autoload failed: {}", e);
    }
}

/// Initialize a widget from the `data-*` attributes of the embedding script
/// element (pass `document.currentScript`). Does nothing unless the element
/// carries `data-autoload`.
#[wasm_bindgen]
pub fn autoload(script: web_sys::Element) -> Result<Option<WebChatWidget>, JsValue> {
    let Some(options) = config_from_attributes(attributes(&script)) else {
        return Ok(None);
    };

    let widget = WebChatWidget::new()?;
    let document = widget.widget.document().inner().clone();

    if should_defer(&document.ready_state()) {
        log::debug!("Document still loading; deferring widget init");
        let deferred = widget.clone();
        let closure = Closure::once(move || init_logged(&deferred, &options));
        document.add_event_listener_with_callback(
            "DOMContentLoaded",
            closure.as_ref().unchecked_ref(),
        )?;
        closure.forget();
    } else {
        init_logged(&widget, &options);
    }

    Ok(Some(widget))
}
