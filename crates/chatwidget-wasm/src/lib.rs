use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

mod dom;
mod platform;
mod storage;
mod widget;

pub use dom::WebDocument;
pub use platform::{browser_services, BrowserSpawner, GlooTimer, GlooTransport};
pub use storage::BrowserSessionStore;
pub use widget::{autoload, create_widget, WebChatWidget};

/// Set up panic hook and logging once the module is loaded
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();

    wasm_logger::init(wasm_logger::Config::default());

    log::info!("Chat widget WASM loaded");
}

/// Get the window object
fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("No window object"))
}

/// Get the document object
fn document() -> Result<Document, JsValue> {
    window()?
        .document()
        .ok_or_else(|| JsValue::from_str("No document object"))
}
