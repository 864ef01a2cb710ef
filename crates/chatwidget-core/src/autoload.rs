//! Declarative configuration from the embedding `<script>` element.
//!
//! ```html
//! <script src="chat-widget.js" data-autoload data-bot-name="Helper"
//!         data-api-endpoint="/api/chat"></script>
//! ```

use serde_json::{Map, Value};

use chatwidget_types::{ATTRIBUTE_PREFIX, AUTOLOAD_ATTRIBUTE};

/// Build an options object from element attributes.
///
/// Returns `None` unless `data-autoload` is present and not `"false"`. Every
/// other `data-*` attribute becomes an option named after the attribute
/// without its prefix, with the attribute value as a string.
pub fn config_from_attributes<I, K, V>(attributes: I) -> Option<Map<String, Value>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut autoload = false;
    let mut options = Map::new();

    for (name, value) in attributes {
        let name = name.as_ref().to_ascii_lowercase();
        if name == AUTOLOAD_ATTRIBUTE {
            autoload = value.as_ref() != "false";
            continue;
        }
        if let Some(key) = name.strip_prefix(ATTRIBUTE_PREFIX) {
            options.insert(key.to_string(), Value::String(value.as_ref().to_string()));
        }
    }

    autoload.then_some(options)
}

/// Whether initialization has to wait for `DOMContentLoaded`
pub fn should_defer(ready_state: &str) -> bool {
    ready_state == "loading"
}
