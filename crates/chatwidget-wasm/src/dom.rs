use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlElement, HtmlInputElement, KeyboardEvent};

use chatwidget_core::ui::{Element as Markup, Node as MarkupNode};
use chatwidget_core::{Document, EventKind};
use chatwidget_types::{Result, WidgetError};

fn dom_error(e: JsValue) -> WidgetError {
    WidgetError::Dom(format!("{:?}", e))
}

/// The page's `document`, driven through web-sys
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: web_sys::Document,
}

impl WebDocument {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    pub fn current() -> std::result::Result<Self, JsValue> {
        Ok(Self::new(crate::document()?))
    }

    pub fn ready_state(&self) -> String {
        self.document.ready_state()
    }

    pub fn inner(&self) -> &web_sys::Document {
        &self.document
    }

    fn build(&self, markup: &Markup) -> std::result::Result<Element, JsValue> {
        let element = self.document.create_element(&markup.tag)?;
        if let Some(id) = &markup.id {
            element.set_id(id);
        }
        if !markup.classes.is_empty() {
            element.set_class_name(&markup.classes.join(" "));
        }
        for (name, value) in &markup.attributes {
            element.set_attribute(name, value)?;
        }
        for child in &markup.children {
            match child {
                MarkupNode::Element(child) => {
                    element.append_child(&self.build(child)?)?;
                }
                // Text nodes, never innerHTML
                MarkupNode::Text(text) => {
                    element.append_child(&self.document.create_text_node(text))?;
                }
            }
        }
        Ok(element)
    }
}

impl Document for WebDocument {
    type Node = Element;

    fn head(&self) -> Result<Element> {
        self.document
            .head()
            .map(Element::from)
            .ok_or_else(|| WidgetError::Dom("No head element".to_string()))
    }

    fn body(&self) -> Result<Element> {
        self.document
            .body()
            .map(Element::from)
            .ok_or_else(|| WidgetError::Dom("No body element".to_string()))
    }

    fn create(&self, element: &Markup) -> Result<Element> {
        self.build(element).map_err(dom_error)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<()> {
        parent.append_child(child).map(|_| ()).map_err(dom_error)
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn clear_children(&self, node: &Element) {
        node.set_inner_html("");
    }

    fn find_by_class(&self, root: &Element, class: &str) -> Option<Element> {
        root.query_selector(&format!(".{}", class)).ok().flatten()
    }

    fn set_class(&self, node: &Element, class: &str, enabled: bool) {
        let classes = node.class_list();
        let result = if enabled {
            classes.add_1(class)
        } else {
            classes.remove_1(class)
        };
        if let Err(e) = result {
            log::warn!("Failed to update class {}: {:?}", class, e);
        }
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn focus(&self, node: &Element) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            let _ = element.focus();
        }
    }

    fn value(&self, input: &Element) -> String {
        input
            .dyn_ref::<HtmlInputElement>()
            .map(HtmlInputElement::value)
            .unwrap_or_default()
    }

    fn set_value(&self, input: &Element, value: &str) {
        if let Some(input) = input.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn scroll_to_bottom(&self, node: &Element) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            element.set_scroll_top(element.scroll_height());
        }
    }

    fn listen(&self, node: &Element, event: EventKind, mut handler: Box<dyn FnMut()>) -> Result<()> {
        match event {
            EventKind::Click => {
                let closure = Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
                node.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
                    .map_err(dom_error)?;
                closure.forget(); // Keep the closure alive for the page's lifetime
            }
            EventKind::EnterKey => {
                let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                    if event.key() == "Enter" {
                        handler();
                    }
                }) as Box<dyn FnMut(_)>);
                node.add_event_listener_with_callback("keypress", closure.as_ref().unchecked_ref())
                    .map_err(dom_error)?;
                closure.forget();
            }
        }
        Ok(())
    }
}
