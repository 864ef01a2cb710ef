//! Structured element descriptions.
//!
//! The widget never builds markup by string concatenation. Views describe
//! elements as a tree; a `Document` turns the tree into real nodes, and
//! `Element::to_html` renders it with every text and attribute escaped.

use std::fmt::Write;

/// Elements that never have children or a closing tag
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

/// Elements whose content is raw text rather than markup
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Concatenated text of this element and its descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Render as HTML with all text and attribute values escaped
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let tag = self.tag.to_ascii_lowercase();
        let _ = write!(out, "<{tag}");
        if let Some(id) = &self.id {
            let _ = write!(out, " id=\"{}\"", escape_html(id));
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_html(&self.classes.join(" ")));
        }
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", escape_html(name), escape_html(value));
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&tag.as_str()) {
            return;
        }

        let raw = RAW_TEXT_ELEMENTS.contains(&tag.as_str());
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_html(out),
                Node::Text(text) if raw => out.push_str(&escape_raw_text(text)),
                Node::Text(text) => out.push_str(&escape_html(text)),
            }
        }
        let _ = write!(out, "</{tag}>");
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Element(element) => collect_text(element, out),
            Node::Text(text) => out.push_str(text),
        }
    }
}

/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Raw text elements end at the first `</`; break that sequence up.
fn escape_raw_text(s: &str) -> String {
    s.replace("</", "<\\/")
}
