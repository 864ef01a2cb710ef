//! In-memory document and session storage.
//!
//! Used by the test suites and by headless hosts that want to drive a widget
//! without a browser. The document keeps a small node arena with classes,
//! attributes, input values, focus and listeners, and exposes helpers to
//! simulate user interaction.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use chatwidget_types::{Result, WidgetError};

use super::{Document, EventKind, SessionStore};
use crate::ui::markup::{escape_html, Element, Node};

/// Handle to a node of a `MemoryDocument`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryNode(usize);

enum NodeKind {
    Element { tag: String },
    Text(String),
}

struct NodeData {
    kind: NodeKind,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    children: Vec<usize>,
    parent: Option<usize>,
    value: String,
    scroll_requests: usize,
    listeners: Vec<(EventKind, Box<dyn FnMut()>)>,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            value: String::new(),
            scroll_requests: 0,
            listeners: Vec::new(),
        }
    }

    fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text(text.to_string()),
            ..Self::element("#text")
        }
    }
}

struct Tree {
    nodes: Vec<NodeData>,
    html: usize,
    head: usize,
    body: usize,
    focused: Option<usize>,
}

impl Tree {
    fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            html: 0,
            head: 0,
            body: 0,
            focused: None,
        };
        tree.html = tree.alloc(NodeData::element("html"));
        tree.head = tree.alloc(NodeData::element("head"));
        tree.body = tree.alloc(NodeData::element("body"));
        tree.attach(tree.html, tree.head);
        tree.attach(tree.html, tree.body);
        tree
    }

    fn alloc(&mut self, node: NodeData) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    fn detach(&mut self, child: usize) {
        if let Some(parent) = self.nodes[child].parent.take() {
            self.nodes[parent].children.retain(|c| *c != child);
        }
    }

    fn attach(&mut self, parent: usize, child: usize) {
        self.detach(child);
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
    }

    fn build(&mut self, element: &Element) -> usize {
        let mut data = NodeData::element(&element.tag);
        data.id = element.id.clone();
        data.classes = element.classes.clone();
        data.attributes = element.attributes.clone();
        let node = self.alloc(data);

        for child in &element.children {
            let child = match child {
                Node::Element(element) => self.build(element),
                Node::Text(text) => self.alloc(NodeData::text(text)),
            };
            self.attach(node, child);
        }
        node
    }

    fn descendants(&self, root: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.nodes[root].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node].children.iter().rev().copied());
        }
        out
    }

    fn is_connected(&self, node: usize) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.html {
                return true;
            }
            current = self.nodes[id].parent;
        }
        false
    }

    fn text_content(&self, node: usize, out: &mut String) {
        match &self.nodes[node].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &self.nodes[node].children {
                    self.text_content(*child, out);
                }
            }
        }
    }

    fn write_html(&self, node: usize, out: &mut String) {
        let data = &self.nodes[node];
        match &data.kind {
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Element { tag } => {
                out.push('<');
                out.push_str(tag);
                if let Some(id) = &data.id {
                    out.push_str(&format!(" id=\"{}\"", escape_html(id)));
                }
                if !data.classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", escape_html(&data.classes.join(" "))));
                }
                for (name, value) in &data.attributes {
                    out.push_str(&format!(" {}=\"{}\"", escape_html(name), escape_html(value)));
                }
                out.push('>');
                for child in &data.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }
}

/// Shared, cloneable in-memory document
#[derive(Clone)]
pub struct MemoryDocument {
    tree: Rc<RefCell<Tree>>,
    rejected_parents: Rc<RefCell<HashSet<usize>>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("nodes", &self.tree.borrow().nodes.len())
            .finish()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self {
            tree: Rc::new(RefCell::new(Tree::new())),
            rejected_parents: Rc::default(),
        }
    }

    /// Make every subsequent append into `parent` fail
    pub fn reject_appends_to(&self, parent: MemoryNode, reject: bool) {
        let mut rejected = self.rejected_parents.borrow_mut();
        if reject {
            rejected.insert(parent.0);
        } else {
            rejected.remove(&parent.0);
        }
    }

    fn index(&self, node: &MemoryNode) -> Result<usize> {
        if node.0 < self.tree.borrow().nodes.len() {
            Ok(node.0)
        } else {
            Err(WidgetError::Dom(format!("unknown node {}", node.0)))
        }
    }

    /// Run every listener of `event` registered on `node`.
    ///
    /// Listeners are taken out of the tree while they run, so they are free
    /// to call back into the document.
    pub fn dispatch(&self, node: MemoryNode, event: EventKind) {
        let mut listeners = {
            let mut tree = self.tree.borrow_mut();
            let Some(data) = tree.nodes.get_mut(node.0) else {
                return;
            };
            std::mem::take(&mut data.listeners)
        };

        for (kind, handler) in listeners.iter_mut() {
            if *kind == event {
                handler();
            }
        }

        let mut tree = self.tree.borrow_mut();
        let data = &mut tree.nodes[node.0];
        listeners.append(&mut data.listeners);
        data.listeners = listeners;
    }

    pub fn click(&self, node: MemoryNode) {
        self.dispatch(node, EventKind::Click);
    }

    pub fn press_enter(&self, node: MemoryNode) {
        self.dispatch(node, EventKind::EnterKey);
    }

    /// Replace the value of an input, as typing would
    pub fn type_text(&self, input: MemoryNode, text: &str) {
        self.set_value(&input, text);
    }

    /// First connected node carrying `class`, in document order
    pub fn query(&self, class: &str) -> Option<MemoryNode> {
        self.query_all(class).into_iter().next()
    }

    /// Every connected node carrying `class`, in document order
    pub fn query_all(&self, class: &str) -> Vec<MemoryNode> {
        let tree = self.tree.borrow();
        tree.descendants(tree.html)
            .into_iter()
            .filter(|n| tree.nodes[*n].classes.iter().any(|c| c == class))
            .map(MemoryNode)
            .collect()
    }

    /// Every connected element with the given tag name
    pub fn elements_by_tag(&self, tag: &str) -> Vec<MemoryNode> {
        let tag = tag.to_ascii_lowercase();
        let tree = self.tree.borrow();
        tree.descendants(tree.html)
            .into_iter()
            .filter(|n| matches!(&tree.nodes[*n].kind, NodeKind::Element { tag: t } if *t == tag))
            .map(MemoryNode)
            .collect()
    }

    pub fn element_by_id(&self, id: &str) -> Option<MemoryNode> {
        let tree = self.tree.borrow();
        tree.descendants(tree.html)
            .into_iter()
            .find(|n| tree.nodes[*n].id.as_deref() == Some(id))
            .map(MemoryNode)
    }

    /// Element children of `node`
    pub fn children(&self, node: MemoryNode) -> Vec<MemoryNode> {
        let tree = self.tree.borrow();
        tree.nodes[node.0]
            .children
            .iter()
            .filter(|c| matches!(tree.nodes[**c].kind, NodeKind::Element { .. }))
            .copied()
            .map(MemoryNode)
            .collect()
    }

    pub fn text_content(&self, node: MemoryNode) -> String {
        let mut out = String::new();
        self.tree.borrow().text_content(node.0, &mut out);
        out
    }

    pub fn attribute(&self, node: MemoryNode, name: &str) -> Option<String> {
        self.tree.borrow().nodes[node.0]
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn is_connected(&self, node: MemoryNode) -> bool {
        self.tree.borrow().is_connected(node.0)
    }

    pub fn focused(&self) -> Option<MemoryNode> {
        self.tree.borrow().focused.map(MemoryNode)
    }

    pub fn scroll_requests(&self, node: MemoryNode) -> usize {
        self.tree.borrow().nodes[node.0].scroll_requests
    }

    /// Serialized markup of `node` and its subtree, escaped
    pub fn outer_html(&self, node: MemoryNode) -> String {
        let mut out = String::new();
        self.tree.borrow().write_html(node.0, &mut out);
        out
    }
}

impl Document for MemoryDocument {
    type Node = MemoryNode;

    fn head(&self) -> Result<MemoryNode> {
        Ok(MemoryNode(self.tree.borrow().head))
    }

    fn body(&self) -> Result<MemoryNode> {
        Ok(MemoryNode(self.tree.borrow().body))
    }

    fn create(&self, element: &Element) -> Result<MemoryNode> {
        Ok(MemoryNode(self.tree.borrow_mut().build(element)))
    }

    fn append_child(&self, parent: &MemoryNode, child: &MemoryNode) -> Result<()> {
        let parent = self.index(parent)?;
        let child = self.index(child)?;
        if self.rejected_parents.borrow().contains(&parent) {
            return Err(WidgetError::Dom("HierarchyRequestError".to_string()));
        }
        if parent == child || self.tree.borrow().descendants(child).contains(&parent) {
            return Err(WidgetError::Dom("cannot append a node inside itself".to_string()));
        }
        self.tree.borrow_mut().attach(parent, child);
        Ok(())
    }

    fn remove(&self, node: &MemoryNode) {
        if let Ok(node) = self.index(node) {
            self.tree.borrow_mut().detach(node);
        }
    }

    fn clear_children(&self, node: &MemoryNode) {
        let mut tree = self.tree.borrow_mut();
        let children = std::mem::take(&mut tree.nodes[node.0].children);
        for child in children {
            tree.nodes[child].parent = None;
        }
    }

    fn find_by_class(&self, root: &MemoryNode, class: &str) -> Option<MemoryNode> {
        let tree = self.tree.borrow();
        tree.descendants(root.0)
            .into_iter()
            .find(|n| tree.nodes[*n].classes.iter().any(|c| c == class))
            .map(MemoryNode)
    }

    fn set_class(&self, node: &MemoryNode, class: &str, enabled: bool) {
        let mut tree = self.tree.borrow_mut();
        let classes = &mut tree.nodes[node.0].classes;
        let present = classes.iter().any(|c| c == class);
        if enabled && !present {
            classes.push(class.to_string());
        } else if !enabled && present {
            classes.retain(|c| c != class);
        }
    }

    fn has_class(&self, node: &MemoryNode, class: &str) -> bool {
        self.tree.borrow().nodes[node.0].classes.iter().any(|c| c == class)
    }

    fn focus(&self, node: &MemoryNode) {
        self.tree.borrow_mut().focused = Some(node.0);
    }

    fn value(&self, input: &MemoryNode) -> String {
        self.tree.borrow().nodes[input.0].value.clone()
    }

    fn set_value(&self, input: &MemoryNode, value: &str) {
        self.tree.borrow_mut().nodes[input.0].value = value.to_string();
    }

    fn scroll_to_bottom(&self, node: &MemoryNode) {
        self.tree.borrow_mut().nodes[node.0].scroll_requests += 1;
    }

    fn listen(&self, node: &MemoryNode, event: EventKind, handler: Box<dyn FnMut()>) -> Result<()> {
        let node = self.index(node)?;
        self.tree.borrow_mut().nodes[node].listeners.push((event, handler));
        Ok(())
    }
}

/// Shared in-memory session storage. Clones see the same items, which is how
/// tests model a page reload within one tab.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
    reject_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, like a full or disabled storage
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.items.borrow_mut().insert(key.to_string(), value.to_string());
    }
}

impl SessionStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.reject_writes.get() {
            return Err(WidgetError::Storage("QuotaExceededError".to_string()));
        }
        self.insert_raw(key, value);
        Ok(())
    }
}
