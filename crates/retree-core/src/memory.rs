//! In-memory host document.
//!
//! `MemoryDocument` is an arena of element and text nodes. Every mutation the
//! reconciler performs is appended to a log so callers can assert exactly
//! which host operations a pass produced.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::error::HostError;
use crate::host::{Event, HostDocument, HostNodeId};
use crate::value::{EventHandler, Value};

const GLOBAL_PROPERTIES: &[&str] = &[
    "id",
    "title",
    "hidden",
    "tabIndex",
    "lang",
    "dir",
    "accessKey",
    "draggable",
    "spellcheck",
];

fn tag_properties(tag: &str) -> &'static [&'static str] {
    match tag {
        "input" => &[
            "value",
            "checked",
            "disabled",
            "type",
            "placeholder",
            "name",
            "readOnly",
            "min",
            "max",
            "step",
        ],
        "textarea" => &["value", "disabled", "placeholder", "name", "readOnly", "rows", "cols"],
        "select" => &["value", "disabled", "name", "multiple"],
        "option" => &["value", "selected", "disabled", "label"],
        "button" => &["disabled", "type", "name", "value"],
        "a" => &["href", "target", "rel"],
        "img" => &["src", "alt", "width", "height"],
        "label" => &["htmlFor"],
        "form" => &["action", "method"],
        _ => &[],
    }
}

const VOID_TAGS: &[&str] = &["input", "img", "br", "hr", "meta", "link"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateElement {
        id: HostNodeId,
        tag: String,
    },
    CreateText {
        id: HostNodeId,
        text: String,
    },
    SetText {
        id: HostNodeId,
        text: String,
    },
    Insert {
        parent: HostNodeId,
        child: HostNodeId,
        anchor: Option<HostNodeId>,
    },
    Remove {
        parent: HostNodeId,
        child: HostNodeId,
    },
    SetProperty {
        id: HostNodeId,
        name: String,
        value: String,
    },
    SetAttribute {
        id: HostNodeId,
        name: String,
        value: String,
    },
    RemoveAttribute {
        id: HostNodeId,
        name: String,
    },
    SetStyle {
        id: HostNodeId,
        name: String,
        value: Option<String>,
    },
    SetClassName {
        id: HostNodeId,
        value: String,
    },
    AddListener {
        id: HostNodeId,
        event: String,
    },
    RemoveListener {
        id: HostNodeId,
        event: String,
    },
}

/// Mutation counts by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationStats {
    pub created: usize,
    pub inserted: usize,
    pub removed: usize,
    pub text_updates: usize,
    pub prop_writes: usize,
}

impl MutationStats {
    pub fn total(&self) -> usize {
        self.created + self.inserted + self.removed + self.text_updates + self.prop_writes
    }
}

#[derive(Default)]
struct ElementData {
    tag: String,
    attributes: IndexMap<String, String>,
    properties: IndexMap<String, Value>,
    style: IndexMap<String, String>,
    listeners: Vec<(String, EventHandler)>,
}

enum NodeData {
    Element(ElementData),
    Text(String),
}

struct MemoryNode {
    parent: Option<HostNodeId>,
    children: Vec<HostNodeId>,
    data: NodeData,
}

#[derive(Default)]
pub struct MemoryDocument {
    nodes: Vec<Option<MemoryNode>>,
    mutations: Vec<Mutation>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&self, id: HostNodeId) -> Result<&MemoryNode, HostError> {
        self.nodes
            .get(id)
            .and_then(Option::as_ref)
            .ok_or(HostError::Missing { id })
    }

    fn node_mut(&mut self, id: HostNodeId) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(HostError::Missing { id })
    }

    fn element(&self, id: HostNodeId) -> Result<&ElementData, HostError> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(HostError::NotAnElement { id }),
        }
    }

    fn element_mut(&mut self, id: HostNodeId) -> Result<&mut ElementData, HostError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(HostError::NotAnElement { id }),
        }
    }

    fn push(&mut self, data: NodeData) -> HostNodeId {
        let id = self.nodes.len();
        self.nodes.push(Some(MemoryNode {
            parent: None,
            children: Vec::new(),
            data,
        }));
        id
    }

    fn detach(&mut self, child: HostNodeId) {
        let parent = self.nodes.get(child).and_then(Option::as_ref).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(Some(node)) = self.nodes.get_mut(parent) {
                node.children.retain(|&c| c != child);
            }
        }
        if let Some(Some(node)) = self.nodes.get_mut(child) {
            node.parent = None;
        }
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn clear_mutations(&mut self) {
        self.mutations.clear();
    }

    pub fn stats(&self) -> MutationStats {
        let mut stats = MutationStats::default();
        for mutation in &self.mutations {
            match mutation {
                Mutation::CreateElement { .. } | Mutation::CreateText { .. } => stats.created += 1,
                Mutation::Insert { .. } => stats.inserted += 1,
                Mutation::Remove { .. } => stats.removed += 1,
                Mutation::SetText { .. } => stats.text_updates += 1,
                _ => stats.prop_writes += 1,
            }
        }
        stats
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tag(&self, id: HostNodeId) -> Option<&str> {
        self.element(id).ok().map(|element| element.tag.as_str())
    }

    /// Value of a text node.
    pub fn text(&self, id: HostNodeId) -> Option<&str> {
        match &self.node(id).ok()?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    /// Concatenated text of a subtree.
    pub fn text_content(&self, id: HostNodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: HostNodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    pub fn attribute(&self, id: HostNodeId, name: &str) -> Option<&str> {
        self.element(id)
            .ok()?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    pub fn property(&self, id: HostNodeId, name: &str) -> Option<&Value> {
        self.element(id).ok()?.properties.get(name)
    }

    pub fn style(&self, id: HostNodeId, name: &str) -> Option<&str> {
        self.element(id).ok()?.style.get(name).map(String::as_str)
    }

    pub fn listener_count(&self, id: HostNodeId, event: &str) -> usize {
        self.element(id)
            .map(|element| element.listeners.iter().filter(|(e, _)| e == event).count())
            .unwrap_or(0)
    }

    /// Calls every listener for `kind` attached to `target` and returns how
    /// many ran. Listeners may schedule renders but never see the document.
    pub fn dispatch_event(&self, target: HostNodeId, kind: &str) -> Result<usize, HostError> {
        let handlers: Vec<EventHandler> = self
            .element(target)?
            .listeners
            .iter()
            .filter(|(event, _)| event == kind)
            .map(|(_, handler)| handler.clone())
            .collect();
        let event = Event {
            kind: kind.to_owned(),
            target,
        };
        for handler in &handlers {
            handler.call(&event);
        }
        Ok(handlers.len())
    }

    /// First element under `root` (inclusive, document order) whose `id`
    /// property or attribute equals `id`.
    pub fn find_by_id(&self, root: HostNodeId, id: &str) -> Option<HostNodeId> {
        let element = self.element(root).ok()?;
        let matches = element
            .properties
            .get("id")
            .and_then(Value::as_str)
            .or_else(|| element.attributes.get("id").map(String::as_str))
            == Some(id);
        if matches {
            return Some(root);
        }
        self.node(root)
            .ok()?
            .children
            .iter()
            .find_map(|&child| self.find_by_id(child, id))
    }

    pub fn to_html(&self, id: HostNodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    pub fn inner_html(&self, id: HostNodeId) -> String {
        let mut out = String::new();
        if let Ok(node) = self.node(id) {
            for &child in &node.children {
                self.write_html(child, &mut out);
            }
        }
        out
    }

    fn write_html(&self, id: HostNodeId, out: &mut String) {
        let Ok(node) = self.node(id) else {
            return;
        };
        let element = match &node.data {
            NodeData::Text(text) => {
                out.push_str(&escape(text, false));
                return;
            }
            NodeData::Element(element) => element,
        };
        let _ = write!(out, "<{}", element.tag);
        for (name, value) in &element.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape(value, true));
        }
        for (name, value) in &element.properties {
            let name = match name.as_str() {
                "htmlFor" => "for".to_owned(),
                other => other.to_ascii_lowercase(),
            };
            match value {
                Value::Null | Value::Bool(false) => {}
                Value::Bool(true) => {
                    let _ = write!(out, " {name}");
                }
                Value::Str(text) if text.is_empty() => {}
                other => {
                    let _ = write!(out, " {name}=\"{}\"", escape(&other.to_string(), true));
                }
            }
        }
        if !element.style.is_empty() {
            let style = element
                .style
                .iter()
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape(&style, true));
        }
        out.push('>');
        if VOID_TAGS.contains(&element.tag.as_str()) {
            return;
        }
        for &child in &node.children {
            self.write_html(child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

impl HostDocument for MemoryDocument {
    fn create_element(&mut self, tag: &str) -> HostNodeId {
        let id = self.push(NodeData::Element(ElementData {
            tag: tag.to_owned(),
            ..ElementData::default()
        }));
        self.mutations.push(Mutation::CreateElement {
            id,
            tag: tag.to_owned(),
        });
        id
    }

    fn create_text(&mut self, text: &str) -> HostNodeId {
        let id = self.push(NodeData::Text(text.to_owned()));
        self.mutations.push(Mutation::CreateText {
            id,
            text: text.to_owned(),
        });
        id
    }

    fn set_text(&mut self, node: HostNodeId, text: &str) -> Result<(), HostError> {
        match &mut self.node_mut(node)?.data {
            NodeData::Text(value) => {
                value.clear();
                value.push_str(text);
            }
            NodeData::Element(_) => return Err(HostError::NotAText { id: node }),
        }
        self.mutations.push(Mutation::SetText {
            id: node,
            text: text.to_owned(),
        });
        Ok(())
    }

    fn contains(&self, node: HostNodeId) -> bool {
        self.node(node).is_ok()
    }

    fn parent(&self, node: HostNodeId) -> Option<HostNodeId> {
        self.node(node).ok()?.parent
    }

    fn next_sibling(&self, node: HostNodeId) -> Option<HostNodeId> {
        let parent = self.parent(node)?;
        let siblings = &self.node(parent).ok()?.children;
        let index = siblings.iter().position(|&c| c == node)?;
        siblings.get(index + 1).copied()
    }

    fn children(&self, node: HostNodeId) -> Vec<HostNodeId> {
        self.node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn insert_before(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        anchor: Option<HostNodeId>,
    ) -> Result<(), HostError> {
        self.element(parent)?;
        self.node(child)?;
        if anchor == Some(child) {
            return Ok(());
        }
        if let Some(anchor) = anchor {
            if self.node(anchor)?.parent != Some(parent) {
                return Err(HostError::NotAChild {
                    parent,
                    child: anchor,
                });
            }
        }
        self.detach(child);
        let siblings = &mut self.node_mut(parent)?.children;
        let index = anchor
            .and_then(|anchor| siblings.iter().position(|&c| c == anchor))
            .unwrap_or(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        self.mutations.push(Mutation::Insert {
            parent,
            child,
            anchor,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError> {
        if self.node(child)?.parent != Some(parent) {
            return Err(HostError::NotAChild { parent, child });
        }
        self.detach(child);
        self.mutations.push(Mutation::Remove { parent, child });
        Ok(())
    }

    fn release(&mut self, node: HostNodeId) {
        self.detach(node);
        let mut pending = vec![node];
        while let Some(id) = pending.pop() {
            if let Some(slot) = self.nodes.get_mut(id) {
                if let Some(freed) = slot.take() {
                    pending.extend(freed.children);
                }
            }
        }
    }

    fn has_property(&self, node: HostNodeId, name: &str) -> bool {
        self.element(node).is_ok_and(|element| {
            GLOBAL_PROPERTIES.contains(&name) || tag_properties(&element.tag).contains(&name)
        })
    }

    fn set_property(
        &mut self,
        node: HostNodeId,
        name: &str,
        value: &Value,
    ) -> Result<(), HostError> {
        self.element_mut(node)?
            .properties
            .insert(name.to_owned(), value.clone());
        self.mutations.push(Mutation::SetProperty {
            id: node,
            name: name.to_owned(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn set_attribute(
        &mut self,
        node: HostNodeId,
        name: &str,
        value: &str,
    ) -> Result<(), HostError> {
        self.element_mut(node)?
            .attributes
            .insert(name.to_owned(), value.to_owned());
        self.mutations.push(Mutation::SetAttribute {
            id: node,
            name: name.to_owned(),
            value: value.to_owned(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: HostNodeId, name: &str) -> Result<(), HostError> {
        self.element_mut(node)?.attributes.shift_remove(name);
        self.mutations.push(Mutation::RemoveAttribute {
            id: node,
            name: name.to_owned(),
        });
        Ok(())
    }

    fn set_style(
        &mut self,
        node: HostNodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), HostError> {
        let style = &mut self.element_mut(node)?.style;
        match value {
            Some(value) => {
                style.insert(name.to_owned(), value.to_owned());
            }
            None => {
                style.shift_remove(name);
            }
        }
        self.mutations.push(Mutation::SetStyle {
            id: node,
            name: name.to_owned(),
            value: value.map(str::to_owned),
        });
        Ok(())
    }

    fn set_class_name(&mut self, node: HostNodeId, value: &str) -> Result<(), HostError> {
        self.element_mut(node)?
            .attributes
            .insert("class".to_owned(), value.to_owned());
        self.mutations.push(Mutation::SetClassName {
            id: node,
            value: value.to_owned(),
        });
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: HostNodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.element_mut(node)?
            .listeners
            .push((event.to_owned(), handler.clone()));
        self.mutations.push(Mutation::AddListener {
            id: node,
            event: event.to_owned(),
        });
        Ok(())
    }

    fn remove_listener(
        &mut self,
        node: HostNodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        let listeners = &mut self.element_mut(node)?.listeners;
        if let Some(index) = listeners
            .iter()
            .position(|(e, h)| e == event && h.ptr_eq(handler))
        {
            listeners.remove(index);
        }
        self.mutations.push(Mutation::RemoveListener {
            id: node,
            event: event.to_owned(),
        });
        Ok(())
    }
}
