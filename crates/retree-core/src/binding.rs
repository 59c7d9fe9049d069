//! Routes descriptor props onto host nodes and moves instance subtrees
//! around in the host tree.

use crate::element::Props;
use crate::equals::SameValue;
use crate::error::HostError;
use crate::host::{HostDocument, HostNodeId};
use crate::instance::{Instance, InstanceKind};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropKind {
    Children,
    /// Listener for the lowercased event name.
    Event(String),
    Style,
    ClassName,
    Attribute,
    Property,
}

pub fn classify(document: &dyn HostDocument, node: HostNodeId, name: &str) -> PropKind {
    if name == "children" {
        PropKind::Children
    } else if let Some(event) = name.strip_prefix("on") {
        PropKind::Event(event.to_ascii_lowercase())
    } else if name == "style" {
        PropKind::Style
    } else if name == "className" {
        PropKind::ClassName
    } else if name.starts_with("data-") || name.starts_with("aria-") {
        PropKind::Attribute
    } else if document.has_property(node, name) {
        PropKind::Property
    } else {
        PropKind::Attribute
    }
}

pub fn apply_props(
    document: &mut dyn HostDocument,
    node: HostNodeId,
    props: &Props,
) -> Result<(), HostError> {
    for (name, value) in props.iter() {
        set_prop(document, node, name, None, value)?;
    }
    Ok(())
}

/// Removes props missing from `next`, then writes the ones whose value is
/// not the same value as before.
pub fn diff_props(
    document: &mut dyn HostDocument,
    node: HostNodeId,
    prev: &Props,
    next: &Props,
) -> Result<(), HostError> {
    for (name, value) in prev.iter() {
        if next.get(name).is_none() {
            remove_prop(document, node, name, value)?;
        }
    }
    for (name, value) in next.iter() {
        let previous = prev.get(name);
        if previous.is_some_and(|previous| previous.same_value(value)) {
            continue;
        }
        set_prop(document, node, name, previous, value)?;
    }
    Ok(())
}

fn set_prop(
    document: &mut dyn HostDocument,
    node: HostNodeId,
    name: &str,
    previous: Option<&Value>,
    value: &Value,
) -> Result<(), HostError> {
    match classify(document, node, name) {
        PropKind::Children => Ok(()),
        PropKind::Event(event) => {
            if let Some(Value::Handler(old)) = previous {
                document.remove_listener(node, &event, old)?;
            }
            match value {
                Value::Handler(handler) => document.add_listener(node, &event, handler),
                _ => Ok(()),
            }
        }
        PropKind::Style => {
            // Styles merge: keys absent from the new map keep their value.
            let Some(style) = value.as_map() else {
                return Ok(());
            };
            let old = previous.and_then(Value::as_map);
            for (key, entry) in style {
                if old
                    .and_then(|old| old.get(key))
                    .is_some_and(|old| old.same_value(entry))
                {
                    continue;
                }
                let entry = entry.to_string();
                document.set_style(node, key, Some(&entry))?;
            }
            Ok(())
        }
        PropKind::ClassName => document.set_class_name(node, &value.to_string()),
        PropKind::Attribute => document.set_attribute(node, name, &value.to_string()),
        PropKind::Property => document.set_property(node, name, value),
    }
}

fn remove_prop(
    document: &mut dyn HostDocument,
    node: HostNodeId,
    name: &str,
    previous: &Value,
) -> Result<(), HostError> {
    match classify(document, node, name) {
        PropKind::Children => Ok(()),
        PropKind::Event(event) => match previous {
            Value::Handler(handler) => document.remove_listener(node, &event, handler),
            _ => Ok(()),
        },
        PropKind::Style => {
            if let Some(style) = previous.as_map() {
                for key in style.keys() {
                    document.set_style(node, key, None)?;
                }
            }
            Ok(())
        }
        PropKind::ClassName => document.set_class_name(node, ""),
        PropKind::Attribute => document.remove_attribute(node, name),
        PropKind::Property => document.set_property(node, name, &Value::from("")),
    }
}

/// Host nodes owned by `instance`, in document order. Host and text
/// instances own exactly one; fragments and components own those of their
/// children.
pub fn collect_host_nodes(instance: &Instance) -> Vec<HostNodeId> {
    let mut nodes = Vec::new();
    push_host_nodes(instance, &mut nodes);
    nodes
}

fn push_host_nodes(instance: &Instance, out: &mut Vec<HostNodeId>) {
    match instance.kind {
        InstanceKind::Host | InstanceKind::Text => out.extend(instance.host),
        InstanceKind::Fragment | InstanceKind::Component => {
            for child in instance.children.iter().flatten() {
                push_host_nodes(child, out);
            }
        }
    }
}

pub fn first_host_node(instance: &Instance) -> Option<HostNodeId> {
    match instance.kind {
        InstanceKind::Host | InstanceKind::Text => instance.host,
        InstanceKind::Fragment | InstanceKind::Component => {
            first_host_node_in(&instance.children)
        }
    }
}

pub(crate) fn first_host_node_in(children: &[Option<Instance>]) -> Option<HostNodeId> {
    children.iter().flatten().find_map(first_host_node)
}

fn last_host_node(instance: &Instance) -> Option<HostNodeId> {
    match instance.kind {
        InstanceKind::Host | InstanceKind::Text => instance.host,
        InstanceKind::Fragment | InstanceKind::Component => last_host_node_in(&instance.children),
    }
}

pub(crate) fn last_host_node_in(children: &[Option<Instance>]) -> Option<HostNodeId> {
    children.iter().rev().flatten().find_map(last_host_node)
}

/// Places every host node of `instance` before `anchor` (or at the end).
pub fn insert_instance(
    document: &mut dyn HostDocument,
    parent: HostNodeId,
    instance: &Instance,
    anchor: Option<HostNodeId>,
) -> Result<(), HostError> {
    for node in collect_host_nodes(instance) {
        document.insert_before(parent, node, anchor)?;
    }
    Ok(())
}

/// Detaches the host nodes of `instance` that still sit under `parent`, then
/// releases all of them.
pub fn remove_instance(
    document: &mut dyn HostDocument,
    parent: HostNodeId,
    instance: Instance,
) -> Result<(), HostError> {
    let nodes = collect_host_nodes(&instance);
    for &node in &nodes {
        if document.parent(node) == Some(parent) {
            document.remove_child(parent, node)?;
        }
    }
    for node in nodes {
        document.release(node);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::h;
    use crate::memory::{MemoryDocument, Mutation};
    use crate::value::EventHandler;

    #[test]
    fn props_route_by_name_and_element() {
        let mut doc = MemoryDocument::new();
        let input = doc.create_element("input");
        assert_eq!(classify(&doc, input, "children"), PropKind::Children);
        assert_eq!(classify(&doc, input, "onClick"), PropKind::Event("click".into()));
        assert_eq!(classify(&doc, input, "style"), PropKind::Style);
        assert_eq!(classify(&doc, input, "className"), PropKind::ClassName);
        assert_eq!(classify(&doc, input, "data-id"), PropKind::Attribute);
        assert_eq!(classify(&doc, input, "value"), PropKind::Property);
        assert_eq!(classify(&doc, input, "custom"), PropKind::Attribute);
    }

    #[test]
    fn apply_sets_every_kind() {
        let mut doc = MemoryDocument::new();
        let input = doc.create_element("input");
        let node = h("input")
            .prop("value", "hi")
            .prop("data-role", "name")
            .class("field")
            .style([("color", "red")])
            .on("input", |_| {})
            .build();
        apply_props(&mut doc, input, node.props()).unwrap();

        assert_eq!(doc.property(input, "value").and_then(Value::as_str), Some("hi"));
        assert_eq!(doc.attribute(input, "data-role"), Some("name"));
        assert_eq!(doc.attribute(input, "class"), Some("field"));
        assert_eq!(doc.style(input, "color"), Some("red"));
        assert_eq!(doc.listener_count(input, "input"), 1);
    }

    #[test]
    fn diff_removes_then_writes_changed_values() {
        let mut doc = MemoryDocument::new();
        let button = doc.create_element("button");
        let handler = EventHandler::new(|_| {});
        let prev = h("button")
            .prop("title", "a")
            .prop("disabled", true)
            .prop("data-x", "1")
            .class("big")
            .style([("color", "red"), ("margin", "0")])
            .on_handler("click", handler.clone())
            .build();
        apply_props(&mut doc, button, prev.props()).unwrap();
        doc.clear_mutations();

        let next = h("button")
            .prop("title", "a")
            .style([("color", "blue")])
            .on_handler("click", handler)
            .build();
        diff_props(&mut doc, button, prev.props(), next.props()).unwrap();

        assert_eq!(doc.property(button, "disabled").and_then(Value::as_str), Some(""));
        assert_eq!(doc.attribute(button, "data-x"), None);
        assert_eq!(doc.attribute(button, "class"), Some(""));
        assert_eq!(doc.style(button, "color"), Some("blue"));
        assert_eq!(doc.style(button, "margin"), Some("0"));
        assert_eq!(doc.listener_count(button, "click"), 1);
        assert!(!doc
            .mutations()
            .iter()
            .any(|m| matches!(m, Mutation::SetProperty { name, .. } if name == "title")));
    }
}
