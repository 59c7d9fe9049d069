//! Descriptor model: the immutable virtual nodes a render produces.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

use crate::host::Event;
use crate::hooks::Scope;
use crate::value::{EventHandler, Value, ValueMap};

/// Property carrying the string of a text descriptor.
pub const NODE_VALUE: &str = "nodeValue";

/// What a render function returns. `None` renders nothing.
pub type Element = Option<VNode>;

pub type RenderFn = fn(&mut Scope<'_>, &Props) -> Element;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Str(Rc<str>),
    Int(i64),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(key) => f.write_str(key),
            Key::Int(key) => write!(f, "{key}"),
        }
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Key::Str(Rc::from(key))
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Key::Str(Rc::from(key))
    }
}

impl From<&String> for Key {
    fn from(key: &String) -> Self {
        Key::Str(Rc::from(key.as_str()))
    }
}

impl From<i32> for Key {
    fn from(key: i32) -> Self {
        Key::Int(i64::from(key))
    }
}

impl From<i64> for Key {
    fn from(key: i64) -> Self {
        Key::Int(key)
    }
}

impl From<u32> for Key {
    fn from(key: u32) -> Self {
        Key::Int(i64::from(key))
    }
}

impl From<usize> for Key {
    fn from(key: usize) -> Self {
        Key::Int(key as i64)
    }
}

#[derive(Clone)]
enum Render {
    Static(RenderFn),
    Shared(Rc<dyn Fn(&mut Scope<'_>, &Props) -> Element>),
}

/// A render function with a display name.
///
/// Two components are the same type only when they wrap the same function
/// (static) or the same closure allocation (shared). Hook state survives an
/// update only while the type stays the same.
#[derive(Clone)]
pub struct Component {
    name: Cow<'static, str>,
    render: Render,
}

impl Component {
    pub const fn from_fn(name: &'static str, render: RenderFn) -> Self {
        Self {
            name: Cow::Borrowed(name),
            render: Render::Static(render),
        }
    }

    pub fn new<F>(name: impl Into<Cow<'static, str>>, render: F) -> Self
    where
        F: Fn(&mut Scope<'_>, &Props) -> Element + 'static,
    {
        Self {
            name: name.into(),
            render: Render::Shared(Rc::new(render)),
        }
    }

    pub fn name(&self) -> &str {
        if self.name.is_empty() {
            "component"
        } else {
            &self.name
        }
    }

    pub fn render(&self, scope: &mut Scope<'_>, props: &Props) -> Element {
        match &self.render {
            Render::Static(render) => render(scope, props),
            Render::Shared(render) => render(scope, props),
        }
    }

    pub fn element(&self) -> ElementBuilder {
        ElementBuilder::new(ElementType::Component(self.clone()))
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        match (&self.render, &other.render) {
            (Render::Static(a), Render::Static(b)) => *a as usize == *b as usize,
            (Render::Shared(a), Render::Shared(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Component {}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementType {
    Host(Rc<str>),
    Fragment,
    Text,
    Component(Component),
}

impl ElementType {
    /// Name used when deriving identity paths.
    pub fn name(&self) -> &str {
        match self {
            ElementType::Host(tag) => tag,
            ElementType::Fragment => "#fragment",
            ElementType::Text => "#text",
            ElementType::Component(component) => component.name(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Props {
    values: ValueMap,
    children: Vec<VNode>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_children(values: ValueMap, children: Vec<VNode>) -> Self {
        Self { values, children }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of named values, children excluded.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.children.is_empty()
    }

    pub fn children(&self) -> &[VNode] {
        &self.children
    }

    pub fn text(&self) -> Cow<'_, str> {
        match self.values.get(NODE_VALUE) {
            Some(Value::Str(text)) => Cow::Borrowed(text),
            Some(Value::Null) | None => Cow::Borrowed(""),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }
}

/// Immutable virtual node. Cloning shares the props.
#[derive(Clone, Debug)]
pub struct VNode {
    ty: ElementType,
    key: Option<Key>,
    props: Rc<Props>,
}

impl VNode {
    pub fn new(ty: ElementType, key: Option<Key>, props: Props) -> Self {
        Self {
            ty,
            key,
            props: Rc::new(props),
        }
    }

    pub fn ty(&self) -> &ElementType {
        &self.ty
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn children(&self) -> &[VNode] {
        self.props.children()
    }

    /// Same descriptor: identical type and key sharing one props allocation.
    pub fn same_node(&self, other: &VNode) -> bool {
        self.ty == other.ty && self.key == other.key && Rc::ptr_eq(&self.props, &other.props)
    }
}

/// Builder for host and component descriptors.
#[derive(Debug)]
pub struct ElementBuilder {
    ty: ElementType,
    key: Option<Key>,
    values: ValueMap,
    children: Vec<VNode>,
}

pub fn h(tag: &str) -> ElementBuilder {
    ElementBuilder::new(ElementType::Host(Rc::from(tag)))
}

pub fn text(value: impl fmt::Display) -> VNode {
    let mut props = Props::new();
    props.insert(NODE_VALUE, value.to_string());
    VNode::new(ElementType::Text, None, props)
}

pub fn fragment<C: Into<Child>>(children: impl IntoIterator<Item = C>) -> VNode {
    ElementBuilder::new(ElementType::Fragment)
        .children(children)
        .build()
}

impl ElementBuilder {
    pub fn new(ty: ElementType) -> Self {
        Self {
            ty,
            key: None,
            values: ValueMap::default(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn prop(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Attaches `handler` under `on` + the capitalized event name, so
    /// `on("click", ..)` sets `onClick`.
    pub fn on(self, event: &str, handler: impl Fn(&Event) + 'static) -> Self {
        self.on_handler(event, EventHandler::new(handler))
    }

    pub fn on_handler(self, event: &str, handler: EventHandler) -> Self {
        let mut chars = event.chars();
        let name = match chars.next() {
            Some(first) => format!("on{}{}", first.to_uppercase(), chars.as_str()),
            None => String::from("on"),
        };
        self.prop(name, handler)
    }

    pub fn style<K, V>(self, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.prop("style", Value::map(entries))
    }

    pub fn class(self, name: impl Into<Value>) -> Self {
        self.prop("className", name)
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        flatten_children(&mut self.children, child.into());
        self
    }

    pub fn children<C: Into<Child>>(mut self, children: impl IntoIterator<Item = C>) -> Self {
        for child in children {
            flatten_children(&mut self.children, child.into());
        }
        self
    }

    pub fn build(self) -> VNode {
        VNode::new(
            self.ty,
            self.key,
            Props::with_children(self.values, self.children),
        )
    }
}

impl From<ElementBuilder> for VNode {
    fn from(builder: ElementBuilder) -> Self {
        builder.build()
    }
}

/// Anything that can sit in a child list before normalization.
#[derive(Debug)]
pub enum Child {
    Empty,
    Node(VNode),
    Text(String),
    List(Vec<Child>),
}

impl Child {
    /// Canonical descriptor for a single renderable: nothing for empty
    /// inputs, a text node for scalars, a fragment for lists.
    pub fn normalize(self) -> Element {
        match self {
            Child::Empty => None,
            Child::Node(node) => Some(node),
            Child::Text(value) => Some(text(value)),
            Child::List(items) => Some(fragment(items)),
        }
    }
}

fn flatten_children(out: &mut Vec<VNode>, child: Child) {
    match child {
        Child::Empty => {}
        Child::Node(node) => out.push(node),
        Child::Text(value) => out.push(text(value)),
        Child::List(items) => {
            for item in items {
                flatten_children(out, item);
            }
        }
    }
}

impl From<()> for Child {
    fn from(_: ()) -> Self {
        Child::Empty
    }
}

impl From<bool> for Child {
    fn from(_: bool) -> Self {
        Child::Empty
    }
}

impl From<VNode> for Child {
    fn from(node: VNode) -> Self {
        Child::Node(node)
    }
}

impl From<ElementBuilder> for Child {
    fn from(builder: ElementBuilder) -> Self {
        Child::Node(builder.build())
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.to_owned())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value)
    }
}

impl From<&String> for Child {
    fn from(value: &String) -> Self {
        Child::Text(value.clone())
    }
}

macro_rules! child_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Child {
                fn from(value: $ty) -> Self {
                    Child::Text(value.to_string())
                }
            }
        )*
    };
}

child_from_display!(char, i32, i64, u32, u64, usize, isize, f32, f64);

impl<T: Into<Child>> From<Option<T>> for Child {
    fn from(value: Option<T>) -> Self {
        value.map_or(Child::Empty, Into::into)
    }
}

impl<T: Into<Child>> From<Vec<T>> for Child {
    fn from(items: Vec<T>) -> Self {
        Child::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty(_: &mut Scope<'_>, _: &Props) -> Element {
        None
    }

    #[test]
    fn children_are_flattened_and_empty_inputs_dropped() {
        let node = h("ul")
            .child(())
            .child(false)
            .child(None::<VNode>)
            .child(vec![h("li").key("a"), h("li").key("b")])
            .child(3)
            .build();

        let kinds: Vec<_> = node.children().iter().map(|c| c.ty().name().to_owned()).collect();
        assert_eq!(kinds, ["li", "li", "#text"]);
        assert_eq!(node.children()[2].props().text(), "3");
    }

    #[test]
    fn normalize_wraps_top_level_lists_in_fragments() {
        assert!(Child::from(()).normalize().is_none());
        let node = Child::from(vec!["a", "b"]).normalize().expect("fragment");
        assert_eq!(node.ty(), &ElementType::Fragment);
        assert_eq!(node.children().len(), 2);
        let node = Child::from(1.5).normalize().expect("text");
        assert_eq!(node.props().text(), "1.5");
    }

    #[test]
    fn event_props_are_named_after_the_event() {
        let node = h("button").on("click", |_| {}).build();
        assert!(matches!(node.props().get("onClick"), Some(Value::Handler(_))));
    }

    #[test]
    fn component_identity_follows_the_render_function() {
        let a = Component::from_fn("A", empty);
        let b = Component::from_fn("B", empty);
        assert_eq!(a, b);

        let shared = Component::new("C", |_: &mut Scope<'_>, _: &Props| None);
        let other = Component::new("C", |_: &mut Scope<'_>, _: &Props| None);
        assert_eq!(shared, shared.clone());
        assert_ne!(shared, other);
        assert_eq!(Component::new("", |_: &mut Scope<'_>, _: &Props| None).name(), "component");
    }
}
