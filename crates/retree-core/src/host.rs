use crate::error::HostError;
use crate::value::{EventHandler, Value};

pub type HostNodeId = usize;

/// Event delivered to listeners attached through an `on*` prop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: String,
    pub target: HostNodeId,
}

/// The mutable host tree the reconciler keeps in sync.
pub trait HostDocument {
    fn create_element(&mut self, tag: &str) -> HostNodeId;

    fn create_text(&mut self, text: &str) -> HostNodeId;

    fn set_text(&mut self, node: HostNodeId, text: &str) -> Result<(), HostError>;

    fn contains(&self, node: HostNodeId) -> bool;

    fn parent(&self, node: HostNodeId) -> Option<HostNodeId>;

    fn next_sibling(&self, node: HostNodeId) -> Option<HostNodeId>;

    fn children(&self, node: HostNodeId) -> Vec<HostNodeId>;

    /// Inserts `child` before `anchor`, or appends it when `anchor` is `None`.
    /// An attached child is moved.
    fn insert_before(
        &mut self,
        parent: HostNodeId,
        child: HostNodeId,
        anchor: Option<HostNodeId>,
    ) -> Result<(), HostError>;

    fn remove_child(&mut self, parent: HostNodeId, child: HostNodeId) -> Result<(), HostError>;

    /// Destroys a detached node and its subtree.
    fn release(&mut self, node: HostNodeId);

    /// Whether `name` is a native property of the element.
    fn has_property(&self, node: HostNodeId, name: &str) -> bool;

    fn set_property(&mut self, node: HostNodeId, name: &str, value: &Value)
        -> Result<(), HostError>;

    fn set_attribute(&mut self, node: HostNodeId, name: &str, value: &str)
        -> Result<(), HostError>;

    fn remove_attribute(&mut self, node: HostNodeId, name: &str) -> Result<(), HostError>;

    /// `None` clears the style entry.
    fn set_style(
        &mut self,
        node: HostNodeId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), HostError>;

    fn set_class_name(&mut self, node: HostNodeId, value: &str) -> Result<(), HostError>;

    fn add_listener(
        &mut self,
        node: HostNodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    fn remove_listener(
        &mut self,
        node: HostNodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    /// Detaches and releases every child of `node`.
    fn clear_children(&mut self, node: HostNodeId) -> Result<(), HostError> {
        for child in self.children(node) {
            self.remove_child(node, child)?;
            self.release(child);
        }
        Ok(())
    }
}
