use crate::element::{ElementType, Key, VNode};
use crate::host::HostNodeId;
use crate::path::IdentityPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Host,
    Text,
    Fragment,
    Component,
}

impl InstanceKind {
    pub fn of(ty: &ElementType) -> Self {
        match ty {
            ElementType::Host(_) => InstanceKind::Host,
            ElementType::Text => InstanceKind::Text,
            ElementType::Fragment => InstanceKind::Fragment,
            ElementType::Component(_) => InstanceKind::Component,
        }
    }
}

/// Rendered counterpart of a descriptor. Persists across passes while the
/// descriptor at its position keeps the same type and key.
///
/// Only host and text instances own a host node; fragments and components
/// contribute the host nodes of their children.
#[derive(Debug)]
pub struct Instance {
    pub(crate) kind: InstanceKind,
    pub(crate) host: Option<HostNodeId>,
    pub(crate) node: VNode,
    pub(crate) children: Vec<Option<Instance>>,
    pub(crate) key: Option<Key>,
    pub(crate) path: IdentityPath,
}

impl Instance {
    pub(crate) fn new(node: VNode, path: IdentityPath) -> Self {
        Self {
            kind: InstanceKind::of(node.ty()),
            host: None,
            key: node.key().cloned(),
            node,
            children: Vec::new(),
            path,
        }
    }

    pub fn kind(&self) -> InstanceKind {
        self.kind
    }

    pub fn host(&self) -> Option<HostNodeId> {
        self.host
    }

    pub fn node(&self) -> &VNode {
        &self.node
    }

    pub fn children(&self) -> &[Option<Instance>] {
        &self.children
    }

    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    pub fn path(&self) -> &IdentityPath {
        &self.path
    }

    /// Paths of every component instance in this subtree, parents first.
    pub fn component_paths(&self) -> Vec<IdentityPath> {
        let mut paths = Vec::new();
        self.push_component_paths(&mut paths);
        paths
    }

    fn push_component_paths(&self, out: &mut Vec<IdentityPath>) {
        if self.kind == InstanceKind::Component {
            out.push(self.path.clone());
        }
        for child in self.children.iter().flatten() {
            child.push_component_paths(out);
        }
    }
}
