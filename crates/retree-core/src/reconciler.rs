use std::collections::VecDeque;

use indexmap::IndexMap;
use log::trace;

use crate::binding::{
    apply_props, collect_host_nodes, diff_props, insert_instance, last_host_node_in,
    remove_instance,
};
use crate::element::{Component, Element, ElementType, Key, Props, VNode};
use crate::error::HostError;
use crate::hooks::{HookStore, Scope};
use crate::host::{HostDocument, HostNodeId};
use crate::instance::Instance;
use crate::path::{child_path, component_child_path, IdentityPath};
use crate::runtime::RuntimeHandle;

/// Diffs descriptors against the previous instance tree and applies the
/// difference to the host document.
pub(crate) struct Reconciler<'a> {
    document: &'a mut dyn HostDocument,
    hooks: &'a mut HookStore,
    runtime: &'a RuntimeHandle,
}

impl<'a> Reconciler<'a> {
    pub(crate) fn new(
        document: &'a mut dyn HostDocument,
        hooks: &'a mut HookStore,
        runtime: &'a RuntimeHandle,
    ) -> Self {
        Self {
            document,
            hooks,
            runtime,
        }
    }

    pub(crate) fn reconcile(
        &mut self,
        parent: HostNodeId,
        prev: Option<Instance>,
        next: Element,
        path: IdentityPath,
    ) -> Result<Option<Instance>, HostError> {
        let Some(next) = next else {
            if let Some(prev) = prev {
                trace!("unmount {}", prev.path);
                remove_instance(&mut *self.document, parent, prev)?;
            }
            return Ok(None);
        };
        let Some(mut prev) = prev else {
            return self.mount(parent, next, path).map(Some);
        };
        if prev.node.ty() != next.ty() || prev.key.as_ref() != next.key() {
            trace!(
                "replace {} with {} at {path}",
                prev.node.ty().name(),
                next.ty().name()
            );
            self.replace(parent, prev)?;
            return self.mount(parent, next, path).map(Some);
        }
        self.update(parent, &mut prev, next, path)?;
        Ok(Some(prev))
    }

    /// Removes an instance whose position is taken by a different type or
    /// key, along with the hook state of every component inside it.
    fn replace(&mut self, parent: HostNodeId, instance: Instance) -> Result<(), HostError> {
        let paths = instance.component_paths();
        remove_instance(&mut *self.document, parent, instance)?;
        for path in &paths {
            self.hooks.discard(path);
        }
        Ok(())
    }

    fn mount(
        &mut self,
        parent: HostNodeId,
        node: VNode,
        path: IdentityPath,
    ) -> Result<Instance, HostError> {
        trace!("mount {} at {path}", node.ty().name());
        let mut instance = Instance::new(node.clone(), path.clone());
        match node.ty() {
            ElementType::Text => {
                let host = self.document.create_text(&node.props().text());
                self.document.insert_before(parent, host, None)?;
                instance.host = Some(host);
            }
            ElementType::Fragment => {
                instance.children =
                    self.reconcile_children(parent, Vec::new(), node.children(), &path)?;
            }
            ElementType::Component(component) => {
                let child = self.invoke(component, node.props(), &path);
                let child_path = component_child_path(&path, child.as_ref());
                instance.children = vec![self.reconcile(parent, None, child, child_path)?];
            }
            ElementType::Host(tag) => {
                let host = self.document.create_element(tag);
                apply_props(&mut *self.document, host, node.props())?;
                self.document.insert_before(parent, host, None)?;
                instance.host = Some(host);
                instance.children =
                    self.reconcile_children(host, Vec::new(), node.children(), &path)?;
            }
        }
        Ok(instance)
    }

    fn update(
        &mut self,
        parent: HostNodeId,
        instance: &mut Instance,
        node: VNode,
        path: IdentityPath,
    ) -> Result<(), HostError> {
        trace!("update {} at {path}", node.ty().name());
        let previous = std::mem::replace(&mut instance.node, node.clone());
        instance.path = path.clone();
        match node.ty() {
            ElementType::Text => {
                let text = node.props().text();
                if previous.props().text() != text {
                    if let Some(host) = instance.host {
                        self.document.set_text(host, &text)?;
                    }
                }
            }
            ElementType::Fragment => {
                let old = std::mem::take(&mut instance.children);
                instance.children = self.reconcile_children(parent, old, node.children(), &path)?;
            }
            ElementType::Component(component) => {
                let child = self.invoke(component, node.props(), &path);
                let prev_child = std::mem::take(&mut instance.children)
                    .into_iter()
                    .next()
                    .flatten();
                let child_path = component_child_path(&path, child.as_ref());
                instance.children = vec![self.reconcile(parent, prev_child, child, child_path)?];
            }
            ElementType::Host(_) => {
                if let Some(host) = instance.host {
                    diff_props(&mut *self.document, host, previous.props(), node.props())?;
                    let old = std::mem::take(&mut instance.children);
                    instance.children =
                        self.reconcile_children(host, old, node.children(), &path)?;
                }
            }
        }
        Ok(())
    }

    fn invoke(&mut self, component: &Component, props: &Props, path: &IdentityPath) -> Element {
        self.hooks.enter(path);
        let child = {
            let mut scope = Scope::new(&mut *self.hooks, self.runtime, path.clone());
            component.render(&mut scope, props)
        };
        self.hooks.exit();
        child
    }

    fn reconcile_children(
        &mut self,
        parent: HostNodeId,
        old: Vec<Option<Instance>>,
        next: &[VNode],
        parent_path: &IdentityPath,
    ) -> Result<Vec<Option<Instance>>, HostError> {
        let trailing = last_host_node_in(&old)
            .filter(|&last| self.document.parent(last) == Some(parent))
            .and_then(|last| self.document.next_sibling(last));

        let mut keyed: IndexMap<Key, VecDeque<Instance>> = IndexMap::new();
        let mut unkeyed: Vec<Option<Instance>> = Vec::new();
        for child in old.into_iter().flatten() {
            match child.key.clone() {
                Some(key) => keyed.entry(key).or_default().push_back(child),
                None => unkeyed.push(Some(child)),
            }
        }

        let mut cursor = 0;
        let mut result = Vec::with_capacity(next.len());
        for (index, child) in next.iter().enumerate() {
            let previous = match child.key() {
                Some(key) => keyed.get_mut(key).and_then(VecDeque::pop_front),
                None => {
                    let found = unkeyed[cursor..].iter().position(|candidate| {
                        candidate
                            .as_ref()
                            .is_some_and(|candidate| candidate.node.ty() == child.ty())
                    });
                    match found {
                        Some(offset) => {
                            let at = cursor + offset;
                            cursor = at + 1;
                            unkeyed[at].take()
                        }
                        None => None,
                    }
                }
            };
            let path = child_path(parent_path, child.key(), index, Some(child.ty()), next);
            result.push(self.reconcile(parent, previous, Some(child.clone()), path)?);
        }

        // Unclaimed children leave the host tree before the reorder walk.
        for instance in keyed.into_values().flatten() {
            trace!("unmount {}", instance.path);
            remove_instance(&mut *self.document, parent, instance)?;
        }
        for instance in unkeyed.into_iter().flatten() {
            trace!("unmount {}", instance.path);
            remove_instance(&mut *self.document, parent, instance)?;
        }

        self.reorder(parent, &result, trailing)?;
        Ok(result)
    }

    /// Walks the children back to front so each one lands right before the
    /// first host node of its successor. Children already sitting in the
    /// right place are not touched.
    fn reorder(
        &mut self,
        parent: HostNodeId,
        children: &[Option<Instance>],
        trailing: Option<HostNodeId>,
    ) -> Result<(), HostError> {
        let mut anchor = trailing;
        for instance in children.iter().rev().flatten() {
            let nodes = collect_host_nodes(instance);
            let Some(&first) = nodes.first() else {
                continue;
            };
            if !self.in_place(parent, &nodes, anchor) {
                trace!("move {} before {anchor:?}", instance.path);
                insert_instance(&mut *self.document, parent, instance, anchor)?;
            }
            anchor = Some(first);
        }
        Ok(())
    }

    fn in_place(&self, parent: HostNodeId, nodes: &[HostNodeId], anchor: Option<HostNodeId>) -> bool {
        nodes
            .iter()
            .all(|&node| self.document.parent(node) == Some(parent))
            && nodes
                .windows(2)
                .all(|pair| self.document.next_sibling(pair[0]) == Some(pair[1]))
            && nodes
                .last()
                .is_some_and(|&last| self.document.next_sibling(last) == anchor)
    }
}
