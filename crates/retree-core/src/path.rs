use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

use crate::element::{ElementType, Key, VNode};

/// Structural identity of a tree position. Hook storage is keyed by it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityPath(Rc<str>);

impl IdentityPath {
    pub fn new(path: &str) -> Self {
        Self(Rc::from(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IdentityPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for IdentityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl From<&str> for IdentityPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for IdentityPath {
    fn from(path: String) -> Self {
        Self(Rc::from(path))
    }
}

/// Path of the child at `index` among `siblings`.
///
/// A key wins. Otherwise the child is named by its type and its rank among
/// earlier siblings of the same type, so unkeyed children of different types
/// keep their identity when one of them disappears. Absent children fall back
/// to their index.
pub fn child_path(
    parent: &IdentityPath,
    key: Option<&Key>,
    index: usize,
    child_type: Option<&ElementType>,
    siblings: &[VNode],
) -> IdentityPath {
    if let Some(key) = key {
        return IdentityPath::from(format!("{parent}/{key}"));
    }
    match child_type {
        Some(ty) => {
            let rank = siblings
                .iter()
                .take(index)
                .filter(|sibling| sibling.ty() == ty)
                .count();
            IdentityPath::from(format!("{parent}/{}:{rank}", ty.name()))
        }
        None => IdentityPath::from(format!("{parent}/{index}")),
    }
}

/// Path of the single child a component body rendered.
pub fn component_child_path(parent: &IdentityPath, child: Option<&VNode>) -> IdentityPath {
    match child {
        Some(child) => child_path(parent, None, 0, Some(child.ty()), std::slice::from_ref(child)),
        None => child_path(parent, None, 0, None, &[]),
    }
}
