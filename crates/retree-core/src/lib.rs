#![doc = r"Core runtime pieces for the retree virtual tree engine."]

extern crate self as retree_core;

pub mod binding;
mod collections;
pub mod element;
pub mod equals;
pub mod error;
pub mod hooks;
pub mod host;
pub mod instance;
pub mod memo;
pub mod memory;
pub mod path;
pub mod platform;
mod reconciler;
pub mod root;
pub mod runtime;
pub mod value;

pub use binding::{
    apply_props, classify, collect_host_nodes, diff_props, first_host_node, insert_instance,
    remove_instance, PropKind,
};
pub use element::{
    fragment, h, text, Child, Component, Element, ElementBuilder, ElementType, Key, Props, VNode,
};
pub use equals::{deep_equals, deps_equal, props_shallow_equal, shallow_equals, SameValue};
pub use error::{HostError, RenderError};
pub use hooks::{Cleanup, Deps, HookStore, IntoCleanup, Scope, StateSetter};
pub use host::{Event, HostDocument, HostNodeId};
pub use instance::{Instance, InstanceKind};
pub use memo::{memo, memo_with};
pub use memory::{MemoryDocument, Mutation, MutationStats};
pub use path::{child_path, component_child_path, IdentityPath};
pub use platform::RuntimeScheduler;
pub use retree_macros::component;
pub use root::{RenderOptions, Root};
pub use runtime::{DefaultScheduler, Runtime, RuntimeHandle};
pub use value::{EventHandler, Value, ValueMap};

#[cfg(test)]
mod tests;
