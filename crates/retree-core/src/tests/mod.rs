use std::cell::RefCell;
use std::rc::Rc;

use crate::{HostDocument, HostNodeId, MemoryDocument, Root, VNode};

mod reconciler_tests;
mod root_tests;

type Log = Rc<RefCell<Vec<String>>>;

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

/// Installs `node` in a fresh document, drains the queue and clears the
/// mutation log.
fn mounted(node: VNode) -> (Root<MemoryDocument>, HostNodeId) {
    let mut document = MemoryDocument::new();
    let container = document.create_element("div");
    let mut root = Root::new(document);
    root.setup(Some(node), Some(container))
        .expect("initial render");
    root.run_until_idle().expect("initial effects");
    root.document_mut().clear_mutations();
    (root, container)
}

fn child_at(root: &Root<MemoryDocument>, parent: HostNodeId, index: usize) -> HostNodeId {
    root.document().children(parent)[index]
}
