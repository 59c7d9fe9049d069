//! Testing utilities and harness for retree.
//!
//! [`TestRoot`] renders into a fresh container of a [`MemoryDocument`] and
//! exposes the document, the mutation log and the scheduler counters.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use retree_core::{
    HostDocument, HostNodeId, MemoryDocument, Mutation, MutationStats, RenderError,
    RenderOptions, Root, Runtime, RuntimeScheduler, VNode,
};

/// Scheduler that only counts frame requests.
#[derive(Debug, Default)]
pub struct TestScheduler {
    frames: AtomicUsize,
}

impl TestScheduler {
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

impl RuntimeScheduler for TestScheduler {
    fn schedule_frame(&self) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct TestRoot {
    root: Root<MemoryDocument>,
    container: HostNodeId,
    scheduler: Arc<TestScheduler>,
}

impl TestRoot {
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    pub fn with_options(options: RenderOptions) -> Self {
        let scheduler = Arc::new(TestScheduler::default());
        let runtime = Runtime::new(scheduler.clone());
        let mut document = MemoryDocument::new();
        let container = document.create_element("div");
        document.clear_mutations();
        Self {
            root: Root::with_runtime(document, runtime, options),
            container,
            scheduler,
        }
    }

    /// Installs `node`, flushes the queued work and clears the mutation log
    /// so assertions only see what happens afterwards.
    ///
    /// Panics if the first render fails.
    pub fn mount(node: impl Into<VNode>) -> Self {
        let mut test = Self::new();
        if let Err(err) = test.setup(node).and_then(|_| test.flush().map(|_| ())) {
            panic!("mounting the test root failed: {err}");
        }
        test.clear_mutations();
        test
    }

    pub fn setup(&mut self, node: impl Into<VNode>) -> Result<(), RenderError> {
        self.root.setup(Some(node.into()), Some(self.container))
    }

    pub fn update(&mut self, node: impl Into<VNode>) -> Result<(), RenderError> {
        self.root.update(node.into())
    }

    /// Runs queued renders and effect batches until the queue is empty.
    pub fn flush(&mut self) -> Result<usize, RenderError> {
        self.root.run_until_idle()
    }

    pub fn html(&self) -> String {
        self.document().inner_html(self.container)
    }

    pub fn text(&self) -> String {
        self.document().text_content(self.container)
    }

    pub fn find(&self, id: &str) -> Option<HostNodeId> {
        self.document().find_by_id(self.container, id)
    }

    /// Dispatches `kind` to the element with the given id and returns how
    /// many listeners ran. Panics when no such element exists.
    pub fn dispatch(&self, id: &str, kind: &str) -> usize {
        let Some(target) = self.find(id) else {
            panic!("no element with id `{id}` in {}", self.html());
        };
        match self.document().dispatch_event(target, kind) {
            Ok(count) => count,
            Err(err) => panic!("dispatching `{kind}` to `{id}` failed: {err}"),
        }
    }

    pub fn click(&self, id: &str) -> usize {
        self.dispatch(id, "click")
    }

    pub fn frames_requested(&self) -> usize {
        self.scheduler.frames()
    }

    pub fn stats(&self) -> MutationStats {
        self.document().stats()
    }

    pub fn mutations(&self) -> &[Mutation] {
        self.document().mutations()
    }

    pub fn clear_mutations(&mut self) {
        self.root.document_mut().clear_mutations();
    }

    pub fn host_children(&self) -> Vec<HostNodeId> {
        self.document().children(self.container)
    }

    pub fn container(&self) -> HostNodeId {
        self.container
    }

    pub fn document(&self) -> &MemoryDocument {
        self.root.document()
    }

    pub fn root(&self) -> &Root<MemoryDocument> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Root<MemoryDocument> {
        &mut self.root
    }
}

impl Default for TestRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, clonable record of events for asserting call order from inside
/// components, effects and cleanups.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Returns the recorded entries and starts over.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}
