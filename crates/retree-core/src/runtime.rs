use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use crate::hooks::EffectRef;
use crate::platform::RuntimeScheduler;

/// One unit of deferred work.
pub(crate) enum Task {
    Render,
    FlushEffects(Vec<EffectRef>),
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    render_pending: Cell<bool>,
    tasks: RefCell<VecDeque<Task>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            render_pending: Cell::new(false),
            tasks: RefCell::new(VecDeque::new()),
        }
    }

    fn push(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
        self.scheduler.schedule_frame();
    }

    fn request_render(&self) {
        if self.render_pending.replace(true) {
            return;
        }
        self.push(Task::Render);
    }

    fn enqueue_effects(&self, batch: Vec<EffectRef>) {
        if batch.is_empty() {
            return;
        }
        self.push(Task::FlushEffects(batch));
    }

    fn take_task(&self) -> Option<Task> {
        let task = self.tasks.borrow_mut().pop_front();
        if matches!(task, Some(Task::Render)) {
            self.render_pending.set(false);
        }
        task
    }

    fn clear(&self) {
        self.tasks.borrow_mut().clear();
        self.render_pending.set(false);
    }

    fn has_pending_work(&self) -> bool {
        !self.tasks.borrow().is_empty()
    }
}

/// Owner of the task queue. A [`crate::Root`] holds one; components and
/// setters only see a [`RuntimeHandle`].
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new(scheduler)),
        }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle(Rc::downgrade(&self.inner))
    }

    pub fn has_pending_work(&self) -> bool {
        self.inner.has_pending_work()
    }

    pub fn render_pending(&self) -> bool {
        self.inner.render_pending.get()
    }

    pub(crate) fn request_render(&self) {
        self.inner.request_render();
    }

    pub(crate) fn enqueue_effects(&self, batch: Vec<EffectRef>) {
        self.inner.enqueue_effects(batch);
    }

    pub(crate) fn take_task(&self) -> Option<Task> {
        self.inner.take_task()
    }

    pub(crate) fn clear(&self) {
        self.inner.clear();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new(Arc::new(DefaultScheduler))
    }
}

#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

/// Weak reference to a [`Runtime`]. Every operation is a no-op once the
/// runtime is gone.
#[derive(Clone)]
pub struct RuntimeHandle(Weak<RuntimeInner>);

impl RuntimeHandle {
    /// Queues a render pass unless one is already pending.
    pub fn request_render(&self) {
        if let Some(inner) = self.0.upgrade() {
            inner.request_render();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    pub fn has_pending_work(&self) -> bool {
        self.0
            .upgrade()
            .map(|inner| inner.has_pending_work())
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
