use log::{debug, error};

use crate::binding::remove_instance;
use crate::element::VNode;
use crate::error::RenderError;
use crate::hooks::{EffectRef, HookStore};
use crate::host::{HostDocument, HostNodeId};
use crate::instance::Instance;
use crate::path::IdentityPath;
use crate::reconciler::Reconciler;
use crate::runtime::{Runtime, RuntimeHandle, Task};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Identity path of the top-level instance.
    pub root_path: IdentityPath,
    /// Render passes [`Root::run_until_idle`] runs before giving up.
    pub max_passes: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            root_path: IdentityPath::from("root"),
            max_passes: 1000,
        }
    }
}

/// A rendered tree inside one container of a host document.
///
/// The root owns every piece of render state: the instance tree, the hook
/// store and the runtime queue. Nothing runs in the background; the host
/// drives queued renders and effect batches through [`Root::step`] or
/// [`Root::run_until_idle`].
pub struct Root<D: HostDocument> {
    document: D,
    container: Option<HostNodeId>,
    node: Option<VNode>,
    instance: Option<Instance>,
    hooks: HookStore,
    runtime: Runtime,
    handle: RuntimeHandle,
    options: RenderOptions,
    passes: usize,
}

impl<D: HostDocument> Root<D> {
    pub fn new(document: D) -> Self {
        Self::with_runtime(document, Runtime::default(), RenderOptions::default())
    }

    pub fn with_options(document: D, options: RenderOptions) -> Self {
        Self::with_runtime(document, Runtime::default(), options)
    }

    pub fn with_runtime(document: D, runtime: Runtime, options: RenderOptions) -> Self {
        let handle = runtime.handle();
        Self {
            document,
            container: None,
            node: None,
            instance: None,
            hooks: HookStore::new(),
            runtime,
            handle,
            options,
            passes: 0,
        }
    }

    /// Installs `node` into `container` and renders it synchronously.
    ///
    /// Whatever was installed before is torn down first: its host nodes are
    /// removed, the container is emptied, pending effect cleanups run and
    /// queued work is dropped.
    pub fn setup(
        &mut self,
        node: Option<VNode>,
        container: Option<HostNodeId>,
    ) -> Result<(), RenderError> {
        let container = container.ok_or(RenderError::MissingContainer)?;
        let node = node.ok_or(RenderError::MissingRoot)?;
        if !self.document.contains(container) {
            return Err(RenderError::UnknownContainer(container));
        }
        self.teardown()?;
        self.document.clear_children(container)?;
        debug!("installing root into container {container}");
        self.container = Some(container);
        self.node = Some(node);
        self.render()
    }

    /// Replaces the root descriptor and renders synchronously.
    pub fn update(&mut self, node: VNode) -> Result<(), RenderError> {
        if self.container.is_none() {
            return Err(RenderError::MissingContainer);
        }
        self.node = Some(node);
        self.render()
    }

    /// Removes the rendered tree and runs every pending cleanup.
    pub fn unmount(&mut self) -> Result<(), RenderError> {
        self.teardown()?;
        self.container = None;
        self.node = None;
        Ok(())
    }

    fn teardown(&mut self) -> Result<(), RenderError> {
        self.runtime.clear();
        if let (Some(container), Some(instance)) = (self.container, self.instance.take()) {
            debug!("tearing down root in container {container}");
            remove_instance(&mut self.document, container, instance)?;
        }
        self.hooks.reset();
        Ok(())
    }

    /// One render pass over the installed root. Queues the effects it
    /// collected as a separate task.
    pub fn render(&mut self) -> Result<(), RenderError> {
        let (Some(container), Some(node)) = (self.container, self.node.clone()) else {
            return Ok(());
        };
        self.hooks.begin_render();
        let previous = self.instance.take();
        let root_path = self.options.root_path.clone();
        let mut reconciler = Reconciler::new(&mut self.document, &mut self.hooks, &self.handle);
        self.instance = reconciler.reconcile(container, previous, Some(node), root_path)?;

        let stale = self.hooks.collect_stale();
        let effects = self.hooks.take_effects();
        self.passes += 1;
        debug!(
            "render pass {} at {}: {} effects queued, {} stale paths collected",
            self.passes,
            self.options.root_path,
            effects.len(),
            stale.len()
        );
        self.runtime.enqueue_effects(effects);
        Ok(())
    }

    /// Runs the next queued task. Returns `false` when the queue was empty.
    pub fn step(&mut self) -> Result<bool, RenderError> {
        let Some(task) = self.runtime.take_task() else {
            return Ok(false);
        };
        match task {
            Task::Render => self.render()?,
            Task::FlushEffects(batch) => self.flush_effects(batch),
        }
        Ok(true)
    }

    /// Drains the task queue, returning how many render passes ran.
    ///
    /// Fails with [`RenderError::Unsettled`] once more than
    /// [`RenderOptions::max_passes`] passes ran without the queue emptying;
    /// the remaining work is dropped.
    pub fn run_until_idle(&mut self) -> Result<usize, RenderError> {
        let mut renders = 0;
        while let Some(task) = self.runtime.take_task() {
            match task {
                Task::Render => {
                    if renders == self.options.max_passes {
                        self.runtime.clear();
                        error!("render loop did not settle after {renders} passes");
                        return Err(RenderError::Unsettled { passes: renders });
                    }
                    renders += 1;
                    if let Err(err) = self.render() {
                        error!("scheduled render failed: {err}");
                        return Err(err);
                    }
                }
                Task::FlushEffects(batch) => self.flush_effects(batch),
            }
        }
        Ok(renders)
    }

    fn flush_effects(&mut self, batch: Vec<EffectRef>) {
        let queued = batch.len();
        let ran = batch
            .into_iter()
            .map(|effect| self.hooks.run_effect(effect))
            .filter(|&ran| ran)
            .count();
        debug!("flushed {ran} of {queued} queued effects");
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    pub fn container(&self) -> Option<HostNodeId> {
        self.container
    }

    pub fn instance(&self) -> Option<&Instance> {
        self.instance.as_ref()
    }

    pub fn hooks(&self) -> &HookStore {
        &self.hooks
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn has_pending_work(&self) -> bool {
        self.runtime.has_pending_work()
    }

    /// Identity paths with hook state, in first-mount order.
    pub fn tracked_paths(&self) -> Vec<IdentityPath> {
        self.hooks.paths().cloned().collect()
    }

    /// Render passes completed since construction.
    pub fn passes(&self) -> usize {
        self.passes
    }
}
