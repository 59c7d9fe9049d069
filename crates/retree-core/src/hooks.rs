//! Per-component hook storage.
//!
//! Records are keyed by the identity path of the component and indexed by
//! call order: the `n`-th hook call during a render reads slot `n`. A
//! component must therefore call the same hooks in the same order on every
//! render. Reading a slot through a hook of another kind, or as another Rust
//! type, panics with the path and slot.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::collections::map;
use crate::equals::{deps_equal, SameValue};
use crate::path::IdentityPath;
use crate::runtime::RuntimeHandle;
use crate::value::Value;

/// Effect dependency list. `None` means "run after every render".
pub type Deps = Vec<Value>;

/// Builds an `Option<Deps>` from values convertible into [`Value`].
#[macro_export]
macro_rules! deps {
    () => {
        ::core::option::Option::Some(::std::vec::Vec::<$crate::Value>::new())
    };
    ($($dep:expr),+ $(,)?) => {
        ::core::option::Option::Some(::std::vec![$($crate::Value::from($dep)),+])
    };
}

/// Teardown returned by an effect.
pub struct Cleanup(Option<Box<dyn FnOnce()>>);

impl Cleanup {
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(cleanup)))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0.is_some() { "Cleanup(..)" } else { "Cleanup(none)" })
    }
}

pub trait IntoCleanup {
    fn into_cleanup(self) -> Cleanup;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Cleanup {
        Cleanup::none()
    }
}

impl IntoCleanup for Cleanup {
    fn into_cleanup(self) -> Cleanup {
        self
    }
}

impl IntoCleanup for Option<Cleanup> {
    fn into_cleanup(self) -> Cleanup {
        self.unwrap_or_else(Cleanup::none)
    }
}

type StateCell = Rc<RefCell<Box<dyn Any>>>;

struct EffectRecord {
    deps: Option<Deps>,
    cleanup: Option<Box<dyn FnOnce()>>,
}

enum HookRecord {
    State(StateCell),
    Effect(EffectRecord),
    Ref(Rc<dyn Any>),
}

impl HookRecord {
    fn kind(&self) -> &'static str {
        match self {
            HookRecord::State(_) => "state",
            HookRecord::Effect(_) => "effect",
            HookRecord::Ref(_) => "ref",
        }
    }
}

fn hook_mismatch(path: &IdentityPath, slot: usize, expected: &str, found: &str) -> ! {
    panic!("hook order changed at {path}[{slot}]: expected {expected}, found {found}")
}

fn run_cleanups(records: Vec<HookRecord>) {
    for record in records {
        if let HookRecord::Effect(EffectRecord {
            cleanup: Some(cleanup),
            ..
        }) = record
        {
            cleanup();
        }
    }
}

/// Queued effect: the callback a render produced for an effect slot whose
/// dependencies changed.
pub(crate) struct EffectRef {
    pub(crate) path: IdentityPath,
    pub(crate) slot: usize,
    pub(crate) effect: Box<dyn FnOnce() -> Cleanup>,
}

impl fmt::Debug for EffectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRef")
            .field("path", &self.path)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct HookStore {
    records: IndexMap<IdentityPath, Vec<HookRecord>>,
    cursors: map::HashMap<IdentityPath, usize>,
    visited: map::HashSet<IdentityPath>,
    stack: Vec<IdentityPath>,
    effects: Vec<EffectRef>,
}

impl HookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths with stored records, in first-mount order.
    pub fn paths(&self) -> impl Iterator<Item = &IdentityPath> {
        self.records.keys()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.records.contains_key(path)
    }

    /// Number of hook records stored for `path`.
    pub fn slot_count(&self, path: &str) -> usize {
        self.records.get(path).map_or(0, Vec::len)
    }

    /// Component currently rendering, if any.
    pub fn current_path(&self) -> Option<&IdentityPath> {
        self.stack.last()
    }

    pub(crate) fn begin_render(&mut self) {
        self.cursors.clear();
        self.visited.clear();
        self.stack.clear();
        self.effects.clear();
    }

    pub(crate) fn enter(&mut self, path: &IdentityPath) {
        self.stack.push(path.clone());
        self.cursors.insert(path.clone(), 0);
        self.visited.insert(path.clone());
        if !self.records.contains_key(path) {
            self.records.insert(path.clone(), Vec::new());
        }
    }

    pub(crate) fn exit(&mut self) {
        self.stack.pop();
    }

    fn next_slot(&mut self, path: &IdentityPath) -> usize {
        let cursor = self.cursors.entry(path.clone()).or_insert(0);
        let slot = *cursor;
        *cursor += 1;
        slot
    }

    fn records_mut(&mut self, path: &IdentityPath) -> &mut Vec<HookRecord> {
        self.records.entry(path.clone()).or_default()
    }

    pub(crate) fn take_effects(&mut self) -> Vec<EffectRef> {
        std::mem::take(&mut self.effects)
    }

    /// Drops the records of every path not visited during the last render,
    /// running their effect cleanups first. Returns the collected paths.
    pub(crate) fn collect_stale(&mut self) -> Vec<IdentityPath> {
        let visited = &self.visited;
        let mut removed = Vec::new();
        self.records.retain(|path, records| {
            if visited.contains(path) {
                return true;
            }
            removed.push((path.clone(), std::mem::take(records)));
            false
        });
        let mut stale = Vec::with_capacity(removed.len());
        for (path, records) in removed {
            run_cleanups(records);
            self.cursors.remove(&path);
            stale.push(path);
        }
        stale
    }

    /// Drops the records of an unmounted component. Paths already claimed by
    /// a component during the current render are kept.
    pub(crate) fn discard(&mut self, path: &IdentityPath) {
        if self.visited.contains(path) {
            return;
        }
        if let Some(records) = self.records.shift_remove(path) {
            run_cleanups(records);
        }
        self.cursors.remove(path);
    }

    /// Runs every pending cleanup and forgets all state.
    pub(crate) fn reset(&mut self) {
        for (_, records) in self.records.drain(..) {
            run_cleanups(records);
        }
        self.cursors.clear();
        self.visited.clear();
        self.stack.clear();
        self.effects.clear();
    }

    /// Runs a queued effect: previous cleanup first, then the effect,
    /// keeping whatever cleanup it returns (or none). Returns `false` when
    /// the record is gone.
    pub(crate) fn run_effect(&mut self, queued: EffectRef) -> bool {
        let Some(HookRecord::Effect(record)) = self
            .records
            .get_mut(&queued.path)
            .and_then(|records| records.get_mut(queued.slot))
        else {
            return false;
        };
        if let Some(cleanup) = record.cleanup.take() {
            cleanup();
        }
        record.cleanup = (queued.effect)().0;
        true
    }
}

/// Hook handle passed to a component's render function.
pub struct Scope<'a> {
    hooks: &'a mut HookStore,
    runtime: &'a RuntimeHandle,
    path: IdentityPath,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        hooks: &'a mut HookStore,
        runtime: &'a RuntimeHandle,
        path: IdentityPath,
    ) -> Self {
        Self {
            hooks,
            runtime,
            path,
        }
    }

    pub fn path(&self) -> &IdentityPath {
        &self.path
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// State that survives re-renders. `init` runs only on the first render
    /// of this component.
    pub fn use_state<T, F>(&mut self, init: F) -> (T, StateSetter<T>)
    where
        T: Clone + SameValue + 'static,
        F: FnOnce() -> T,
    {
        let path = self.path.clone();
        let slot = self.hooks.next_slot(&path);
        let records = self.hooks.records_mut(&path);
        if slot == records.len() {
            records.push(HookRecord::State(Rc::new(RefCell::new(Box::new(init())))));
        }
        let cell = match &records[slot] {
            HookRecord::State(cell) => Rc::clone(cell),
            other => hook_mismatch(&path, slot, "state", other.kind()),
        };
        let value = match cell.borrow().downcast_ref::<T>() {
            Some(value) => value.clone(),
            None => hook_mismatch(&path, slot, std::any::type_name::<T>(), "another type"),
        };
        let setter = StateSetter {
            cell: Rc::downgrade(&cell),
            runtime: self.runtime.clone(),
            path,
            slot,
            _marker: PhantomData,
        };
        (value, setter)
    }

    pub fn use_state_value<T>(&mut self, initial: T) -> (T, StateSetter<T>)
    where
        T: Clone + SameValue + 'static,
    {
        self.use_state(|| initial)
    }

    /// Schedules `effect` to run after the render commits when `deps`
    /// changed since the previous render (or on every render for `None`).
    /// The previous cleanup runs right before the effect.
    pub fn use_effect<F, R>(&mut self, effect: F, deps: Option<Deps>)
    where
        F: FnOnce() -> R + 'static,
        R: IntoCleanup,
    {
        let path = self.path.clone();
        let slot = self.hooks.next_slot(&path);
        let records = self.hooks.records_mut(&path);
        let (changed, cleanup) = match records.get_mut(slot) {
            None => (true, None),
            Some(HookRecord::Effect(previous)) => {
                let changed = match (&previous.deps, &deps) {
                    (Some(previous), Some(next)) => !deps_equal(previous, next),
                    _ => true,
                };
                (changed, previous.cleanup.take())
            }
            Some(other) => hook_mismatch(&path, slot, "effect", other.kind()),
        };
        let record = HookRecord::Effect(EffectRecord { deps, cleanup });
        if slot == records.len() {
            records.push(record);
        } else {
            records[slot] = record;
        }
        if changed {
            self.hooks.effects.push(EffectRef {
                path,
                slot,
                effect: Box::new(move || effect().into_cleanup()),
            });
        }
    }

    /// Mutable cell that lives as long as the component. Writing to it never
    /// schedules a render.
    pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
        let path = self.path.clone();
        let slot = self.hooks.next_slot(&path);
        let records = self.hooks.records_mut(&path);
        if slot == records.len() {
            records.push(HookRecord::Ref(Rc::new(RefCell::new(init()))));
        }
        match &records[slot] {
            HookRecord::Ref(cell) => match Rc::clone(cell).downcast::<RefCell<T>>() {
                Ok(cell) => cell,
                Err(_) => hook_mismatch(&path, slot, std::any::type_name::<T>(), "another type"),
            },
            other => hook_mismatch(&path, slot, "ref", other.kind()),
        }
    }
}

/// Writes a state slot and schedules a render when the value changes.
///
/// Setters stay valid across renders. Once the owning component unmounts
/// (or the root is re-installed) they do nothing.
pub struct StateSetter<T> {
    cell: Weak<RefCell<Box<dyn Any>>>,
    runtime: RuntimeHandle,
    path: IdentityPath,
    slot: usize,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            runtime: self.runtime.clone(),
            path: self.path.clone(),
            slot: self.slot,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("path", &self.path)
            .field("slot", &self.slot)
            .finish()
    }
}

impl<T: Clone + SameValue + 'static> StateSetter<T> {
    pub fn set(&self, value: T) {
        self.update(move |_| value);
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let Some(cell) = self.cell.upgrade() else {
            log::trace!("ignoring state update for unmounted {}[{}]", self.path, self.slot);
            return;
        };
        let Some(current) = cell.borrow().downcast_ref::<T>().cloned() else {
            return;
        };
        let next = f(&current);
        if next.same_value(&current) {
            return;
        }
        *cell.borrow_mut() = Box::new(next);
        self.runtime.request_render();
    }

    /// Current value, or `None` once the component is gone.
    pub fn get(&self) -> Option<T> {
        let cell = self.cell.upgrade()?;
        let value = cell.borrow().downcast_ref::<T>().cloned();
        value
    }
}
