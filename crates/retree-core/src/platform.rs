//! Platform hook for driving the render loop.
//!
//! The runtime never runs deferred work on its own. It tells the host that
//! work is queued and the host calls back into [`crate::Root::step`] or
//! [`crate::Root::run_until_idle`] when it is ready.

/// Receives a notification whenever the runtime queues a render pass or an
/// effect batch. Implementations must be safe to share across threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host drive the runtime soon.
    fn schedule_frame(&self);
}
