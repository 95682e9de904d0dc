//! Optional per-service lifecycle hooks.

/// Lifecycle hooks a service may observe.
///
/// Every registered service implements this trait; all methods default to
/// no-ops, so `impl Lifecycle for MyService {}` opts out entirely. Hooks run
/// on the thread that triggered them, with no locator locks held, and are
/// panic-isolated: a panicking hook is logged and never aborts resolution or
/// teardown.
///
/// # Examples
///
/// ```rust
/// use scoped_locator::Lifecycle;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct HitCounter {
///     resolves: AtomicUsize,
/// }
///
/// impl Lifecycle for HitCounter {
///     fn on_resolved(&self) {
///         self.resolves.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait Lifecycle: Send + Sync + 'static {
    /// Fired once, right after a lazy provider materializes this instance.
    fn on_provider_created(&self) {}

    /// Fired each time this instance is handed out by a resolver.
    fn on_resolved(&self) {}

    /// Fired when the owning scope ends, before [`dispose`](Self::dispose).
    fn on_scope_ended(&self) {}

    /// Final cleanup when the owning scope ends or the registration handle
    /// is disposed.
    fn dispose(&self) {}
}
