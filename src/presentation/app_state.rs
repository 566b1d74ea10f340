// Application state for HTTP handlers
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, MutexGuard};

/// One plot view behind the HTTP surface. Actions on the view run one at a
/// time; a second load while one is running is refused rather than queued.
pub struct ViewState<V> {
    controller: Mutex<V>,
    loading: AtomicBool,
}

pub type SharedView<V> = Arc<ViewState<V>>;

impl<V> ViewState<V> {
    pub fn new(controller: V) -> SharedView<V> {
        Arc::new(Self {
            controller: Mutex::new(controller),
            loading: AtomicBool::new(false),
        })
    }

    pub async fn lock(&self) -> MutexGuard<'_, V> {
        self.controller.lock().await
    }

    /// Mark a load as running. `None` if one already is.
    pub fn begin_load(&self) -> Option<LoadGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadGuard(&self.loading))
    }
}

/// Clears the in-flight mark when the load finishes, however it ends.
pub struct LoadGuard<'a>(&'a AtomicBool);

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
