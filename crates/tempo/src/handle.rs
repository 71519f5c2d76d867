//! # Application Handle
//!
//! The thread-safe side of a running application. Clone it freely and hand
//! it to any thread: posting work, requesting exit and registering listeners
//! never wait for a frame to finish, only for the relevant lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tempo_core::{ListenerId, ListenerRegistry, RegistryError, TaskQueue};

use crate::listener::ApplicationListener;

/// Kind of application backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApplicationType {
    /// Desktop process without a window.
    HeadlessDesktop,
}

/// State shared between the loop thread and every handle.
pub(crate) struct Shared {
    pub(crate) queue: TaskQueue,
    pub(crate) running: AtomicBool,
    pub(crate) registry: ListenerRegistry<dyn ApplicationListener>,
    pub(crate) pending_resize: Mutex<Option<(u32, u32)>>,
}

/// Cloneable handle to a headless application.
#[derive(Clone)]
pub struct AppHandle {
    shared: Arc<Shared>,
}

impl AppHandle {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: TaskQueue::new(),
                running: AtomicBool::new(true),
                registry: ListenerRegistry::new(),
                pending_resize: Mutex::new(None),
            }),
        }
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    /// Runs `task` on the loop thread at the start of the next frame.
    ///
    /// Tasks run in submission order. A task posted after the loop has
    /// stopped is never run.
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.queue.post(task);
    }

    /// Asks the loop to shut down.
    ///
    /// Posted like any other task, so work posted before the call still
    /// runs. Calling it repeatedly, from any number of threads, still shuts
    /// down once.
    pub fn exit(&self) {
        tracing::debug!("exit requested");
        // Weak so a never-drained exit task cannot keep the queue alive.
        let shared = Arc::downgrade(&self.shared);
        self.post(move || {
            if let Some(shared) = shared.upgrade() {
                if shared.running.swap(false, Ordering::AcqRel) {
                    tracing::info!("exit task ran, loop stops after this frame");
                }
            }
        });
    }

    /// Returns `false` once an exit request has been processed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Registers a listener. It receives `init` before its first `update`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] when called from inside a listener callback;
    /// post the registration instead.
    pub fn add_listener(
        &self,
        listener: Box<dyn ApplicationListener>,
    ) -> Result<ListenerId, RegistryError> {
        let id = self.shared.registry.add(listener)?;
        tracing::info!(listener = %id, "listener registered");
        Ok(id)
    }

    /// Detaches a listener without calling `pause` or `dispose`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] from inside a listener callback,
    /// [`RegistryError::UnknownListener`] if `id` is not registered.
    pub fn remove_listener(
        &self,
        id: ListenerId,
    ) -> Result<Box<dyn ApplicationListener>, RegistryError> {
        let listener = self.shared.registry.remove(id)?;
        tracing::info!(listener = %id, "listener removed");
        Ok(listener)
    }

    /// Number of registered listeners.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] from inside a listener callback.
    pub fn listener_count(&self) -> Result<usize, RegistryError> {
        self.shared.registry.len()
    }

    /// Ids of the registered listeners in registration order.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] from inside a listener callback.
    pub fn listener_ids(&self) -> Result<Vec<ListenerId>, RegistryError> {
        self.shared.registry.ids()
    }

    /// Changes the logical size. Applied at the start of the next frame;
    /// only the latest request before that frame takes effect.
    pub fn request_resize(&self, width: u32, height: u32) {
        *self.shared.pending_resize.lock() = Some((width, height));
    }

    /// Always [`ApplicationType::HeadlessDesktop`].
    #[must_use]
    pub fn app_type(&self) -> ApplicationType {
        ApplicationType::HeadlessDesktop
    }
}

impl std::fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppHandle")
            .field("running", &self.is_running())
            .field("queue", &self.shared.queue)
            .finish_non_exhaustive()
    }
}
