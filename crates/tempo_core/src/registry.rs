//! # Listener Registry
//!
//! Ordered storage for lifecycle listeners, shared between the loop thread
//! and any thread that adds or removes listeners.
//!
//! ## Locking
//!
//! ```text
//! ReentrantMutex ─── RefCell ─── Vec<Entry>
//!      │                │
//!      │                └─ re-entry from the same thread: try_borrow fails → Busy
//!      └─ other threads: block until the current pass ends
//! ```
//!
//! The loop holds the lock for a whole listener pass. A listener that calls
//! back into the registry from its own callback re-enters the mutex on the
//! same thread, finds the cell already borrowed, and gets
//! [`RegistryError::Busy`] instead of a deadlock.

use std::cell::RefCell;
use std::fmt;

use parking_lot::ReentrantMutex;

use crate::error::RegistryError;

/// Stable identifier handed out by [`ListenerRegistry::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Returns the raw id value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Entry<L: ?Sized> {
    id: ListenerId,
    initialized: bool,
    listener: Box<L>,
}

struct State<L: ?Sized> {
    entries: Vec<Entry<L>>,
    next_id: u64,
}

/// Ordered registry of boxed listeners.
///
/// Listeners are visited in registration order. Each entry remembers whether
/// it has been initialised so listeners added while the loop is running get
/// exactly one `init` before their first `update`.
pub struct ListenerRegistry<L: ?Sized> {
    state: ReentrantMutex<RefCell<State<L>>>,
}

impl<L: ?Sized> ListenerRegistry<L> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(State {
                entries: Vec::new(),
                next_id: 1,
            })),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State<L>) -> R) -> Result<R, RegistryError> {
        let guard = self.state.lock();
        let mut state = guard.try_borrow_mut().map_err(|_| RegistryError::Busy)?;
        Ok(f(&mut *state))
    }

    /// Appends a listener. It is not initialised until the next
    /// [`init_pending`](Self::init_pending) pass.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] when called from inside a listener pass.
    pub fn add(&self, listener: Box<L>) -> Result<ListenerId, RegistryError> {
        self.with_state(|state| {
            let id = ListenerId(state.next_id);
            state.next_id += 1;
            state.entries.push(Entry {
                id,
                initialized: false,
                listener,
            });
            id
        })
    }

    /// Detaches a listener without invoking any of its callbacks.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] from inside a listener pass,
    /// [`RegistryError::UnknownListener`] if `id` is not registered.
    pub fn remove(&self, id: ListenerId) -> Result<Box<L>, RegistryError> {
        self.with_state(|state| {
            let index = state
                .entries
                .iter()
                .position(|entry| entry.id == id)
                .ok_or(RegistryError::UnknownListener(id))?;
            Ok(state.entries.remove(index).listener)
        })?
    }

    /// Number of registered listeners, initialised or not.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] when called from inside a listener pass.
    pub fn len(&self) -> Result<usize, RegistryError> {
        self.with_state(|state| state.entries.len())
    }

    /// Returns `true` if no listener is registered.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] when called from inside a listener pass.
    pub fn is_empty(&self) -> Result<bool, RegistryError> {
        self.len().map(|len| len == 0)
    }

    /// Ids in registration order.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] when called from inside a listener pass.
    pub fn ids(&self) -> Result<Vec<ListenerId>, RegistryError> {
        self.with_state(|state| state.entries.iter().map(|entry| entry.id).collect())
    }

    /// Detaches every listener, in registration order, without invoking any
    /// callbacks. The caller owns the returned listeners and drops them
    /// outside the lock.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Busy`] when called from inside a listener pass.
    pub fn clear(&self) -> Result<Vec<Box<L>>, RegistryError> {
        self.with_state(|state| {
            state
                .entries
                .drain(..)
                .map(|entry| entry.listener)
                .collect()
        })
    }

    /// Initialises every listener that has not been initialised yet, in
    /// registration order. Stops at the first error; the failing listener
    /// stays uninitialised.
    ///
    /// Returns how many listeners were initialised.
    ///
    /// # Errors
    ///
    /// The first error returned by `f`, or [`RegistryError::Busy`] if a pass
    /// is already running on this thread.
    pub fn init_pending<E, F>(&self, mut f: F) -> Result<usize, E>
    where
        E: From<RegistryError>,
        F: FnMut(&mut L) -> Result<(), E>,
    {
        let guard = self.state.lock();
        let mut state = guard.try_borrow_mut().map_err(|_| RegistryError::Busy)?;
        let mut count = 0;
        for entry in state.entries.iter_mut().filter(|entry| !entry.initialized) {
            f(&mut *entry.listener)?;
            entry.initialized = true;
            count += 1;
        }
        Ok(count)
    }

    /// Visits every initialised listener in registration order under the
    /// lock. Stops at the first error.
    ///
    /// # Errors
    ///
    /// The first error returned by `f`, or [`RegistryError::Busy`] if a pass
    /// is already running on this thread.
    pub fn for_each_initialized<E, F>(&self, mut f: F) -> Result<(), E>
    where
        E: From<RegistryError>,
        F: FnMut(&mut L) -> Result<(), E>,
    {
        let guard = self.state.lock();
        let mut state = guard.try_borrow_mut().map_err(|_| RegistryError::Busy)?;
        for entry in state.entries.iter_mut().filter(|entry| entry.initialized) {
            f(&mut *entry.listener)?;
        }
        Ok(())
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}
