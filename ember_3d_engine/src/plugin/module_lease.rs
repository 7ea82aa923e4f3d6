/// Liveness lease of a loaded module instance
///
/// Every foreign call into a module (console command, frame hook) runs
/// while holding the lease for reading. Unloading takes it for writing,
/// so `destroy` waits for calls already in flight and every later call
/// is refused instead of reaching freed module memory.
///
/// The lease of the module currently running on a thread is tracked so
/// that commands a module registers through the link table are tied to
/// it without the module passing anything extra.

use std::cell::RefCell;
use std::sync::{Arc, PoisonError, RwLock};

thread_local! {
    static CURRENT: RefCell<Option<ModuleLease>> = const { RefCell::new(None) };
}

#[derive(Clone)]
pub struct ModuleLease {
    alive: Arc<RwLock<bool>>,
}

impl ModuleLease {
    pub fn new() -> Self {
        Self { alive: Arc::new(RwLock::new(true)) }
    }

    pub fn is_alive(&self) -> bool {
        *self.alive.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with the module guaranteed alive for the whole call.
    ///
    /// Returns None once the lease is retired.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let alive = self.alive.read().unwrap_or_else(PoisonError::into_inner);
        if !*alive {
            return None;
        }
        let _scope = self.enter();
        Some(f())
    }

    /// Wait for calls in flight, run `release`, then refuse every later call.
    ///
    /// Must not be called from inside a call running under this lease.
    pub(crate) fn retire(&self, release: impl FnOnce()) {
        let mut alive = self.alive.write().unwrap_or_else(PoisonError::into_inner);
        if *alive {
            release();
            *alive = false;
        }
    }

    /// Mark this lease as the one of the module running on this thread
    pub(crate) fn enter(&self) -> LeaseScope {
        let previous = CURRENT.with(|current| current.borrow_mut().replace(self.clone()));
        LeaseScope { previous }
    }

    /// Lease of the module running on this thread, if any
    pub(crate) fn current() -> Option<ModuleLease> {
        CURRENT.with(|current| current.borrow().clone())
    }
}

impl Default for ModuleLease {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores the previously running module's lease on drop
pub(crate) struct LeaseScope {
    previous: Option<ModuleLease>,
}

impl Drop for LeaseScope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        CURRENT.with(|current| *current.borrow_mut() = previous);
    }
}

#[cfg(test)]
#[path = "module_lease_tests.rs"]
mod tests;
