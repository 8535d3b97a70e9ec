use std::sync::{Arc, PoisonError, RwLock};

/// Copy-on-write holder of an immutable value.
///
/// Readers clone the current `Arc` and keep using it for as long as they
/// like; a refresh builds a complete replacement and swaps it in under a
/// short write lock, so a reader never sees a half-built value.
#[derive(Debug)]
pub struct Snapshot<T> {
    current: RwLock<Arc<T>>,
}

impl<T> Snapshot<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
        }
    }

    /// The current value.
    pub fn load(&self) -> Arc<T> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replace the value, returning the previous one.
    pub fn store(&self, value: T) -> Arc<T> {
        let next = Arc::new(value);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl<T: Clone> Snapshot<T> {
    /// Build a new value from a copy of the current one and swap it in.
    ///
    /// Concurrent updates are serialized by the write lock; `f` runs while
    /// the lock is held, so keep it free of I/O.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = T::clone(&guard);
        f(&mut next);
        *guard = Arc::new(next);
    }
}

impl<T: Default> Default for Snapshot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
