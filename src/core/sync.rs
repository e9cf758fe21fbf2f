//! Synchronization utilities for robust lock handling
//!
//! Converts lock poisoning into application-specific errors in a consistent
//! manner across the codebase, instead of scattering ad-hoc unwraps over
//! every lock site.

use std::sync::{LockResult, RwLockReadGuard, RwLockWriteGuard};

/// Handle poisoned RwLock read operations with consistent error handling
///
/// An RwLock becomes poisoned when a writer panics while holding the lock.
/// The poison error is converted into an application error built by the
/// provided constructor, so callers keep their own error taxonomy.
///
/// # Arguments
/// * `result` - The result from an RwLock read() operation
/// * `error_constructor` - Function to create the appropriate error type
///
/// # Returns
/// The RwLock read guard on success, or an application error on poison
pub fn handle_rwlock_read<T, E>(
    result: LockResult<RwLockReadGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockReadGuard<T>, E> {
    result.map_err(|poison_err| {
        error_constructor(
            format!(
                "Internal synchronisation error (RwLock read poisoned). This indicates a panic occurred while holding a write lock. PoisonError: {:?}",
                poison_err
            )
        )
    })
}

/// Handle poisoned RwLock write operations with consistent error handling
///
/// Counterpart of [`handle_rwlock_read`] for write guards. An RwLock can
/// become poisoned when any thread holding the lock panics.
///
/// # Arguments
/// * `result` - The result from an RwLock write() operation
/// * `error_constructor` - Function to create the appropriate error type
///
/// # Returns
/// The RwLock write guard on success, or an application error on poison
pub fn handle_rwlock_write<T, E>(
    result: LockResult<RwLockWriteGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<T>, E> {
    result.map_err(|poison_err| {
        error_constructor(
            format!(
                "Internal synchronisation error (RwLock write poisoned). This indicates a panic occurred while holding the lock. PoisonError: {:?}",
                poison_err
            )
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, RwLock};
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct TestError {
        message: String,
    }

    #[test]
    fn test_handle_rwlock_read_success() {
        let rwlock = RwLock::new(42);

        let result = handle_rwlock_read(rwlock.read(), |msg| TestError { message: msg });

        assert!(result.is_ok());
        assert_eq!(*result.unwrap(), 42);
    }

    #[test]
    fn test_handle_rwlock_write_success() {
        let rwlock = RwLock::new(42);

        let result = handle_rwlock_write(rwlock.write(), |msg| TestError { message: msg });

        assert!(result.is_ok());
        *result.unwrap() = 100;
        assert_eq!(*rwlock.read().unwrap(), 100);
    }

    #[test]
    fn test_handle_rwlock_read_with_poisoned_lock() {
        let rwlock = Arc::new(RwLock::new(42));
        let rwlock_clone = Arc::clone(&rwlock);

        // Poison the lock by panicking while holding a write guard
        let _ = thread::spawn(move || {
            let _guard = rwlock_clone.write().unwrap();
            panic!("Intentional panic to poison RwLock");
        })
        .join();

        let result = handle_rwlock_read(rwlock.read(), |msg| TestError { message: msg });

        assert!(result.is_err());
        let error = result.unwrap_err();
        assert!(error.message.contains("RwLock read poisoned"));
        assert!(error.message.contains("panic occurred"));
    }
}
