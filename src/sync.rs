//! Lock helpers shared by the dispatcher internals.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `m`, recovering the guard if a previous holder panicked.
///
/// Every critical section in the crate is a short pointer swap that leaves the
/// protected data consistent even when unwinding, so poisoning carries no
/// information here.
#[inline]
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
