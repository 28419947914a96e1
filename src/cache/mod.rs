//! Read-side memoization for the letter façade.
//!
//! [`ResponseCache`] keeps successful responses for a fixed time-to-live and
//! [`InFlight`] lets concurrent identical reads share one pending request.
//! Both are keyed by [`Signature`].

pub mod inflight;
pub mod response;
pub mod signature;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use inflight::{InFlight, SharedResult};
pub use response::ResponseCache;
pub use signature::Signature;

/// Locks are only held for map operations, so a poisoned lock still guards
/// consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
