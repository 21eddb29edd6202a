//! # Listener abstraction.
//!
//! A [`Listener`] receives one owned clone of every value fired on the signal it
//! is connected to. The returned future is the listener's execution context: it
//! may suspend freely without holding up the firer or sibling listeners.

use std::sync::Arc;

use async_trait::async_trait;

/// # Asynchronous callback invoked on delivery.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use signalbus::{Listener, Signal};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// struct Sum(AtomicU64);
///
/// #[async_trait]
/// impl Listener<u64> for Sum {
///     async fn call(&self, value: u64) {
///         self.0.fetch_add(value, Ordering::SeqCst);
///     }
/// }
///
/// let sum = Arc::new(Sum(AtomicU64::new(0)));
/// let signal = Signal::<u64>::new();
/// signal.connect_listener(sum.clone());
/// signal.fire(2);
/// signal.fire(3);
/// assert_eq!(sum.0.load(Ordering::SeqCst), 5);
/// ```
#[async_trait]
pub trait Listener<T>: Send + Sync + 'static {
    /// Handles one delivered value.
    async fn call(&self, value: T);

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a listener.
pub type ListenerRef<T> = Arc<dyn Listener<T>>;
