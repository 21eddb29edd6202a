//! # Awaiting the next delivery.
//!
//! ```text
//! wait()
//!   ├─► register waiter (id → CancellationToken)       before suspending
//!   ├─► once(|v| { remove waiter; send v })             one-shot listener
//!   └─► select!
//!         ├─ value received        ─► Ok(v)
//!         └─ token cancelled       ─► Err(Canceled)     (disconnect_all / destroy)
//!
//! drop of the future ─► WaitGuard: remove waiter, disconnect the listener
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use futures::future;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::error::SignalError;
use crate::signal::connection::Connection;
use crate::signal::core::Signal;
use crate::signal::shared::Shared;
use crate::sync::lock;

static WAITER_SEQ: AtomicU64 = AtomicU64::new(1);

impl<T> Signal<T>
where
    T: Clone + Send + 'static,
{
    /// Suspends until the next delivery and returns its value.
    ///
    /// Every concurrent waiter receives the same delivery. Resolves to
    /// [`SignalError::Canceled`] if [`disconnect_all`](Signal::disconnect_all)
    /// or [`destroy`](Signal::destroy) runs first, and to
    /// [`SignalError::Destroyed`] on an already destroyed signal.
    ///
    /// Dropping the future before it resolves unregisters the waiter.
    pub async fn wait(&self) -> Result<T, SignalError> {
        if self.shared.is_destroyed() {
            return Err(SignalError::Destroyed);
        }

        let id = WAITER_SEQ.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let (tx, mut rx) = oneshot::channel::<T>();

        self.shared.register_waiter(id, token.clone());

        let tx = Mutex::new(Some(tx));
        let owner = Arc::downgrade(&self.shared);
        let conn = self.once(move |value: T| {
            if let Some(shared) = owner.upgrade() {
                shared.remove_waiter(id);
            }
            if let Some(tx) = lock(&tx).take() {
                let _ = tx.send(value);
            }
            future::ready(())
        });

        let _guard = WaitGuard {
            shared: Arc::downgrade(&self.shared),
            id,
            conn,
        };

        // A destroy that ran after the first check drained `waiting` before we
        // registered, so nothing would cancel the token.
        if self.shared.is_destroyed() {
            return rx.try_recv().map_err(|_| SignalError::Destroyed);
        }

        tokio::select! {
            biased;
            received = rx => received.map_err(|_| SignalError::Canceled),
            _ = token.cancelled() => Err(SignalError::Canceled),
        }
    }

    /// Number of `wait()` calls currently suspended on this signal.
    pub fn waiting(&self) -> usize {
        self.shared.waiter_count()
    }
}

/// Unregisters an abandoned waiter.
struct WaitGuard<T> {
    shared: Weak<Shared<T>>,
    id: u64,
    conn: Connection<T>,
}

impl<T> Drop for WaitGuard<T> {
    fn drop(&mut self) {
        self.conn.disconnect();
        if let Some(shared) = self.shared.upgrade() {
            shared.remove_waiter(self.id);
        }
    }
}
