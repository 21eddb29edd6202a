//! # Signal: registration and the four firing modes.
//!
//! ## Firing modes
//! ```text
//! fire(v)                  walk list ─► per listener: RunnerPool::acquire_and_run
//!                                        (inline until first suspension)
//!
//! fire_deferred(v)         walk list ─► per listener: spawn(task)
//!                                        task: if connected { listener(v) }
//!
//! fire_deferred_unsafe(v)  walk list ─► spawn(batch)
//!                                        batch: for each: if connected {
//!                                                   RunnerPool::acquire_and_run }
//!
//! fire_bindable*(v)        config.delivery == Deferred ─► fire_deferred*(v)
//!                          otherwise                   ─► fire(v)
//! ```
//!
//! ## Rules
//! - Order within one fire: most recently connected first.
//! - A listener is delivered to iff it is connected when the walk reaches it;
//!   deferred modes check again right before invoking it.
//! - No lock is held while a listener runs: listeners may connect, disconnect
//!   and fire re-entrantly.
//! - `fire` never awaits a suspended listener; the deferred modes never run a
//!   listener before they return.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::config::SignalConfig;
use crate::listeners::{ListenerFn, ListenerRef};
use crate::runner::{isolate, runtime_handle};
use crate::signal::builder::SignalBuilder;
use crate::signal::connection::{Connection, Node};
use crate::signal::shared::Shared;
use crate::upstream::Upstream;

/// Single-producer, multi-listener event dispatcher.
///
/// `Signal` is a cheap handle: clones share the same listeners. Values are
/// cloned once per listener, so wrap large payloads in an `Arc`.
///
/// # Example
/// ```
/// use signalbus::Signal;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let signal = Signal::<(u8, &'static str)>::new();
///
/// let sink = seen.clone();
/// let conn = signal.connect(move |(n, s)| {
///     sink.lock().unwrap().push(format!("{n}:{s}"));
///     async {}
/// });
///
/// signal.fire((1, "a"));
/// conn.disconnect();
/// signal.fire((2, "b"));
///
/// assert_eq!(*seen.lock().unwrap(), vec!["1:a".to_string()]);
/// ```
pub struct Signal<T> {
    pub(crate) shared: Arc<Shared<T>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + 'static,
{
    /// Creates an empty signal with the default configuration and the global runner pool.
    pub fn new() -> Self {
        SignalBuilder::new().build()
    }

    /// Starts a [`SignalBuilder`].
    pub fn builder() -> SignalBuilder<T> {
        SignalBuilder::new()
    }

    /// Creates a signal that re-fires every value emitted by `source`.
    ///
    /// The subscription is released by [`Signal::destroy`] (or when the last
    /// handle is dropped).
    pub fn wrap<U>(source: &U) -> Self
    where
        U: Upstream<T> + ?Sized,
    {
        SignalBuilder::new().wrap(source)
    }

    /// True if `value` is a `Signal<T>`.
    ///
    /// ```
    /// use signalbus::Signal;
    ///
    /// let s = Signal::<u32>::new();
    /// assert!(Signal::<u32>::is(&s));
    /// assert!(!Signal::<u32>::is(&5u32));
    /// assert!(!Signal::<u64>::is(&s));
    /// ```
    pub fn is(value: &dyn Any) -> bool {
        value.is::<Signal<T>>()
    }

    pub(crate) fn from_shared(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Configuration this signal was built with.
    pub fn config(&self) -> SignalConfig {
        self.shared.config
    }

    // ---- Registration ----

    /// Registers an async callback; it becomes the first listener to be delivered to.
    pub fn connect<F, Fut>(&self, f: F) -> Connection<T>
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.connect_listener(Arc::new(ListenerFn::anonymous(f)))
    }

    /// Registers an existing [`Listener`](crate::Listener).
    pub fn connect_listener(&self, listener: ListenerRef<T>) -> Connection<T> {
        Connection::from_node(self.shared.link(listener))
    }

    /// Registers a callback that is delivered to at most once.
    ///
    /// The connection is disconnected *before* `f` runs, so a fire issued from
    /// inside `f` does not reach it again.
    pub fn once<F, Fut>(&self, f: F) -> Connection<T>
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let slot: Arc<OnceLock<Weak<Node<T>>>> = Arc::new(OnceLock::new());
        let fired = AtomicBool::new(false);

        let own = Arc::clone(&slot);
        let conn = self.connect(move |value: T| {
            let first = !fired.swap(true, Ordering::AcqRel);
            if let Some(node) = own.get().and_then(Weak::upgrade) {
                node.disconnect();
            }
            let delivery = first.then(|| f(value));
            async move {
                if let Some(delivery) = delivery {
                    delivery.await;
                }
            }
        });

        let _ = slot.set(Arc::downgrade(conn.node()));
        conn
    }

    /// Snapshot of the current connections, most recently connected first.
    pub fn connections(&self) -> Vec<Connection<T>> {
        let mut out = Vec::new();
        self.shared.for_each_connected(|node| {
            out.push(Connection::from_node(Arc::clone(node)));
        });
        out
    }

    /// True if at least one listener is linked.
    pub fn is_connected_to(&self) -> bool {
        self.shared.has_connections()
    }

    /// Number of connected listeners.
    pub fn connection_count(&self) -> usize {
        let mut n = 0;
        self.shared.for_each_connected(|_| n += 1);
        n
    }

    // ---- Firing ----

    /// Delivers `value` to every connected listener, starting each one inline.
    ///
    /// Listeners run on the signal's runner pool until they first suspend; a
    /// suspended listener continues as its own tokio task and is not awaited.
    /// A listener that panics is logged and does not affect its siblings.
    pub fn fire(&self, value: T) {
        if self.shared.is_destroyed() {
            return;
        }
        let pool = &self.shared.pool;
        self.shared.for_each_connected(|node| {
            pool.acquire_and_run(node.id, invoke(node, value.clone()));
        });
    }

    /// Queues one task per connected listener; nothing runs before this returns.
    ///
    /// Each task re-checks the connection right before invoking its listener.
    /// Without a tokio runtime the call is logged and dropped.
    pub fn fire_deferred(&self, value: T) {
        if self.shared.is_destroyed() {
            return;
        }
        let Some(handle) = runtime_handle() else {
            tracing::error!("fire_deferred called outside a tokio runtime; dropping delivery");
            return;
        };
        self.shared.for_each_connected(|node| {
            let node = Arc::clone(node);
            let value = value.clone();
            handle.spawn(isolate(node.id, async move {
                if node.is_connected() {
                    node.listener.call(value).await;
                }
            }));
        });
    }

    /// Like [`fire_deferred`](Signal::fire_deferred), but the queued deliveries
    /// share one task and reuse the runner pool.
    ///
    /// Best effort: listeners of one batch run back to back on the same task
    /// until each first suspends. A listener that blocks the thread delays the
    /// rest of its batch, and the batch interleaves with other queued work
    /// differently from `fire_deferred`.
    pub fn fire_deferred_unsafe(&self, value: T) {
        if self.shared.is_destroyed() {
            return;
        }
        let Some(handle) = runtime_handle() else {
            tracing::error!("fire_deferred_unsafe called outside a tokio runtime; dropping delivery");
            return;
        };

        let mut batch = Vec::new();
        self.shared
            .for_each_connected(|node| batch.push(Arc::clone(node)));
        if batch.is_empty() {
            return;
        }

        let pool = Arc::clone(&self.shared.pool);
        handle.spawn(async move {
            for node in batch {
                if node.is_connected() {
                    pool.acquire_and_run(node.id, invoke(&node, value.clone()));
                }
            }
        });
    }

    /// `fire_deferred` or `fire`, depending on the configured [`DeliveryMode`](crate::DeliveryMode).
    pub fn fire_bindable(&self, value: T) {
        if self.shared.config.defers() {
            self.fire_deferred(value);
        } else {
            self.fire(value);
        }
    }

    /// `fire_deferred_unsafe` or `fire`, depending on the configured [`DeliveryMode`](crate::DeliveryMode).
    pub fn fire_bindable_unsafe(&self, value: T) {
        if self.shared.config.defers() {
            self.fire_deferred_unsafe(value);
        } else {
            self.fire(value);
        }
    }

    // ---- Teardown ----

    /// Disconnects every listener and cancels every pending [`wait`](Signal::wait).
    ///
    /// Cancelled waiters resolve to [`SignalError::Canceled`](crate::SignalError::Canceled).
    pub fn disconnect_all(&self) {
        self.shared.disconnect_all();
    }

    /// Disconnects everything, releases the upstream subscription and makes the
    /// signal inert.
    ///
    /// Other clones keep compiling but stop doing anything: fires are no-ops,
    /// new connections start disconnected, and `wait` fails with
    /// [`SignalError::Destroyed`](crate::SignalError::Destroyed).
    pub fn destroy(self) {
        self.shared.teardown();
    }

    /// True once [`destroy`](Signal::destroy) ran on any clone (or the owner scope ended).
    pub fn is_destroyed(&self) -> bool {
        self.shared.is_destroyed()
    }
}

fn invoke<T>(node: &Arc<Node<T>>, value: T) -> BoxFuture<'static, ()>
where
    T: Send + 'static,
{
    let listener = Arc::clone(&node.listener);
    async move { listener.call(value).await }.boxed()
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Signal<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connected", &self.shared.has_connections())
            .field("waiting", &self.shared.waiter_count())
            .field("destroyed", &self.shared.is_destroyed())
            .field("config", &self.shared.config)
            .finish()
    }
}
