//! State shared by every handle of one signal, and the list operations on it.
//!
//! ## Locking
//! - `head` serializes structural mutation (insert, unlink, clear).
//! - each node's `next` is locked on its own and never while a listener runs.
//! - traversals take `head` only to read the first node, then walk `next`
//!   pointers one lock at a time, so they interleave freely with mutation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::config::SignalConfig;
use crate::listeners::ListenerRef;
use crate::runner::RunnerPool;
use crate::signal::connection::Node;
use crate::sync::lock;
use crate::upstream::UpstreamHandle;

pub(crate) struct Shared<T> {
    head: Mutex<Option<Arc<Node<T>>>>,
    upstream: Mutex<Option<UpstreamHandle>>,
    waiting: Mutex<HashMap<u64, CancellationToken>>,
    destroyed: AtomicBool,
    closed: CancellationToken,
    pub(crate) config: SignalConfig,
    pub(crate) pool: Arc<RunnerPool>,
}

impl<T> Shared<T> {
    pub(crate) fn new(config: SignalConfig, pool: Arc<RunnerPool>) -> Self {
        Self {
            head: Mutex::new(None),
            upstream: Mutex::new(None),
            waiting: Mutex::new(HashMap::new()),
            destroyed: AtomicBool::new(false),
            closed: CancellationToken::new(),
            config,
            pool,
        }
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Cancelled on teardown or when the last handle goes away.
    pub(crate) fn closed(&self) -> CancellationToken {
        self.closed.clone()
    }

    /// Prepends a node for `listener`; a destroyed signal hands back an unlinked, disconnected node.
    pub(crate) fn link(self: &Arc<Self>, listener: ListenerRef<T>) -> Arc<Node<T>> {
        if self.is_destroyed() {
            return Arc::new(Node::new(listener, None, Arc::downgrade(self), false));
        }
        let mut head = lock(&self.head);
        let node = Arc::new(Node::new(
            listener,
            head.take(),
            Arc::downgrade(self),
            true,
        ));
        *head = Some(Arc::clone(&node));
        node
    }

    /// Removes `node` from the list without touching `node.next`.
    pub(crate) fn unlink(&self, node: &Arc<Node<T>>) {
        let mut head = lock(&self.head);
        let mut prev = match head.as_ref() {
            Some(first) => Arc::clone(first),
            None => return,
        };
        if Arc::ptr_eq(&prev, node) {
            *head = node.next();
            return;
        }

        loop {
            match prev.next() {
                Some(next) if Arc::ptr_eq(&next, node) => {
                    let skip = node.next();
                    *lock(&prev.next) = skip;
                    return;
                }
                Some(next) => prev = next,
                None => return,
            }
        }
    }

    pub(crate) fn first(&self) -> Option<Arc<Node<T>>> {
        lock(&self.head).clone()
    }

    pub(crate) fn has_connections(&self) -> bool {
        lock(&self.head).is_some()
    }

    /// Visits every node that is connected at the moment it is reached.
    ///
    /// `next` is read after `f` returns, so listeners unlinked by `f` are skipped
    /// and listeners connected by `f` (new heads) are not reached.
    pub(crate) fn for_each_connected(&self, mut f: impl FnMut(&Arc<Node<T>>)) {
        let mut cursor = self.first();
        while let Some(node) = cursor {
            if node.is_connected() {
                f(&node);
            }
            cursor = node.next();
        }
    }

    pub(crate) fn register_waiter(&self, id: u64, token: CancellationToken) {
        lock(&self.waiting).insert(id, token);
    }

    pub(crate) fn remove_waiter(&self, id: u64) -> bool {
        lock(&self.waiting).remove(&id).is_some()
    }

    pub(crate) fn waiter_count(&self) -> usize {
        lock(&self.waiting).len()
    }

    pub(crate) fn set_upstream(&self, handle: UpstreamHandle) {
        let previous = lock(&self.upstream).replace(handle);
        if let Some(previous) = previous {
            previous.release();
        }
    }

    /// Disconnects every node, clears the list and cancels pending waiters.
    pub(crate) fn disconnect_all(&self) {
        let mut cursor = lock(&self.head).take();
        while let Some(node) = cursor {
            node.mark_disconnected();
            cursor = node.next();
        }

        let waiters: Vec<(u64, CancellationToken)> = lock(&self.waiting).drain().collect();
        for (id, token) in waiters {
            if token.is_cancelled() {
                continue;
            }
            if self.config.debug {
                tracing::warn!(
                    waiter = id,
                    backtrace = %std::backtrace::Backtrace::force_capture(),
                    "cancelling pending wait on disconnect_all"
                );
            }
            token.cancel();
        }
    }

    /// Full teardown: idempotent, used by `destroy()` and by owner scopes.
    pub(crate) fn teardown(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.disconnect_all();
        let upstream = lock(&self.upstream).take();
        if let Some(handle) = upstream {
            handle.release();
        }
        self.closed.cancel();
        tracing::debug!("signal destroyed");
    }
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        self.closed.cancel();
    }
}
