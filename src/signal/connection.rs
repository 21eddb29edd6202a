//! # Connections: list nodes and their public handle.
//!
//! Each registration is a [`Node`] linked into the owning signal's singly linked
//! list. The list is shared with in-flight traversals, so removal is **lazy**:
//!
//! ```text
//! before:   head ─► C ─► B ─► A ─► ∅
//! B.disconnect():
//!           head ─► C ─────► A ─► ∅
//!                      B ──┘          (B.next untouched)
//! ```
//!
//! A traversal already standing on `B` still reaches `A` through `B.next`, and
//! `B` itself is skipped from then on because its `connected` flag is false.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::listeners::ListenerRef;
use crate::signal::shared::Shared;
use crate::sync::lock;

static CONNECTION_SEQ: AtomicU64 = AtomicU64::new(1);

/// One listener registration.
pub(crate) struct Node<T> {
    pub(crate) id: u64,
    pub(crate) listener: ListenerRef<T>,
    connected: AtomicBool,
    pub(crate) next: Mutex<Option<Arc<Node<T>>>>,
    owner: Weak<Shared<T>>,
}

impl<T> Node<T> {
    pub(crate) fn new(
        listener: ListenerRef<T>,
        next: Option<Arc<Node<T>>>,
        owner: Weak<Shared<T>>,
        connected: bool,
    ) -> Self {
        Self {
            id: CONNECTION_SEQ.fetch_add(1, Ordering::Relaxed),
            listener,
            connected: AtomicBool::new(connected),
            next: Mutex::new(next),
            owner,
        }
    }

    #[inline]
    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Flips the flag without unlinking; returns whether this call did the flip.
    #[inline]
    pub(crate) fn mark_disconnected(&self) -> bool {
        self.connected.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn next(&self) -> Option<Arc<Node<T>>> {
        lock(&self.next).clone()
    }

    pub(crate) fn disconnect(self: &Arc<Self>) {
        if !self.mark_disconnected() {
            return;
        }
        if let Some(owner) = self.owner.upgrade() {
            owner.unlink(self);
        }
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        // Unwind the tail iteratively; recursive Arc drops overflow on long chains.
        // Stops at the first node someone else still holds; its own drop continues.
        let mut cursor = self
            .next
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        while let Some(node) = cursor {
            cursor = match Arc::try_unwrap(node) {
                Ok(mut node) => node
                    .next
                    .get_mut()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take(),
                Err(_) => None,
            };
        }
    }
}

/// Handle to one listener registration.
///
/// Cloning shares the registration; two handles are equal when they refer to
/// the same registration.
pub struct Connection<T> {
    node: Arc<Node<T>>,
}

impl<T> Connection<T> {
    pub(crate) fn from_node(node: Arc<Node<T>>) -> Self {
        Self { node }
    }

    pub(crate) fn node(&self) -> &Arc<Node<T>> {
        &self.node
    }

    /// True until the connection is disconnected; never becomes true again.
    pub fn connected(&self) -> bool {
        self.node.is_connected()
    }

    /// Stops further deliveries and unlinks the listener from its signal.
    ///
    /// Idempotent. A delivery already running when this is called is not
    /// interrupted.
    pub fn disconnect(&self) {
        self.node.disconnect();
    }

    /// Alias of [`Connection::disconnect`].
    pub fn destroy(&self) {
        self.disconnect();
    }

    /// Process-unique id, as used in log records.
    pub fn id(&self) -> u64 {
        self.node.id
    }
}

impl<T> Clone for Connection<T> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<T> PartialEq for Connection<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }
}

impl<T> Eq for Connection<T> {}

impl<T: 'static> fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.node.id)
            .field("connected", &self.connected())
            .field("listener", &self.node.listener.name())
            .finish()
    }
}
