//! Type-erased view of a signal.
//!
//! [`Dispatch`] lets code hold signals of different payload types side by side
//! (for example a `Vec<Box<dyn Dispatch>>` torn down together) and answers
//! "is this a signal?" through the trait object instead of by inspecting
//! concrete types.

use std::any::Any;

use crate::signal::core::Signal;

/// Operations on a signal that do not depend on its payload type.
pub trait Dispatch: Send + Sync {
    /// True if at least one listener is linked.
    fn is_connected_to(&self) -> bool;

    /// Number of connected listeners.
    fn connection_count(&self) -> usize;

    /// Disconnects every listener and cancels pending waiters.
    fn disconnect_all(&self);

    /// True once the signal was destroyed.
    fn is_destroyed(&self) -> bool;

    /// Upcast for downcasting back to the concrete `Signal<T>`.
    fn as_any(&self) -> &dyn Any;
}

impl<T> Dispatch for Signal<T>
where
    T: Clone + Send + 'static,
{
    fn is_connected_to(&self) -> bool {
        Signal::is_connected_to(self)
    }

    fn connection_count(&self) -> usize {
        Signal::connection_count(self)
    }

    fn disconnect_all(&self) {
        Signal::disconnect_all(self)
    }

    fn is_destroyed(&self) -> bool {
        Signal::is_destroyed(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
