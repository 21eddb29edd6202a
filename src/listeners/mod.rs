//! # Listeners attached to a signal.
//!
//! This module provides the listener-related types:
//! - [`Listener`] - trait for async callbacks invoked with a fired value
//! - [`ListenerFn`] - closure-backed implementation
//! - [`ListenerRef`] - shared reference to a listener (`Arc<dyn Listener<T>>`)
//! - [`LogListener`] - records every value via `tracing` (feature `logging`)
//!
//! Most callers never name these types: [`Signal::connect`](crate::Signal::connect)
//! wraps a closure in a [`ListenerFn`] on their behalf. Implement [`Listener`]
//! directly when the callback carries its own state.

mod listener;
mod listener_fn;
#[cfg(feature = "logging")]
mod log;

pub use listener::{Listener, ListenerRef};
pub use listener_fn::ListenerFn;
#[cfg(feature = "logging")]
pub use log::LogListener;
