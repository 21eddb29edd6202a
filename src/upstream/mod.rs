//! # Upstream adapter: drive a signal from an external event source.
//!
//! An external source only needs one capability, [`Upstream::subscribe`]: take a
//! sink, return a handle that stops the flow when released.
//!
//! ```text
//!  source ──emit(v)──► UpstreamSink ──► Signal::fire(v) ──► listeners
//!     ▲                                      │
//!     └──────── UpstreamHandle::release ◄────┘ destroy()
//! ```
//!
//! Built-in sources:
//! - `tokio::sync::broadcast::Sender<T>`: a forwarding task per wrapped signal;
//! - [`Signal<T>`](crate::Signal): chaining, via a plain connection;
//! - any `Fn(UpstreamSink<T>) -> UpstreamHandle` closure.

mod broadcast;
mod source;

pub use source::{Upstream, UpstreamHandle, UpstreamSink};
