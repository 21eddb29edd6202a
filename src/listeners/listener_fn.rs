//! # Closure-backed listener (`ListenerFn`)
//!
//! [`ListenerFn`] wraps a closure `F: Fn(T) -> Fut`, producing a fresh future per
//! delivery. Nothing is shared between deliveries except what the closure
//! captures; share state explicitly through `Arc<...>`.
//!
//! ## Example
//! ```rust
//! use signalbus::{Listener, ListenerFn, ListenerRef};
//!
//! let l: ListenerRef<u32> = ListenerFn::arc("printer", |v: u32| async move {
//!     let _ = v;
//! });
//! assert_eq!(l.name(), "printer");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::listeners::listener::Listener;

/// Closure-backed listener.
#[derive(Debug)]
pub struct ListenerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ListenerFn<F> {
    /// Creates a named closure-backed listener.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates an unnamed listener (logs show it as `"listener"`).
    pub fn anonymous(f: F) -> Self {
        Self::new("listener", f)
    }

    /// Creates the listener and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<T, F, Fut> Listener<T> for ListenerFn<F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn call(&self, value: T) {
        (self.f)(value).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
