use std::fmt;
use std::sync::{Arc, Weak};

use crate::signal::{Shared, Signal};

/// An event source a signal can be wrapped around.
///
/// # Example
/// ```
/// use signalbus::{Signal, UpstreamHandle, UpstreamSink};
/// use std::sync::{Arc, Mutex};
///
/// // A hand-rolled source: keeps its sinks in a list.
/// let sinks: Arc<Mutex<Vec<UpstreamSink<u32>>>> = Arc::default();
/// let registry = sinks.clone();
/// let source = move |sink: UpstreamSink<u32>| {
///     registry.lock().unwrap().push(sink);
///     UpstreamHandle::noop()
/// };
///
/// let signal = Signal::<u32>::wrap(&source);
/// let total = Arc::new(Mutex::new(0));
/// let t = total.clone();
/// signal.connect(move |v| { *t.lock().unwrap() += v; async {} });
///
/// for sink in sinks.lock().unwrap().iter() {
///     sink.emit(7);
/// }
/// assert_eq!(*total.lock().unwrap(), 7);
/// ```
pub trait Upstream<T> {
    /// Starts delivering events into `sink`; the returned handle stops it.
    fn subscribe(&self, sink: UpstreamSink<T>) -> UpstreamHandle;
}

impl<T, F> Upstream<T> for F
where
    F: Fn(UpstreamSink<T>) -> UpstreamHandle,
{
    fn subscribe(&self, sink: UpstreamSink<T>) -> UpstreamHandle {
        self(sink)
    }
}

/// Entry point of a wrapped signal, handed to [`Upstream::subscribe`].
///
/// Holds the signal weakly: a source never keeps a signal alive, and emitting
/// into a dropped or destroyed signal reports `false`.
pub struct UpstreamSink<T> {
    target: Weak<Shared<T>>,
}

impl<T> UpstreamSink<T>
where
    T: Clone + Send + 'static,
{
    pub(crate) fn new(signal: &Signal<T>) -> Self {
        Self {
            target: Arc::downgrade(&signal.shared),
        }
    }

    /// Fires `value` on the wrapped signal.
    ///
    /// Returns `false` once the signal is gone, so forwarding loops can stop.
    pub fn emit(&self, value: T) -> bool {
        match self.target.upgrade() {
            Some(shared) if !shared.is_destroyed() => {
                Signal::from_shared(shared).fire(value);
                true
            }
            _ => false,
        }
    }

    /// True while the wrapped signal can still receive values.
    pub fn is_open(&self) -> bool {
        self.target
            .upgrade()
            .is_some_and(|shared| !shared.is_destroyed())
    }
}

impl<T> Clone for UpstreamSink<T> {
    fn clone(&self) -> Self {
        Self {
            target: Weak::clone(&self.target),
        }
    }
}

impl<T> fmt::Debug for UpstreamSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamSink")
            .field("alive", &(self.target.strong_count() > 0))
            .finish()
    }
}

/// Releases an upstream subscription.
///
/// Released explicitly by [`UpstreamHandle::release`], or implicitly on drop.
pub struct UpstreamHandle {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl UpstreamHandle {
    /// Wraps the action that ends the subscription.
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A handle with nothing to release.
    pub fn noop() -> Self {
        Self { release: None }
    }

    /// Ends the subscription now.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for UpstreamHandle {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for UpstreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamHandle")
            .field("pending", &self.release.is_some())
            .finish()
    }
}

// Chaining: a signal is itself a valid upstream.
impl<T> Upstream<T> for Signal<T>
where
    T: Clone + Send + 'static,
{
    fn subscribe(&self, sink: UpstreamSink<T>) -> UpstreamHandle {
        let conn = self.connect(move |value: T| {
            sink.emit(value);
            futures::future::ready(())
        });
        UpstreamHandle::new(move || conn.disconnect())
    }
}
