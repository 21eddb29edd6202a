use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::SignalConfig;
use crate::runner::{runtime_handle, RunnerPool};
use crate::signal::core::Signal;
use crate::signal::shared::Shared;
use crate::upstream::{Upstream, UpstreamSink};

/// Builder for constructing a [`Signal`] with non-default settings.
pub struct SignalBuilder<T> {
    config: SignalConfig,
    pool: Option<Arc<RunnerPool>>,
    scope: Option<CancellationToken>,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<T> SignalBuilder<T>
where
    T: Clone + Send + 'static,
{
    /// Creates a builder with [`SignalConfig::default`] and the global pool.
    pub fn new() -> Self {
        Self {
            config: SignalConfig::default(),
            pool: None,
            scope: None,
            _marker: std::marker::PhantomData,
        }
    }

    /// Sets the configuration (delivery mode for `fire_bindable*`, debug traces).
    pub fn with_config(mut self, config: SignalConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `pool` instead of [`RunnerPool::global`].
    pub fn with_pool(mut self, pool: Arc<RunnerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Ties the signal to an owner scope: cancelling `scope` destroys the signal.
    ///
    /// The scope is watched by a spawned task that ends with the scope or with
    /// the signal, whichever goes first. Outside a tokio runtime the scope is
    /// logged and ignored.
    pub fn with_scope(mut self, scope: CancellationToken) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Builds the signal.
    ///
    /// - Shared state with an empty listener list
    /// - Scope watcher (if a scope was set)
    pub fn build(self) -> Signal<T> {
        let pool = self.pool.unwrap_or_else(RunnerPool::global);
        let shared = Arc::new(Shared::new(self.config, pool));

        if let Some(scope) = self.scope {
            match runtime_handle() {
                Some(handle) => {
                    let weak = Arc::downgrade(&shared);
                    let closed = shared.closed();
                    handle.spawn(async move {
                        tokio::select! {
                            _ = closed.cancelled() => {}
                            _ = scope.cancelled() => {
                                if let Some(shared) = weak.upgrade() {
                                    tracing::debug!("owner scope ended; destroying signal");
                                    shared.teardown();
                                }
                            }
                        }
                    });
                }
                None => {
                    tracing::error!("owner scope set outside a tokio runtime; scope is not watched");
                }
            }
        }

        Signal::from_shared(shared)
    }

    /// Builds the signal and subscribes it to `source`.
    ///
    /// Every value `source` emits is forwarded through [`Signal::fire`]. The
    /// subscription handle is owned by the signal and released on destroy.
    pub fn wrap<U>(self, source: &U) -> Signal<T>
    where
        U: Upstream<T> + ?Sized,
    {
        let signal = self.build();
        let handle = source.subscribe(UpstreamSink::new(&signal));
        signal.shared.set_upstream(handle);
        signal
    }
}

impl<T> Default for SignalBuilder<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
