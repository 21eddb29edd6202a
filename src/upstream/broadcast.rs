//! # `tokio::sync::broadcast` as an upstream source.
//!
//! Wrapping a broadcast sender spawns one forwarding task that receives from a
//! fresh receiver and fires each value on the signal.
//!
//! ```text
//!   Sender<T> ──► Receiver<T> ──► forwarding task ──► UpstreamSink::emit ──► Signal::fire
//!                                    ▲
//!                      CancellationToken (UpstreamHandle::release)
//! ```
//!
//! ## Rules
//! - A receiver only gets values **sent after** the signal is wrapped.
//! - **Lag handling**: if the signal falls behind by more than the channel
//!   capacity, the skipped count is logged and forwarding continues.
//! - The task ends when the handle is released, the channel closes, or the
//!   signal is gone.
//! - Outside a tokio runtime nothing is forwarded: the error is logged and a
//!   no-op handle is returned.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;

use super::source::{Upstream, UpstreamHandle, UpstreamSink};
use crate::runner::runtime_handle;

impl<T> Upstream<T> for broadcast::Sender<T>
where
    T: Clone + Send + 'static,
{
    fn subscribe(&self, sink: UpstreamSink<T>) -> UpstreamHandle {
        let Some(handle) = runtime_handle() else {
            tracing::error!("broadcast upstream wrapped outside a tokio runtime; nothing is forwarded");
            return UpstreamHandle::noop();
        };
        let mut rx = broadcast::Sender::subscribe(self);
        let token = CancellationToken::new();
        let stop = token.clone();

        handle.spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(value) => {
                            if !sink.emit(value) {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "upstream lagged; values dropped");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("upstream forwarding stopped");
        });

        UpstreamHandle::new(move || token.cancel())
    }
}
