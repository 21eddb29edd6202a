//! # Runner: one reusable execution context.
//!
//! A [`Runner`] drives a listener future **once**, inline on the caller's stack,
//! using its own waker.
//!
//! ```text
//! run(fut)
//!   ├─ poll → Ready    ─► Completed  (runner may be reused)
//!   ├─ poll → Pending  ─► spawn(isolate(fut)) on the current runtime
//!   │                     ─► Suspended (runner is detached: its waker is
//!   │                        possibly held by whatever the listener awaits)
//!   └─ poll → panic    ─► Panicked   (logged, runner discarded)
//! ```
//!
//! The hand-off is safe because tokio polls a freshly spawned task at least
//! once, so the listener re-registers the task's waker on that poll.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use futures::future::BoxFuture;
use futures::task::{self, ArcWake};
use futures::FutureExt;
use tokio::runtime::Handle;

static RUNNER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Result of driving one listener through a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    /// Listener finished without suspending.
    Completed,
    /// Listener suspended and now runs as its own task (or was dropped when no runtime exists).
    Suspended,
    /// Listener panicked during the inline poll.
    Panicked,
}

/// Wake target of a runner; only records that a wake happened.
struct RunnerWake {
    woken: AtomicBool,
}

impl ArcWake for RunnerWake {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::Release);
    }
}

/// Reusable execution context.
pub(crate) struct Runner {
    id: u64,
    wake: Arc<RunnerWake>,
    waker: Waker,
    runs: u64,
}

impl Runner {
    pub(crate) fn new() -> Self {
        let wake = Arc::new(RunnerWake {
            woken: AtomicBool::new(false),
        });
        let waker = task::waker(Arc::clone(&wake));
        Self {
            id: RUNNER_SEQ.fetch_add(1, Ordering::Relaxed),
            wake,
            waker,
            runs: 0,
        }
    }

    /// Drives `fut` until its first suspension point.
    pub(crate) fn run(&mut self, connection: u64, mut fut: BoxFuture<'static, ()>) -> RunOutcome {
        self.runs += 1;
        self.wake.woken.store(false, Ordering::Release);

        let mut cx = Context::from_waker(&self.waker);
        let polled = panic::catch_unwind(AssertUnwindSafe(|| fut.as_mut().poll(&mut cx)));

        match polled {
            Ok(Poll::Ready(())) => RunOutcome::Completed,
            Ok(Poll::Pending) => {
                tracing::trace!(
                    runner = self.id,
                    connection,
                    runs = self.runs,
                    woken = self.wake.woken.load(Ordering::Acquire),
                    "listener suspended; detaching runner"
                );
                match runtime_handle() {
                    Some(handle) => {
                        handle.spawn(isolate(connection, fut));
                    }
                    None => {
                        tracing::error!(
                            connection,
                            "listener suspended outside a tokio runtime; dropping it"
                        );
                    }
                }
                RunOutcome::Suspended
            }
            Err(payload) => {
                tracing::error!(
                    runner = self.id,
                    connection,
                    panic = %panic_message(payload.as_ref()),
                    "listener panicked"
                );
                RunOutcome::Panicked
            }
        }
    }
}

/// Wraps a listener future so a panic is logged instead of tearing down the task.
pub(crate) async fn isolate<F>(connection: u64, fut: F)
where
    F: Future<Output = ()> + Send,
{
    if let Err(payload) = AssertUnwindSafe(fut).catch_unwind().await {
        tracing::error!(
            connection,
            panic = %panic_message(payload.as_ref()),
            "listener panicked"
        );
    }
}

/// Current tokio runtime, if the caller is inside one.
pub(crate) fn runtime_handle() -> Option<Handle> {
    Handle::try_current().ok()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
