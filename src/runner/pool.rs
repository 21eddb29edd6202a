//! # RunnerPool: one-slot cache of idle execution contexts.
//!
//! [`RunnerPool`] keeps at most **one** idle [`Runner`] around. A listener that
//! finishes without suspending gives its runner back; a listener that suspends
//! keeps it for good (the runner is detached and forgotten), and the next
//! demand creates a fresh one.
//!
//! ## Rules
//! - The idle slot is never locked while a listener runs, so listeners may fire
//!   other signals (or the same one) re-entrantly; nested calls simply create
//!   another runner and the surplus is dropped on release.
//! - No upper bound on detached runners: each one lives exactly as long as the
//!   suspended listener it carries.
//!
//! ## Diagram
//! ```text
//!  acquire_and_run(fut)
//!        │
//!        ├─ idle slot: Some(r) ─► take r          (reused += 1)
//!        └─ idle slot: None    ─► Runner::new()   (created += 1)
//!                 │
//!                 ▼
//!            r.run(fut) ──► Completed ─► slot = Some(r) (if still empty)
//!                       ──► Suspended ─► drop r          (detached += 1)
//!                       ──► Panicked  ─► drop r
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use futures::future::BoxFuture;

use super::context::{RunOutcome, Runner};
use crate::sync::lock;

/// Counters describing how a pool has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Runners created because the slot was empty.
    pub created: u64,
    /// Invocations served by the cached runner.
    pub reused: u64,
    /// Runners given up because their listener suspended.
    pub detached: u64,
}

/// Single-slot cache of reusable execution contexts.
///
/// Signals share the process-wide [`RunnerPool::global`] unless one is injected
/// with [`SignalBuilder::with_pool`](crate::SignalBuilder::with_pool).
#[derive(Default)]
pub struct RunnerPool {
    idle: Mutex<Option<Runner>>,
    created: AtomicU64,
    reused: AtomicU64,
    detached: AtomicU64,
}

impl RunnerPool {
    /// Creates an empty pool; the first invocation creates its runner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide pool used by signals built without an explicit one.
    pub fn global() -> Arc<RunnerPool> {
        static GLOBAL: OnceLock<Arc<RunnerPool>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(RunnerPool::new())))
    }

    /// True if a runner is cached and ready for the next invocation.
    pub fn has_idle(&self) -> bool {
        lock(&self.idle).is_some()
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            detached: self.detached.load(Ordering::Relaxed),
        }
    }

    /// Runs `fut` on a cached or fresh runner until it completes or first suspends.
    ///
    /// Returns once the inline part is over; a suspended listener continues on
    /// its own task and is never awaited here.
    pub(crate) fn acquire_and_run(
        &self,
        connection: u64,
        fut: BoxFuture<'static, ()>,
    ) -> RunOutcome {
        let mut runner = self.acquire();
        let outcome = runner.run(connection, fut);

        match outcome {
            RunOutcome::Completed => self.release(runner),
            RunOutcome::Suspended => {
                self.detached.fetch_add(1, Ordering::Relaxed);
            }
            RunOutcome::Panicked => {}
        }
        outcome
    }

    fn acquire(&self) -> Runner {
        let cached = lock(&self.idle).take();
        match cached {
            Some(runner) => {
                self.reused.fetch_add(1, Ordering::Relaxed);
                runner
            }
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                Runner::new()
            }
        }
    }

    fn release(&self, runner: Runner) {
        let mut slot = lock(&self.idle);
        if slot.is_none() {
            *slot = Some(runner);
        }
    }
}

impl std::fmt::Debug for RunnerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerPool")
            .field("idle", &self.has_idle())
            .field("stats", &self.stats())
            .finish()
    }
}
