//! Execution contexts for listener invocations.
//!
//! Every listener invocation gets its own suspendable context. Creating one per
//! call would mean one task spawn per listener per fire, so the pool drives a
//! listener inline first and only hands it to the runtime when it actually
//! suspends.
//!
//! Internal modules:
//! - [`context`]: a single [`Runner`](context::Runner) and the panic guard used for spawned work;
//! - [`pool`]: [`RunnerPool`], the one-slot cache of idle runners.

mod context;
mod pool;

pub(crate) use context::{isolate, runtime_handle};
pub use pool::{PoolStats, RunnerPool};
