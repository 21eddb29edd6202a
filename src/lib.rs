//! # signalbus
//!
//! **signalbus** is an in-process signal dispatcher for async Rust.
//!
//! A [`Signal<T>`] holds any number of async listeners and delivers every fired
//! value to each of them. Listeners can be removed at any time, including from
//! inside a delivery, and every listener runs in its own suspendable context so
//! a slow one never holds up the firer or its siblings.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   external source                 caller
//!  (broadcast, Signal, Fn)            │
//!          │ Upstream::subscribe      │ connect / once / connect_listener
//!          ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Signal<T>                                                        │
//! │  - connection list (head ─► Cn ─► ... ─► C1), lazy unlink         │
//! │  - waiters (wait() suspended on this signal)                      │
//! │  - upstream handle (released on destroy)                          │
//! │  - SignalConfig (delivery mode, debug)                            │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        │ fire             │ fire_deferred    │ fire_deferred_unsafe
//!        ▼                  ▼                  ▼
//!   RunnerPool         tokio::spawn        tokio::spawn(batch)
//!   (inline until      (one task per           │
//!    first suspension)  listener)              ▼
//!        │                                 RunnerPool
//!        └─ suspended ─► tokio::spawn (runner detached)
//! ```
//!
//! ### Delivery rules
//! ```text
//! fire(v):
//!   for node in list (most recent first):
//!     ├─► connected?  no ─► skip
//!     └─► yes ─► run listener(v) inline
//!                 ├─ completes      ─► runner back to the pool
//!                 ├─ suspends       ─► continues on its own task
//!                 └─ panics         ─► logged, siblings unaffected
//!
//! fire_deferred(v):
//!   for node in list: spawn { if still connected { listener(v).await } }
//!   (nothing runs before fire_deferred returns)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                      |
//! |-------------------|---------------------------------------------------------------|-----------------------------------------|
//! | **Dispatch**      | Connect listeners, fire immediately or deferred, await values.| [`Signal`], [`Connection`]              |
//! | **Listeners**     | Closures or stateful listener objects.                        | [`Listener`], [`ListenerFn`]            |
//! | **Upstream**      | Drive a signal from a broadcast channel or another signal.    | [`Upstream`], [`UpstreamHandle`]        |
//! | **Runners**       | Reuse of execution contexts for non-suspending listeners.     | [`RunnerPool`], [`PoolStats`]           |
//! | **Configuration** | Default delivery mode for `fire_bindable*`, debug traces.     | [`SignalConfig`], [`DeliveryMode`]      |
//! | **Errors**        | Why a `wait()` ended without a value.                         | [`SignalError`]                         |
//!
//! ## Optional features
//! - `logging`: exports [`LogListener`], a listener that records every value via `tracing`.
//!
//! ## Runtime
//! Listeners that never suspend work without any runtime. Suspending listeners,
//! the deferred modes, broadcast upstreams and owner scopes need a tokio
//! runtime; the ordering guarantees of the deferred modes are exact on a
//! `current_thread` runtime.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use signalbus::Signal;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let temperature = Signal::<f32>::new();
//!
//!     temperature.connect(|t| async move {
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!         println!("slow listener saw {t}");
//!     });
//!
//!     let waiter = {
//!         let temperature = temperature.clone();
//!         tokio::spawn(async move { temperature.wait().await })
//!     };
//!     while temperature.waiting() == 0 {
//!         tokio::task::yield_now().await;
//!     }
//!
//!     temperature.fire(21.5);
//!     assert_eq!(waiter.await??, 21.5);
//!
//!     temperature.destroy();
//!     Ok(())
//! }
//! ```
mod config;
mod error;
mod listeners;
mod runner;
mod signal;
mod sync;
mod upstream;

// ---- Public re-exports ----

pub use config::{DeliveryMode, SignalConfig, DEBUG_ENV, DELIVERY_ENV};
pub use error::SignalError;
pub use listeners::{Listener, ListenerFn, ListenerRef};
pub use runner::{PoolStats, RunnerPool};
pub use signal::{Connection, Dispatch, Signal, SignalBuilder};
pub use upstream::{Upstream, UpstreamHandle, UpstreamSink};

// Optional: a listener that logs every fired value.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogListener;
