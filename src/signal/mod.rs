//! # Dispatch engine.
//!
//! [`Signal`] owns a singly linked list of [`Connection`]s and delivers fired
//! values to them.
//!
//! ## Architecture
//! ```text
//!   connect / once ──► Shared::link ──► head ─► C3 ─► C2 ─► C1 ─► ∅
//!                                        ▲
//!   fire* ──► Shared::for_each_connected ┘ (one walk per fire)
//!                 │
//!                 ├─ fire ─────────────► RunnerPool (inline until suspension)
//!                 ├─ fire_deferred ────► tokio::spawn per listener
//!                 └─ fire_deferred_unsafe ► tokio::spawn(batch) ─► RunnerPool
//!
//!   wait() ──► waiters (id → CancellationToken) + once listener
//!   disconnect_all() ──► flags off, head = ∅, cancel waiters
//!   destroy() ──► disconnect_all + release upstream + inert
//! ```
//!
//! Internal modules:
//! - [`connection`]: list nodes and the public [`Connection`] handle;
//! - [`shared`]: shared state and list mutation;
//! - [`core`]: registration and firing;
//! - [`wait`]: `Signal::wait`;
//! - [`builder`]: [`SignalBuilder`];
//! - [`dispatch`]: the type-erased [`Dispatch`] trait.

mod builder;
mod connection;
mod core;
mod dispatch;
mod shared;
mod wait;

pub use builder::SignalBuilder;
pub use connection::Connection;
pub use core::Signal;
pub use dispatch::Dispatch;

pub(crate) use shared::Shared;
