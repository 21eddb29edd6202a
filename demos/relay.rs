//! # Example: relay
//!
//! Demonstrates the main delivery modes of a [`Signal`].
//!
//! Shows how to:
//! - Wrap a `tokio::sync::broadcast` channel into a signal.
//! - Attach a closure listener, a [`LogListener`] and a one-shot listener.
//! - Await the next value with `wait()`.
//! - Pick the `fire_bindable` mode from the environment.
//!
//! ## Flow
//! ```text
//! broadcast::Sender ──► Signal::wrap ──► fire ──┬─► LogListener
//!                                               ├─► slow listener (suspends)
//!                                               ├─► once listener
//!                                               └─► wait() in main
//! ```
//!
//! ## Run
//! ```bash
//! SIGNALBUS_DELIVERY=deferred RUST_LOG=info cargo run --example relay --features logging
//! ```

use std::{sync::Arc, time::Duration};

use signalbus::{LogListener, Signal, SignalConfig};
use tokio::sync::broadcast;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = SignalConfig::from_env()?;
    println!("[demo] delivery mode: {}", config.delivery);

    let (tx, _rx) = broadcast::channel::<u32>(64);
    let readings = Signal::<u32>::builder().with_config(config).wrap(&tx);

    readings.connect_listener(Arc::new(LogListener::new("readings")));

    readings.connect(|v| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        println!("[slow] processed reading {v}");
    });

    readings.once(|v| async move {
        println!("[once] first reading was {v}");
    });

    let waiter = {
        let readings = readings.clone();
        tokio::spawn(async move { readings.wait().await })
    };
    while readings.waiting() == 0 {
        tokio::task::yield_now().await;
    }

    for v in [3, 1, 4] {
        tx.send(v)?;
    }
    println!("[wait] resumed with {}", waiter.await??);

    readings.fire_bindable(15);
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("[demo] {} listeners before destroy", readings.connection_count());
    readings.destroy();
    Ok(())
}
