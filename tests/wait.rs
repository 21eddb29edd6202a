// tests/wait.rs

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use signalbus::{Signal, SignalConfig, SignalError};
use tokio::time::timeout;

/// In-memory log sink for asserting on emitted records.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

async fn until_waiting<T: Clone + Send + 'static>(signal: &Signal<T>, n: usize) {
    timeout(Duration::from_secs(1), async {
        while signal.waiting() < n {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("waiters never registered");
}

#[tokio::test(flavor = "current_thread")]
async fn wait_resumes_with_fired_arguments() {
    let signal = Signal::<(i32, i32, i32)>::new();

    let waiter = {
        let signal = signal.clone();
        tokio::spawn(async move { signal.wait().await })
    };
    until_waiting(&signal, 1).await;

    signal.fire((10, 20, 30));

    let got = timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter did not resume")
        .expect("waiter task panicked");
    assert_eq!(got, Ok((10, 20, 30)));
    assert_eq!(signal.waiting(), 0);
    assert!(!signal.is_connected_to());
}

#[tokio::test(flavor = "current_thread")]
async fn concurrent_waiters_share_one_delivery() {
    let signal = Signal::<u64>::new();

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        })
        .collect();
    until_waiting(&signal, 3).await;

    signal.fire(99);

    for waiter in waiters {
        assert_eq!(waiter.await.expect("waiter task panicked"), Ok(99));
    }
}

#[tokio::test(flavor = "current_thread")]
async fn disconnect_all_cancels_pending_waits() {
    let captured = Captured::default();
    let _log = captured.install();

    let signal = Signal::<u8>::builder()
        .with_config(SignalConfig::default().with_debug(true))
        .build();

    let waiter = {
        let signal = signal.clone();
        tokio::spawn(async move { signal.wait().await })
    };
    until_waiting(&signal, 1).await;

    signal.disconnect_all();

    let got = timeout(Duration::from_secs(1), waiter)
        .await
        .expect("cancelled waiter did not finish")
        .expect("waiter task panicked");
    assert_eq!(got, Err(SignalError::Canceled));
    assert_eq!(signal.waiting(), 0);
    assert!(signal.connections().is_empty());
    assert!(
        captured.text().contains("cancelling pending wait on disconnect_all"),
        "debug trace missing: {}",
        captured.text()
    );

    // A fire after the cancellation reaches nobody.
    signal.fire(1);
}

#[tokio::test(flavor = "current_thread")]
async fn cancellation_is_silent_without_debug() {
    let captured = Captured::default();
    let _log = captured.install();

    let signal = Signal::<u8>::new();
    let waiter = {
        let signal = signal.clone();
        tokio::spawn(async move { signal.wait().await })
    };
    until_waiting(&signal, 1).await;

    signal.disconnect_all();

    assert_eq!(waiter.await.expect("waiter task panicked"), Err(SignalError::Canceled));
    assert!(!captured.text().contains("cancelling pending wait"));
}

#[tokio::test(flavor = "current_thread")]
async fn destroy_cancels_waits_and_rejects_new_ones() {
    let signal = Signal::<u8>::new();
    let handle = signal.clone();

    let waiter = tokio::spawn(async move { handle.wait().await });
    until_waiting(&signal, 1).await;

    let survivor = signal.clone();
    signal.destroy();

    assert_eq!(waiter.await.expect("waiter task panicked"), Err(SignalError::Canceled));
    assert_eq!(survivor.wait().await, Err(SignalError::Destroyed));
}

#[tokio::test(flavor = "current_thread")]
async fn abandoned_wait_unregisters_itself() {
    let signal = Signal::<u8>::new();

    let res = timeout(Duration::from_millis(20), signal.wait()).await;
    assert!(res.is_err(), "nothing was fired");

    assert_eq!(signal.waiting(), 0);
    assert!(!signal.is_connected_to());
}

#[tokio::test(flavor = "current_thread")]
async fn wait_sees_only_the_next_fire() {
    let signal = Signal::<&'static str>::new();
    signal.fire("before");

    let waiter = {
        let signal = signal.clone();
        tokio::spawn(async move { signal.wait().await })
    };
    until_waiting(&signal, 1).await;

    signal.fire("next");
    signal.fire("after");

    assert_eq!(waiter.await.expect("waiter task panicked"), Ok("next"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn wait_racing_destroy_always_resolves() {
    for _ in 0..200 {
        let signal = Signal::<u8>::new();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };
        let destroyer = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.destroy() })
        };

        destroyer.await.expect("destroy task panicked");
        let got = timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter parked after destroy")
            .expect("waiter task panicked");
        assert!(matches!(
            got,
            Err(SignalError::Canceled) | Err(SignalError::Destroyed)
        ));
        assert_eq!(signal.waiting(), 0);
    }
}
