// tests/upstream.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future;
use signalbus::{Signal, UpstreamHandle, UpstreamSink};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

type Log = Arc<Mutex<Vec<(u32, String)>>>;

fn pushing(log: &Log) -> impl Fn((u32, String)) -> future::Ready<()> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |v| {
        log.lock().unwrap().push(v);
        future::ready(())
    }
}

async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    timeout(Duration::from_secs(1), async {
        while !check() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}

#[tokio::test(flavor = "current_thread")]
async fn broadcast_values_are_refired_unchanged() {
    let (tx, _keep) = broadcast::channel::<(u32, String)>(16);
    let signal = Signal::<(u32, String)>::wrap(&tx);

    let log: Log = Arc::default();
    signal.connect(pushing(&log));

    tx.send((1, "one".into())).expect("receiver alive");
    tx.send((2, "two".into())).expect("receiver alive");

    eventually("forwarded values", || log.lock().unwrap().len() == 2).await;
    assert_eq!(
        *log.lock().unwrap(),
        vec![(1, "one".to_string()), (2, "two".to_string())]
    );
}

#[tokio::test(flavor = "current_thread")]
async fn destroy_stops_broadcast_forwarding() {
    let (tx, _keep) = broadcast::channel::<(u32, String)>(16);
    let signal = Signal::<(u32, String)>::wrap(&tx);
    assert_eq!(tx.receiver_count(), 2);

    signal.destroy();

    eventually("forwarding task exit", || tx.receiver_count() == 1).await;
}

#[tokio::test(flavor = "current_thread")]
async fn dropping_the_last_handle_releases_the_subscription() {
    let (tx, _keep) = broadcast::channel::<(u32, String)>(16);
    let signal = Signal::<(u32, String)>::wrap(&tx);
    drop(signal);

    eventually("forwarding task exit", || tx.receiver_count() == 1).await;
}

#[test]
fn custom_source_is_released_on_destroy() {
    let released = Arc::new(AtomicBool::new(false));
    let sinks: Arc<Mutex<Vec<UpstreamSink<(u32, String)>>>> = Arc::default();

    let source = {
        let released = Arc::clone(&released);
        let sinks = Arc::clone(&sinks);
        move |sink: UpstreamSink<(u32, String)>| {
            sinks.lock().unwrap().push(sink);
            let released = Arc::clone(&released);
            UpstreamHandle::new(move || released.store(true, Ordering::SeqCst))
        }
    };

    let signal = Signal::<(u32, String)>::wrap(&source);
    let log: Log = Arc::default();
    signal.connect(pushing(&log));

    let sink = sinks.lock().unwrap()[0].clone();
    assert!(sink.emit((3, "three".into())));
    assert_eq!(*log.lock().unwrap(), vec![(3, "three".to_string())]);

    signal.destroy();
    assert!(released.load(Ordering::SeqCst));
    assert!(!sink.emit((4, "four".into())));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test(flavor = "current_thread")]
async fn owner_scope_destroys_the_signal() {
    let scope = CancellationToken::new();
    let signal = Signal::<(u32, String)>::builder()
        .with_scope(scope.clone())
        .build();

    let log: Log = Arc::default();
    let conn = signal.connect(pushing(&log));

    scope.cancel();
    eventually("scope teardown", || signal.is_destroyed()).await;

    assert!(!conn.connected());
    signal.fire((9, "late".into()));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn scope_watchers_end_with_their_signals() {
    let app = CancellationToken::new();
    let metrics = tokio::runtime::Handle::current().metrics();

    for _ in 0..50 {
        let signal = Signal::<u32>::builder().with_scope(app.clone()).build();
        signal.destroy();
    }
    for _ in 0..50 {
        drop(Signal::<u32>::builder().with_scope(app.clone()).build());
    }

    eventually("scope watchers to exit", || metrics.num_alive_tasks() == 0).await;
    assert!(!app.is_cancelled());
}

#[test]
fn scope_outside_a_runtime_is_ignored() {
    let scope = CancellationToken::new();
    let signal = Signal::<(u32, String)>::builder()
        .with_scope(scope.clone())
        .build();

    let log: Log = Arc::default();
    signal.connect(pushing(&log));

    scope.cancel();
    assert!(!signal.is_destroyed());
    signal.fire((1, "still live".into()));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn broadcast_outside_a_runtime_forwards_nothing() {
    let (tx, _keep) = broadcast::channel::<(u32, String)>(4);
    let signal = Signal::<(u32, String)>::wrap(&tx);

    let log: Log = Arc::default();
    signal.connect(pushing(&log));

    assert_eq!(tx.receiver_count(), 1);
    tx.send((1, "via channel".into())).expect("receiver kept alive");
    signal.fire((2, "direct".into()));

    assert_eq!(*log.lock().unwrap(), vec![(2, "direct".to_string())]);
}
