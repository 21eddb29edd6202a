//! # LogListener — records fired values
//!
//! A minimal listener that emits one `tracing` event per delivery. Use it for
//! demos or to trace a noisy signal while debugging.
//!
//! ## Example output (with a `fmt` subscriber)
//! ```text
//! INFO signalbus: fired signal="sensor" value=21.5
//! ```

use std::borrow::Cow;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::listeners::Listener;

/// Listener that logs every value at `INFO` level.
#[derive(Debug, Clone)]
pub struct LogListener {
    label: Cow<'static, str>,
}

impl LogListener {
    /// Construct a new [`LogListener`]; `label` is attached to every record.
    #[must_use]
    pub fn new(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Default for LogListener {
    fn default() -> Self {
        Self::new("signal")
    }
}

#[async_trait]
impl<T> Listener<T> for LogListener
where
    T: Debug + Send + 'static,
{
    async fn call(&self, value: T) {
        tracing::info!(signal = %self.label, value = ?value, "fired");
    }

    fn name(&self) -> &str {
        "LogListener"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Signal;
    use std::sync::Arc;

    #[test]
    fn test_log_listener_accepts_any_debug_value() {
        let signal = Signal::<(u8, &'static str)>::new();
        let conn = signal.connect_listener(Arc::new(LogListener::new("pair")));
        signal.fire((1, "one"));
        assert!(conn.connected());
        assert_eq!(Listener::<(u8, &'static str)>::name(&LogListener::default()), "LogListener");
    }
}
