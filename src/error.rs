//! Error type used by the signal dispatcher.
//!
//! Most operations never fail: double disconnects and fires without
//! listeners are no-ops. [`SignalError`] covers the few places where a
//! caller has to learn that something did not happen:
//!
//! - a [`wait`](crate::Signal::wait) that was force-cancelled or issued on a
//!   destroyed signal;
//! - a configuration value that could not be parsed.
//!
//! Like the rest of the crate's diagnostics, the helpers (`as_label`,
//! `as_message`) exist for logs and metrics.

use thiserror::Error;

/// # Errors produced by the signal dispatcher.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// A pending `wait()` was cancelled by `disconnect_all()` or `destroy()`.
    #[error("wait cancelled by disconnect_all")]
    Canceled,

    /// The signal was destroyed before or during the operation.
    #[error("signal destroyed")]
    Destroyed,

    /// A delivery mode string did not match any known mode.
    #[error("invalid delivery mode {value:?}; expected \"immediate\" or \"deferred\"")]
    InvalidDeliveryMode {
        /// The rejected input.
        value: String,
    },
}

impl SignalError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use signalbus::SignalError;
    ///
    /// assert_eq!(SignalError::Canceled.as_label(), "signal_wait_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SignalError::Canceled => "signal_wait_canceled",
            SignalError::Destroyed => "signal_destroyed",
            SignalError::InvalidDeliveryMode { .. } => "signal_invalid_delivery_mode",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SignalError::Canceled => "wait cancelled".to_string(),
            SignalError::Destroyed => "signal destroyed".to_string(),
            SignalError::InvalidDeliveryMode { value } => {
                format!("invalid delivery mode: {value}")
            }
        }
    }

    /// True when the error ended a `wait()` without a delivered value.
    pub fn is_wait_abort(&self) -> bool {
        matches!(self, SignalError::Canceled | SignalError::Destroyed)
    }
}
