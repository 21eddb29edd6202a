//! # Dispatcher configuration.
//!
//! Provides [`SignalConfig`], the settings a [`Signal`](crate::Signal) is built with,
//! and [`DeliveryMode`], the process-wide default used by the `fire_bindable*` family.
//!
//! Config is resolved once by the application (typically at startup, see
//! [`SignalConfig::from_env`]) and injected through
//! [`SignalBuilder::with_config`](crate::SignalBuilder::with_config).
//! Nothing in the crate reads the environment on its own.
//!
//! ## Environment
//! - `SIGNALBUS_DELIVERY`: `immediate` (default) or `deferred`
//! - `SIGNALBUS_DEBUG`: `1`/`true` enables cancellation traces

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::SignalError;

/// Environment variable holding the default delivery mode.
pub const DELIVERY_ENV: &str = "SIGNALBUS_DELIVERY";

/// Environment variable enabling debug traces.
pub const DEBUG_ENV: &str = "SIGNALBUS_DEBUG";

/// Default delivery mode mirrored by `fire_bindable` / `fire_bindable_unsafe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// Listeners start running inside the firing call (`fire`).
    #[default]
    Immediate,
    /// Listeners run after the current step completes (`fire_deferred*`).
    Deferred,
}

impl DeliveryMode {
    /// Stable lowercase name, the same string [`FromStr`] accepts.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Immediate => "immediate",
            DeliveryMode::Deferred => "deferred",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMode {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" | "sync" => Ok(DeliveryMode::Immediate),
            "deferred" => Ok(DeliveryMode::Deferred),
            _ => Err(SignalError::InvalidDeliveryMode {
                value: s.to_string(),
            }),
        }
    }
}

/// Settings for a single signal.
///
/// ## Field semantics
/// - `delivery`: target of `fire_bindable` / `fire_bindable_unsafe`
/// - `debug`: emit a `tracing` warning with a backtrace for every waiter cancelled by `disconnect_all`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignalConfig {
    /// Delivery mode selected for the bindable fire family.
    pub delivery: DeliveryMode,

    /// Log forced cancellation of pending `wait()` calls.
    pub debug: bool,
}

impl SignalConfig {
    /// Reads [`DELIVERY_ENV`] and [`DEBUG_ENV`].
    ///
    /// Unset variables fall back to the defaults; a malformed delivery mode is
    /// reported instead of being silently ignored.
    pub fn from_env() -> Result<Self, SignalError> {
        let delivery = match env::var(DELIVERY_ENV) {
            Ok(raw) => raw.parse()?,
            Err(_) => DeliveryMode::default(),
        };
        let debug = env::var(DEBUG_ENV)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(false);
        Ok(Self { delivery, debug })
    }

    /// Returns a copy with the given delivery mode.
    #[must_use]
    pub fn with_delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    /// Returns a copy with debug traces toggled.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// True when `fire_bindable*` should take the deferred path.
    #[inline]
    pub fn defers(&self) -> bool {
        self.delivery == DeliveryMode::Deferred
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_immediate_without_debug() {
        let cfg = SignalConfig::default();
        assert_eq!(cfg.delivery, DeliveryMode::Immediate);
        assert!(!cfg.debug);
        assert!(!cfg.defers());
    }

    #[test]
    fn test_delivery_mode_parsing() {
        assert_eq!("deferred".parse::<DeliveryMode>(), Ok(DeliveryMode::Deferred));
        assert_eq!(" Immediate ".parse::<DeliveryMode>(), Ok(DeliveryMode::Immediate));
        assert_eq!(
            "later".parse::<DeliveryMode>(),
            Err(SignalError::InvalidDeliveryMode {
                value: "later".into()
            })
        );
    }

    #[test]
    fn test_display_matches_parser() {
        for mode in [DeliveryMode::Immediate, DeliveryMode::Deferred] {
            assert_eq!(mode.to_string().parse::<DeliveryMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_builders() {
        let cfg = SignalConfig::default()
            .with_delivery(DeliveryMode::Deferred)
            .with_debug(true);
        assert!(cfg.defers());
        assert!(cfg.debug);
    }
}
