//! Configuration management for the reservation ledger.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// How strictly `create_reservation` and `update_reservation` guard capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityPolicy {
    /// Reject any request for more places than are available.
    #[default]
    Strict,
    /// Only reject when the event has no places left at all. A request larger
    /// than the remaining places still succeeds and drives availability negative.
    Permissive,
}

/// Unknown capacity policy name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown capacity policy '{0}' (expected 'strict' or 'permissive')")]
pub struct ParsePolicyError(String);

impl FromStr for CapacityPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

impl fmt::Display for CapacityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Permissive => write!(f, "permissive"),
        }
    }
}

/// Artificial per-operation delay, applied before an operation runs.
///
/// Purely cosmetic: it carries no retry or backpressure meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// `authenticate`
    pub authenticate: Duration,
    /// `list_events`
    pub list_events: Duration,
    /// `get_event`
    pub get_event: Duration,
    /// `list_reservations` and `dashboard`
    pub list_reservations: Duration,
    /// `get_reservation`
    pub get_reservation: Duration,
    /// `create_reservation`
    pub create_reservation: Duration,
    /// `update_reservation`
    pub update_reservation: Duration,
    /// `cancel_reservation`
    pub cancel_reservation: Duration,
}

impl Latency {
    /// No delay at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            authenticate: Duration::ZERO,
            list_events: Duration::ZERO,
            get_event: Duration::ZERO,
            list_reservations: Duration::ZERO,
            get_reservation: Duration::ZERO,
            create_reservation: Duration::ZERO,
            update_reservation: Duration::ZERO,
            cancel_reservation: Duration::ZERO,
        }
    }

    /// Delays resembling a remote backend.
    #[must_use]
    pub const fn simulated() -> Self {
        Self {
            authenticate: Duration::from_millis(800),
            list_events: Duration::from_millis(400),
            get_event: Duration::from_millis(300),
            list_reservations: Duration::from_millis(500),
            get_reservation: Duration::from_millis(300),
            create_reservation: Duration::from_millis(700),
            update_reservation: Duration::from_millis(600),
            cancel_reservation: Duration::from_millis(600),
        }
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self::none()
    }
}

/// Behavioral knobs of a [`Ledger`](crate::Ledger).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerOptions {
    /// Capacity guard used on create and update
    pub capacity_policy: CapacityPolicy,
    /// Largest quantity `update_reservation` accepts
    pub max_quantity: u32,
    /// Artificial delays
    pub latency: Latency,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            capacity_policy: CapacityPolicy::Strict,
            max_quantity: DEFAULT_MAX_QUANTITY,
            latency: Latency::none(),
        }
    }
}

/// Default ceiling on the quantity of an edited reservation.
pub const DEFAULT_MAX_QUANTITY: u32 = 10;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding the JSON documents
    pub data_dir: PathBuf,
    /// Whether operations sleep to imitate a network round trip
    pub simulate_latency: bool,
    /// Capacity guard
    pub capacity_policy: CapacityPolicy,
    /// Largest quantity `update_reservation` accepts
    pub max_quantity: u32,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            data_dir: env::var("LEDGER_DATA_DIR")
                .map_or_else(|_| PathBuf::from("./data"), PathBuf::from),
            simulate_latency: env::var("LEDGER_SIMULATE_LATENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
            capacity_policy: env::var("LEDGER_CAPACITY_POLICY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            max_quantity: env::var("LEDGER_MAX_QUANTITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|max| *max > 0)
                .unwrap_or(DEFAULT_MAX_QUANTITY),
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| "reservation_ledger=info".to_string()),
        }
    }

    /// The ledger options this configuration describes.
    #[must_use]
    pub const fn options(&self) -> LedgerOptions {
        LedgerOptions {
            capacity_policy: self.capacity_policy,
            max_quantity: self.max_quantity,
            latency: if self.simulate_latency {
                Latency::simulated()
            } else {
                Latency::none()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("strict".parse::<CapacityPolicy>().unwrap(), CapacityPolicy::Strict);
        assert_eq!(" Permissive ".parse::<CapacityPolicy>().unwrap(), CapacityPolicy::Permissive);
        assert!("lenient".parse::<CapacityPolicy>().is_err());
    }

    #[test]
    fn test_options_follow_latency_flag() {
        let mut config = LedgerConfig {
            data_dir: PathBuf::from("/tmp/ledger"),
            simulate_latency: false,
            capacity_policy: CapacityPolicy::Permissive,
            max_quantity: 4,
            log_level: "info".to_string(),
        };
        let options = config.options();
        assert_eq!(options.latency, Latency::none());
        assert_eq!(options.capacity_policy, CapacityPolicy::Permissive);
        assert_eq!(options.max_quantity, 4);

        config.simulate_latency = true;
        assert_eq!(config.options().latency.authenticate, Duration::from_millis(800));
    }

    #[test]
    fn test_default_options() {
        let options = LedgerOptions::default();
        assert_eq!(options.capacity_policy, CapacityPolicy::Strict);
        assert_eq!(options.max_quantity, DEFAULT_MAX_QUANTITY);
        assert_eq!(options.latency, Latency::none());
    }
}
