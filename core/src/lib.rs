//! # Reservation Ledger Core
//!
//! Core types and traits for the reservation ledger.
//!
//! This crate provides the data model and the seams the ledger is built around:
//!
//! - **Types**: Users, cultural events and the reservations that consume their capacity
//! - **Errors**: A closed set of typed failures callers can branch on
//! - **Store**: A synchronous key-to-JSON-document storage abstraction
//! - **Environment**: Injected dependencies (the clock) so operations stay deterministic in tests
//!
//! ## Consistency Model
//!
//! ```text
//! event.available = seeded availability - Σ quantity(active reservations of event)
//! ```
//!
//! The ledger crate maintains this relation across create, update and cancel.
//! Nothing in this crate performs I/O on its own.
//!
//! ## Example
//!
//! ```
//! use reservation_ledger_core::types::{Reservation, ReservationId, ReservationStatus, UserId, EventId};
//! use chrono::Utc;
//!
//! let now = Utc::now();
//! let mut reservation = Reservation::new(ReservationId::new(1), UserId::new(1), EventId::new(1), 2, now);
//! assert!(reservation.is_active());
//!
//! reservation.cancel(now).unwrap();
//! assert_eq!(reservation.status, ReservationStatus::Cancelled);
//! assert!(reservation.cancel(now).is_err());
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, Utc};
pub use serde::{Deserialize, Serialize};

pub mod error;
pub mod store;
pub mod types;

pub use error::{ErrorKind, LedgerError, Result};
pub use store::{DocumentStore, StoreError};

/// Environment module - Dependency injection traits
///
/// All time-dependent behavior of the ledger goes through [`Clock`](environment::Clock),
/// which lets tests pin or step time instead of reading the wall clock.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use reservation_ledger_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
        fn now(&self) -> DateTime<Utc> {
            (**self).now()
        }
    }
}
