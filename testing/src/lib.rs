//! # Reservation Ledger Testing
//!
//! Testing utilities and helpers for the reservation ledger.
//!
//! This crate provides:
//! - Mock implementations of Environment traits (clocks)
//! - An in-memory [`DocumentStore`](reservation_ledger_core::DocumentStore)
//! - Fixture builders for users, events and reservations
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use reservation_ledger::Ledger;
//! use reservation_ledger_testing::{stepping_clock, InMemoryDocumentStore};
//!
//! #[tokio::test]
//! async fn test_reserve() {
//!     let store = InMemoryDocumentStore::new();
//!     let ledger = Ledger::new(store.clone(), stepping_clock());
//!     ledger.initialize().await.unwrap();
//!
//!     let events = ledger.list_events().await.unwrap();
//!     assert_eq!(events.len(), 5);
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use reservation_ledger_core::environment::Clock;

mod store_mocks;

pub use store_mocks::InMemoryDocumentStore;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Duration, Utc};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use reservation_ledger_testing::mocks::FixedClock;
    /// use reservation_ledger_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step every time it is read.
    ///
    /// Successive operations observe strictly increasing timestamps, which keeps
    /// "most recent first" orderings deterministic in tests.
    ///
    /// # Example
    ///
    /// ```
    /// use reservation_ledger_testing::mocks::SteppingClock;
    /// use reservation_ledger_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let start = Utc::now();
    /// let clock = SteppingClock::new(start, Duration::seconds(1));
    /// assert_eq!(clock.now(), start);
    /// assert_eq!(clock.now(), start + Duration::seconds(1));
    /// ```
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl SteppingClock {
        /// Create a clock starting at `start` and advancing by `step` per read
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = match self.next.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let current = *next;
            *next = current + self.step;
            current
        }
    }

    /// Create a default fixed clock for tests (2025-11-15 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(test_epoch())
    }

    /// Create a stepping clock for tests starting at 2025-11-15 00:00:00 UTC and
    /// advancing one second per read.
    #[must_use]
    pub fn stepping_clock() -> SteppingClock {
        SteppingClock::new(test_epoch(), Duration::seconds(1))
    }

    /// The instant every test clock starts from.
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-11-15T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc)
    }
}

/// Fixture builders for domain records.
pub mod fixtures {
    use chrono::{DateTime, NaiveDate, Utc};
    use reservation_ledger_core::types::{
        Event, EventId, Reservation, ReservationId, User, UserId,
    };

    /// A user with the given id and username, password `"secret"`.
    #[must_use]
    pub fn user(id: i64, username: &str) -> User {
        User {
            id: UserId::new(id),
            username: username.to_string(),
            password: "secret".to_string(),
            name: format!("User {id}"),
            email: format!("{username}@example.com"),
        }
    }

    /// An event with the given capacity and availability on `date`.
    #[must_use]
    pub fn event(id: i64, capacity: u32, available: i64, date: NaiveDate) -> Event {
        Event {
            id: EventId::new(id),
            name: format!("Event {id}"),
            date,
            time: "19:00".to_string(),
            location: "Teatro Municipal".to_string(),
            description: "Fixture event".to_string(),
            category: "Teatro".to_string(),
            price: 10_000,
            capacity,
            available,
            image: None,
        }
    }

    /// An active reservation created at `at`.
    #[must_use]
    pub const fn reservation(
        id: i64,
        user_id: i64,
        event_id: i64,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> Reservation {
        Reservation::new(
            ReservationId::new(id),
            UserId::new(user_id),
            EventId::new(event_id),
            quantity,
            at,
        )
    }
}

/// Property-based testing utilities
///
/// Strategies that generate sequences of ledger operations against the seeded
/// catalogue (users 1..=3, events 1..=6 where 6 does not exist).
pub mod properties {
    use proptest::prelude::*;

    /// A ledger operation expressed with plain indices so strategies stay
    /// independent from generated reservation ids.
    #[derive(Debug, Clone)]
    pub enum LedgerOp {
        /// Create a reservation
        Create {
            /// Raw user id
            user_id: i64,
            /// Raw event id
            event_id: i64,
            /// Requested places
            quantity: u32,
        },
        /// Update the n-th reservation created so far (modulo count)
        Update {
            /// Index into the reservations created so far
            index: usize,
            /// New quantity
            quantity: u32,
        },
        /// Cancel the n-th reservation created so far (modulo count)
        Cancel {
            /// Index into the reservations created so far
            index: usize,
        },
    }

    /// Strategy for a single operation.
    pub fn ledger_op() -> impl Strategy<Value = LedgerOp> {
        prop_oneof![
            3 => (1i64..=3, 1i64..=6, 1u32..=12).prop_map(|(user_id, event_id, quantity)| {
                LedgerOp::Create { user_id, event_id, quantity }
            }),
            2 => (any::<usize>(), 0u32..=12)
                .prop_map(|(index, quantity)| LedgerOp::Update { index, quantity }),
            2 => any::<usize>().prop_map(|index| LedgerOp::Cancel { index }),
        ]
    }

    /// Strategy for a sequence of up to `max_len` operations.
    pub fn ledger_ops(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
        prop::collection::vec(ledger_op(), 0..max_len)
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, SteppingClock, stepping_clock, test_clock, test_epoch};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_stepping_clock_advances() {
        let clock = stepping_clock();
        let first = clock.now();
        let second = clock.now();
        assert_eq!(second - first, Duration::seconds(1));
        assert_eq!(first, test_epoch());
    }
}
