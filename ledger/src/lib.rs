//! Reservation ledger for cultural events.
//!
//! Keeps event availability consistent with the reservations made against it,
//! on top of any [`DocumentStore`](reservation_ledger_core::DocumentStore):
//!
//! - **Authentication** against the seeded user accounts
//! - **Event catalogue** queries (open events, lookup by id)
//! - **Reservation lifecycle**: create, update quantity, cancel
//! - **Dashboard** statistics derived from a user's reservations
//!
//! # Consistency
//!
//! ```text
//! available(event) = seeded availability - Σ quantity(active reservations of event)
//! ```
//!
//! At most one active reservation exists per (user, event) pair; cancelling
//! frees the pair for a new reservation. Reservations are never deleted, and
//! `active → cancelled` is the only status transition.
//!
//! # Quick Start
//!
//! ```no_run
//! use reservation_ledger::{JsonFileStore, Ledger};
//! use reservation_ledger_core::environment::SystemClock;
//! use reservation_ledger_core::types::{CreateReservation, EventId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ledger = Ledger::new(JsonFileStore::new("./data"), SystemClock);
//! ledger.initialize().await?;
//!
//! let user = ledger.authenticate("admin", "1234").await?;
//! let created = ledger
//!     .create_reservation(CreateReservation::new(user.id, EventId::new(1)).with_quantity(2))
//!     .await?;
//! println!("reserved {} places", created.reservation.quantity);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collections;
pub mod config;
pub mod dashboard;
pub mod file_store;
pub mod ledger;
pub mod seed;

pub use config::{CapacityPolicy, Latency, LedgerConfig, LedgerOptions};
pub use dashboard::{DashboardSummary, ReservationPhase};
pub use file_store::JsonFileStore;
pub use ledger::{Ledger, CANCELLATION_MESSAGE};
pub use seed::SeedReport;
