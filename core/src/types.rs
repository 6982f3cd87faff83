//! Domain types for the reservation ledger.
//!
//! Users, cultural events and reservations, plus the request and response shapes
//! the ledger operations exchange with their callers. Persisted field names are
//! camelCase, matching the stored JSON documents.

use crate::error::{LedgerError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw integer identifier
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Get the raw integer value
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

integer_id!(
    /// Unique identifier for a user
    UserId
);

integer_id!(
    /// Unique identifier for a cultural event
    EventId
);

integer_id!(
    /// Unique identifier for a reservation
    ///
    /// Derived from the creation timestamp in milliseconds, so later reservations
    /// always carry larger ids.
    ReservationId
);

// ============================================================================
// Users
// ============================================================================

/// A stored user account.
///
/// Credentials are kept in plaintext, exactly as the seeded collection holds them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Login name, unique within the collection
    pub username: String,
    /// Plaintext password
    pub password: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
}

impl User {
    /// The user without its password, as returned to callers.
    #[must_use]
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// A user as seen by callers of `authenticate`: every field except the password.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    /// User identifier
    pub id: UserId,
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Contact email
    pub email: String,
}

// ============================================================================
// Events
// ============================================================================

/// A cultural event with a fixed capacity.
///
/// `available` is the only field the ledger mutates. It is signed because the
/// permissive capacity policy lets an oversized reservation push it below zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier
    pub id: EventId,
    /// Title
    pub name: String,
    /// Calendar date of the event
    pub date: NaiveDate,
    /// Start time, free-form (`"19:00"`)
    pub time: String,
    /// Venue
    pub location: String,
    /// Short description
    pub description: String,
    /// Category label (`"Música"`, `"Teatro"`, ...)
    pub category: String,
    /// Ticket price in whole currency units
    pub price: u64,
    /// Total number of places
    pub capacity: u32,
    /// Places not held by an active reservation
    pub available: i64,
    /// Optional cover image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Event {
    /// Whether at least one place is still free.
    #[must_use]
    pub const fn has_availability(&self) -> bool {
        self.available > 0
    }
}

// ============================================================================
// Reservations
// ============================================================================

/// Reservation lifecycle.
///
/// ```text
/// Active ──cancel──► Cancelled (terminal)
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Holding places on its event
    Active,
    /// Released; immutable from here on
    Cancelled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A user's claim on a number of places for one event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Reservation identifier
    pub id: ReservationId,
    /// Owner
    pub user_id: UserId,
    /// Reserved event
    pub event_id: EventId,
    /// Number of places, at least 1
    pub quantity: u32,
    /// Lifecycle state
    pub status: ReservationStatus,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
    /// Cancellation time, present iff the reservation is cancelled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Create a new active reservation
    #[must_use]
    pub const fn new(
        id: ReservationId,
        user_id: UserId,
        event_id: EventId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            event_id,
            quantity,
            status: ReservationStatus::Active,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        }
    }

    /// Whether the reservation still holds places.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    /// Change the number of places held.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if the reservation is cancelled.
    pub fn change_quantity(&mut self, quantity: u32, now: DateTime<Utc>) -> Result<()> {
        if !self.is_active() {
            return Err(LedgerError::Validation(
                "cannot modify a cancelled reservation".to_string(),
            ));
        }
        self.quantity = quantity;
        self.updated_at = now;
        Ok(())
    }

    /// Move the reservation to its terminal state.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if it was already cancelled.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.is_active() {
            return Err(LedgerError::Validation("already cancelled".to_string()));
        }
        self.status = ReservationStatus::Cancelled;
        self.cancelled_at = Some(now);
        Ok(())
    }
}

/// A reservation joined with the event it references.
///
/// `event` is `None` when the referenced event no longer exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDetails {
    /// The reservation itself
    #[serde(flatten)]
    pub reservation: Reservation,
    /// The referenced event, if it still exists
    pub event: Option<Event>,
}

impl ReservationDetails {
    /// Amount paid for the reservation at the event's current price.
    #[must_use]
    pub fn total_price(&self) -> u64 {
        self.event
            .as_ref()
            .map_or(0, |event| {
                event.price.saturating_mul(u64::from(self.reservation.quantity))
            })
    }
}

// ============================================================================
// Requests / Responses
// ============================================================================

/// Input to `create_reservation`.
///
/// Ids are optional so that an incomplete request coming from a form can be
/// rejected with a validation error instead of failing to deserialize.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    /// Requesting user
    pub user_id: Option<UserId>,
    /// Event to reserve
    pub event_id: Option<EventId>,
    /// Places requested; defaults to 1
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl CreateReservation {
    /// A request for a single place
    #[must_use]
    pub const fn new(user_id: UserId, event_id: EventId) -> Self {
        Self {
            user_id: Some(user_id),
            event_id: Some(event_id),
            quantity: None,
        }
    }

    /// Request a specific number of places
    #[must_use]
    pub const fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Requested places, defaulting to 1
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

/// Input to `update_reservation`. Only the quantity may change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReservation {
    /// New number of places
    pub quantity: u32,
}

/// Result of a successful cancellation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    /// The reservation in its cancelled state
    pub reservation: Reservation,
    /// Confirmation message for the caller to display
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 15, hour, 0, 0).unwrap()
    }

    fn reservation() -> Reservation {
        Reservation::new(
            ReservationId::new(1_763_164_800_000),
            UserId::new(1),
            EventId::new(1),
            2,
            at(9),
        )
    }

    #[test]
    fn test_new_reservation_is_active() {
        let reservation = reservation();
        assert!(reservation.is_active());
        assert_eq!(reservation.created_at, reservation.updated_at);
        assert!(reservation.cancelled_at.is_none());
    }

    #[test]
    fn test_cancel_is_terminal() {
        let mut reservation = reservation();
        reservation.cancel(at(10)).unwrap();
        assert_eq!(reservation.status, ReservationStatus::Cancelled);
        assert_eq!(reservation.cancelled_at, Some(at(10)));

        let err = reservation.cancel(at(11)).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(ref msg) if msg == "already cancelled"));
        assert_eq!(reservation.cancelled_at, Some(at(10)));
    }

    #[test]
    fn test_change_quantity_refreshes_updated_at() {
        let mut reservation = reservation();
        reservation.change_quantity(4, at(12)).unwrap();
        assert_eq!(reservation.quantity, 4);
        assert_eq!(reservation.updated_at, at(12));
        assert_eq!(reservation.created_at, at(9));
    }

    #[test]
    fn test_cancelled_reservation_rejects_quantity_change() {
        let mut reservation = reservation();
        reservation.cancel(at(10)).unwrap();
        let err = reservation.change_quantity(5, at(11)).unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
        assert_eq!(reservation.quantity, 2);
    }

    #[test]
    fn test_reservation_json_layout() {
        let json = serde_json::to_value(reservation()).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["eventId"], 1);
        assert_eq!(json["status"], "active");
        assert!(json.get("cancelledAt").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_public_user_has_no_password() {
        let user = User {
            id: UserId::new(1),
            username: "admin".to_string(),
            password: "1234".to_string(),
            name: "Juan Pérez".to_string(),
            email: "juan@example.com".to_string(),
        };
        let json = serde_json::to_value(user.to_public()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], "admin");
    }

    #[test]
    fn test_create_request_defaults_quantity() {
        let request: CreateReservation =
            serde_json::from_value(serde_json::json!({ "userId": 1, "eventId": 3 })).unwrap();
        assert_eq!(request.quantity(), 1);
        assert_eq!(request.event_id, Some(EventId::new(3)));

        let missing: CreateReservation =
            serde_json::from_value(serde_json::json!({ "eventId": 3 })).unwrap();
        assert!(missing.user_id.is_none());
    }

    #[test]
    fn test_details_flatten_reservation_fields() {
        let details = ReservationDetails {
            reservation: reservation(),
            event: None,
        };
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["quantity"], 2);
        assert!(json["event"].is_null());
        assert_eq!(details.total_price(), 0);
    }

    #[test]
    fn test_total_price_saturates() {
        let event = Event {
            id: EventId::new(1),
            name: "Gala".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            time: "20:00".to_string(),
            location: "Teatro Municipal".to_string(),
            description: String::new(),
            category: "Teatro".to_string(),
            price: u64::MAX,
            capacity: 10,
            available: 10,
            image: None,
        };
        let details = ReservationDetails {
            reservation: reservation(),
            event: Some(event),
        };
        assert_eq!(details.total_price(), u64::MAX);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Once cancelled, no sequence of changes brings a reservation back.
            #[test]
            fn cancellation_is_terminal(
                before in prop::collection::vec(1u32..=10, 0..5),
                after in prop::collection::vec(1u32..=10, 0..5),
            ) {
                let mut reservation = reservation();
                for quantity in before {
                    prop_assert!(reservation.change_quantity(quantity, at(10)).is_ok());
                }
                let held = reservation.quantity;
                reservation.cancel(at(11)).unwrap();

                for quantity in after {
                    prop_assert!(reservation.change_quantity(quantity, at(12)).is_err());
                    prop_assert!(reservation.cancel(at(12)).is_err());
                }
                prop_assert_eq!(reservation.status, ReservationStatus::Cancelled);
                prop_assert_eq!(reservation.quantity, held);
                prop_assert_eq!(reservation.cancelled_at, Some(at(11)));
            }
        }
    }
}
