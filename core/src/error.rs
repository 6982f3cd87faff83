//! Error types for ledger operations.

use crate::store::StoreError;
use crate::types::{EventId, UserId};
use std::fmt;
use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// The kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// A user account
    User,
    /// A cultural event
    Event,
    /// A reservation
    Reservation,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Event => write!(f, "event"),
            Self::Reservation => write!(f, "reservation"),
        }
    }
}

/// Every way a ledger operation can fail.
///
/// All variants are terminal for the call that produced them; the ledger never
/// retries internally and never leaves a partial write behind.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No user matches the given username and password.
    #[error("invalid credentials")]
    Auth,

    /// Unknown id.
    #[error("{entity} {id} does not exist")]
    NotFound {
        /// What was looked up
        entity: Entity,
        /// The id that was not found
        id: i64,
    },

    /// Missing fields, out-of-range input, or a transition out of a terminal state.
    #[error("{0}")]
    Validation(String),

    /// The event cannot hold the requested places.
    #[error("no slots available for event {event_id} (available {available}, requested {requested})")]
    Capacity {
        /// Event that is full
        event_id: EventId,
        /// Places left when the request was made
        available: i64,
        /// Places requested
        requested: u32,
    },

    /// The user already holds an active reservation for this event.
    #[error("duplicate active reservation for user {user_id} on event {event_id}")]
    Conflict {
        /// Owner of the existing reservation
        user_id: UserId,
        /// Event already reserved
        event_id: EventId,
    },

    /// The backing document store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Fieldless mirror of [`LedgerError`] for exhaustive matching by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad credentials
    Auth,
    /// Unknown id
    NotFound,
    /// Invalid input or state transition
    Validation,
    /// No places left
    Capacity,
    /// Duplicate active reservation
    Conflict,
    /// Persistence failure
    Storage,
}

impl LedgerError {
    /// Shorthand for a [`LedgerError::NotFound`].
    #[must_use]
    pub const fn not_found(entity: Entity, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth => ErrorKind::Auth,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Capacity { .. } => ErrorKind::Capacity,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity() {
        let err = LedgerError::not_found(Entity::Event, 999);
        assert_eq!(err.to_string(), "event 999 does not exist");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_storage_errors_convert() {
        let err: LedgerError = StoreError::Backend("disk full".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_conflict_message() {
        let err = LedgerError::Conflict {
            user_id: UserId::new(1),
            event_id: EventId::new(1),
        };
        assert!(err.to_string().starts_with("duplicate active reservation"));
    }
}
