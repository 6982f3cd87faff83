//! Typed access to the three persisted collections.
//!
//! Each collection is one JSON array document. An absent document reads as an
//! empty collection; seeding decides when absent documents get created.

use chrono::{DateTime, Utc};
use reservation_ledger_core::store::{DocumentStore, StoreError, EVENTS_KEY, RESERVATIONS_KEY};
use reservation_ledger_core::types::{Event, Reservation, ReservationId};
use serde::{de::DeserializeOwned, Serialize};

/// Load a collection, treating a missing document as empty.
pub(crate) fn load<S, T>(store: &S, key: &str) -> Result<Vec<T>, StoreError>
where
    S: DocumentStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key)? {
        None => Ok(Vec::new()),
        Some(document) => serde_json::from_value(document).map_err(|e| StoreError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Replace a collection document.
pub(crate) fn save<S, T>(store: &S, key: &str, items: &[T]) -> Result<(), StoreError>
where
    S: DocumentStore + ?Sized,
    T: Serialize,
{
    let document = serde_json::to_value(items).map_err(|e| StoreError::Serialization {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    store.set(key, document)
}

/// Write events and reservations as one unit.
///
/// Events are written first. If the reservations write then fails, the previous
/// events document is put back so callers never observe half of the change.
pub(crate) fn commit<S>(
    store: &S,
    events: &[Event],
    reservations: &[Reservation],
) -> Result<(), StoreError>
where
    S: DocumentStore + ?Sized,
{
    let previous_events = store.get(EVENTS_KEY)?;
    save(store, EVENTS_KEY, events)?;

    if let Err(err) = save(store, RESERVATIONS_KEY, reservations) {
        let restored = match previous_events {
            Some(document) => store.set(EVENTS_KEY, document),
            None => store.remove(EVENTS_KEY),
        };
        if let Err(rollback_err) = restored {
            tracing::error!(
                error = %rollback_err,
                "failed to restore events after reservations write failed"
            );
        }
        return Err(err);
    }

    Ok(())
}

/// Next reservation id: the creation time in milliseconds, bumped past the
/// largest id already issued so ids stay unique and strictly increasing.
pub(crate) fn next_reservation_id(now: DateTime<Utc>, reservations: &[Reservation]) -> ReservationId {
    let stamp = now.timestamp_millis();
    let floor = reservations
        .iter()
        .map(|r| r.id.value())
        .max()
        .map_or(i64::MIN, |max| max.saturating_add(1));
    ReservationId::new(stamp.max(floor))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reservation_ledger_testing::{fixtures, test_epoch, InMemoryDocumentStore};
    use serde_json::json;

    #[test]
    fn test_missing_collection_is_empty() {
        let store = InMemoryDocumentStore::new();
        let events: Vec<Event> = load(&store, EVENTS_KEY).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_corrupt_collection_is_serialization_error() {
        let store = InMemoryDocumentStore::new();
        store.set(EVENTS_KEY, json!({ "not": "an array" })).unwrap();
        let err = load::<_, Event>(&store, EVENTS_KEY).unwrap_err();
        assert!(matches!(err, StoreError::Serialization { ref key, .. } if key == EVENTS_KEY));
    }

    #[test]
    fn test_commit_restores_events_when_reservations_write_fails() {
        let store = InMemoryDocumentStore::new();
        let date = test_epoch().date_naive();
        let original = vec![fixtures::event(1, 10, 10, date)];
        save(&store, EVENTS_KEY, &original).unwrap();
        store.fail_writes_to(RESERVATIONS_KEY);

        let mut changed = original.clone();
        changed[0].available = 8;
        let reservations = vec![fixtures::reservation(1, 1, 1, 2, test_epoch())];

        assert!(commit(&store, &changed, &reservations).is_err());
        let events: Vec<Event> = load(&store, EVENTS_KEY).unwrap();
        assert_eq!(events, original);
        assert!(!store.contains(RESERVATIONS_KEY).unwrap());
    }

    #[test]
    fn test_next_id_uses_timestamp() {
        let id = next_reservation_id(test_epoch(), &[]);
        assert_eq!(id.value(), test_epoch().timestamp_millis());
    }

    #[test]
    fn test_next_id_never_repeats_within_a_millisecond() {
        let now = test_epoch();
        let existing = fixtures::reservation(now.timestamp_millis(), 1, 1, 1, now);
        let id = next_reservation_id(now, &[existing]);
        assert_eq!(id.value(), now.timestamp_millis() + 1);
    }
}
