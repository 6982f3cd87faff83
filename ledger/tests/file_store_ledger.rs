//! The ledger over [`JsonFileStore`]: state survives a restart.

#![allow(clippy::unwrap_used)]

use reservation_ledger::{JsonFileStore, Ledger};
use reservation_ledger_core::types::{CreateReservation, EventId, ReservationStatus, UserId};
use reservation_ledger_testing::stepping_clock;

#[tokio::test]
async fn test_first_start_writes_seed_documents() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(JsonFileStore::new(dir.path()), stepping_clock());

    let report = ledger.initialize().await.unwrap();
    assert_eq!((report.users, report.events, report.reservations), (true, true, true));

    for name in ["users.json", "events.json", "reservations.json"] {
        assert!(dir.path().join(name).is_file(), "{name} missing");
    }
    let raw = std::fs::read_to_string(dir.path().join("reservations.json")).unwrap();
    assert_eq!(serde_json::from_str::<serde_json::Value>(&raw).unwrap(), serde_json::json!([]));
}

#[tokio::test]
async fn test_reservations_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let ledger = Ledger::new(JsonFileStore::new(dir.path()), stepping_clock());
        ledger.initialize().await.unwrap();
        let created = ledger
            .create_reservation(
                CreateReservation::new(UserId::new(2), EventId::new(4)).with_quantity(3),
            )
            .await
            .unwrap();
        created.reservation.id
    };

    let reopened = Ledger::new(JsonFileStore::new(dir.path()), stepping_clock());
    assert!(reopened.initialize().await.unwrap().is_noop());

    let event = reopened.get_event(EventId::new(4)).await.unwrap();
    assert_eq!(event.available, 127);

    let details = reopened.get_reservation(id).await.unwrap();
    assert_eq!(details.reservation.status, ReservationStatus::Active);
    assert_eq!(details.reservation.quantity, 3);
    assert_eq!(details.event.map(|e| e.id), Some(EventId::new(4)));

    // The stored document keeps camelCase field names.
    let raw = std::fs::read_to_string(dir.path().join("reservations.json")).unwrap();
    assert!(raw.contains("\"userId\": 2"));
    assert!(raw.contains("\"eventId\": 4"));
    assert!(raw.contains("\"status\": \"active\""));
}

#[tokio::test]
async fn test_missing_document_is_reseeded_alone() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::new(JsonFileStore::new(dir.path()), stepping_clock());
    ledger.initialize().await.unwrap();
    ledger
        .create_reservation(CreateReservation::new(UserId::new(1), EventId::new(1)))
        .await
        .unwrap();

    std::fs::remove_file(dir.path().join("users.json")).unwrap();
    let report = ledger.initialize().await.unwrap();
    assert_eq!((report.users, report.events, report.reservations), (true, false, false));

    assert_eq!(ledger.list_reservations(UserId::new(1)).await.unwrap().len(), 1);
    ledger.authenticate("maria", "1234").await.unwrap();
}
