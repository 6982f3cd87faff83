//! Property tests: availability stays consistent with reservations under any
//! sequence of create, update and cancel calls.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use proptest::prelude::*;
use reservation_ledger::seed::seed_events;
use reservation_ledger::{CapacityPolicy, Ledger, LedgerOptions};
use reservation_ledger_core::store::{DocumentStore, EVENTS_KEY, RESERVATIONS_KEY};
use reservation_ledger_core::types::{
    CreateReservation, Event, EventId, Reservation, ReservationId, ReservationStatus,
    UpdateReservation, UserId,
};
use reservation_ledger_core::ErrorKind;
use reservation_ledger_testing::properties::{ledger_ops, LedgerOp};
use reservation_ledger_testing::{stepping_clock, InMemoryDocumentStore};
use std::collections::{HashMap, HashSet};

struct Outcome {
    events: Vec<Event>,
    reservations: Vec<Reservation>,
    cancelled: Vec<ReservationId>,
    unexpected: Vec<ErrorKind>,
}

fn run(ops: Vec<LedgerOp>, policy: CapacityPolicy) -> Outcome {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    runtime.block_on(async move {
        let store = InMemoryDocumentStore::new();
        let options = LedgerOptions {
            capacity_policy: policy,
            ..LedgerOptions::default()
        };
        let ledger = Ledger::with_options(store.clone(), stepping_clock(), options);
        ledger.initialize().await.unwrap();

        let mut created: Vec<ReservationId> = Vec::new();
        let mut cancelled = Vec::new();
        let mut unexpected = Vec::new();

        for op in ops {
            let result = match op {
                LedgerOp::Create {
                    user_id,
                    event_id,
                    quantity,
                } => {
                    let request = CreateReservation::new(UserId::new(user_id), EventId::new(event_id))
                        .with_quantity(quantity);
                    ledger.create_reservation(request).await.map(|details| {
                        created.push(details.reservation.id);
                    })
                }
                LedgerOp::Update { index, quantity } if !created.is_empty() => {
                    let id = created[index % created.len()];
                    ledger
                        .update_reservation(id, UpdateReservation { quantity })
                        .await
                        .map(|_| ())
                }
                LedgerOp::Cancel { index } if !created.is_empty() => {
                    let id = created[index % created.len()];
                    ledger.cancel_reservation(id).await.map(|cancellation| {
                        cancelled.push(cancellation.reservation.id);
                    })
                }
                LedgerOp::Update { .. } | LedgerOp::Cancel { .. } => Ok(()),
            };
            if let Err(err) = result {
                if matches!(err.kind(), ErrorKind::Storage | ErrorKind::Auth) {
                    unexpected.push(err.kind());
                }
            }
        }

        let events = serde_json::from_value(store.get(EVENTS_KEY).unwrap().unwrap()).unwrap();
        let reservations =
            serde_json::from_value(store.get(RESERVATIONS_KEY).unwrap().unwrap()).unwrap();
        Outcome {
            events,
            reservations,
            cancelled,
            unexpected,
        }
    })
}

fn active_quantity(reservations: &[Reservation], event_id: EventId) -> i64 {
    reservations
        .iter()
        .filter(|r| r.event_id == event_id && r.status == ReservationStatus::Active)
        .map(|r| i64::from(r.quantity))
        .sum()
}

fn check_consistency(outcome: &Outcome) -> Result<(), TestCaseError> {
    prop_assert!(outcome.unexpected.is_empty(), "unexpected errors: {:?}", outcome.unexpected);

    for seeded in seed_events() {
        let event = outcome
            .events
            .iter()
            .find(|e| e.id == seeded.id)
            .expect("seeded event still present");
        prop_assert_eq!(
            seeded.available - active_quantity(&outcome.reservations, seeded.id),
            event.available,
            "availability drifted for event {}",
            seeded.id
        );
        prop_assert_eq!(event.capacity, seeded.capacity);
    }

    let mut active_pairs = HashSet::new();
    let mut ids = HashSet::new();
    for reservation in &outcome.reservations {
        prop_assert!(ids.insert(reservation.id), "duplicate id {}", reservation.id);
        if reservation.status == ReservationStatus::Active {
            prop_assert!(
                active_pairs.insert((reservation.user_id, reservation.event_id)),
                "two active reservations for user {} on event {}",
                reservation.user_id,
                reservation.event_id
            );
        }
    }

    let by_id: HashMap<ReservationId, &Reservation> =
        outcome.reservations.iter().map(|r| (r.id, r)).collect();
    for id in &outcome.cancelled {
        let reservation = by_id[id];
        prop_assert_eq!(reservation.status, ReservationStatus::Cancelled);
        prop_assert!(reservation.cancelled_at.is_some());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Seeded availability minus active quantities always equals stored availability.
    #[test]
    fn availability_tracks_active_reservations(ops in ledger_ops(40)) {
        let outcome = run(ops, CapacityPolicy::Strict);
        check_consistency(&outcome)?;
    }

    /// Under the strict policy no event is ever oversold.
    #[test]
    fn strict_policy_never_oversells(ops in ledger_ops(60)) {
        let outcome = run(ops, CapacityPolicy::Strict);
        for event in &outcome.events {
            prop_assert!(event.available >= 0, "event {} oversold: {}", event.id, event.available);
        }
    }

    /// The permissive policy may oversell but never loses track of places.
    #[test]
    fn permissive_policy_stays_consistent(ops in ledger_ops(60)) {
        let outcome = run(ops, CapacityPolicy::Permissive);
        check_consistency(&outcome)?;
    }
}
