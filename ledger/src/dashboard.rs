//! Derived statistics over a user's reservations.
//!
//! Nothing here is persisted; everything is computed from the joined
//! reservation list and the current date.

use chrono::NaiveDate;
use reservation_ledger_core::types::{Event, ReservationDetails};
use serde::Serialize;

/// How a reservation should be presented relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationPhase {
    /// Not cancelled and the event is today or later
    Active,
    /// Not cancelled but the event date has passed, or the event is gone
    Finished,
    /// Cancelled
    Cancelled,
}

impl ReservationPhase {
    /// Classify a joined reservation.
    #[must_use]
    pub fn of(details: &ReservationDetails, today: NaiveDate) -> Self {
        if !details.reservation.is_active() {
            return Self::Cancelled;
        }
        match &details.event {
            Some(event) if event.date >= today => Self::Active,
            _ => Self::Finished,
        }
    }
}

/// Whole days from `today` until the event (negative once it has passed).
#[must_use]
pub fn days_until(event: &Event, today: NaiveDate) -> i64 {
    (event.date - today).num_days()
}

/// Headline numbers for a user's dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Reservations that have not been cancelled
    pub active_reservations: usize,
    /// Non-cancelled reservations whose event is today or later
    pub upcoming_events: usize,
    /// Places held by non-cancelled reservations
    pub total_tickets: u64,
    /// Σ quantity × price over non-cancelled reservations
    pub total_spent: u64,
}

impl DashboardSummary {
    /// Summarize a user's joined reservations as of `today`.
    #[must_use]
    pub fn compute(reservations: &[ReservationDetails], today: NaiveDate) -> Self {
        reservations
            .iter()
            .filter(|details| details.reservation.is_active())
            .fold(Self::default(), |mut summary, details| {
                summary.active_reservations += 1;
                if ReservationPhase::of(details, today) == ReservationPhase::Active {
                    summary.upcoming_events += 1;
                }
                summary.total_tickets = summary
                    .total_tickets
                    .saturating_add(u64::from(details.reservation.quantity));
                summary.total_spent = summary.total_spent.saturating_add(details.total_price());
                summary
            })
    }
}
