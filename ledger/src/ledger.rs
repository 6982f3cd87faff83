//! The reservation ledger service.
//!
//! Owns the users, events and reservations collections inside a
//! [`DocumentStore`] and keeps event availability in step with reservations:
//!
//! ```text
//! create  ─► available -= quantity
//! update  ─► available -= (new quantity - old quantity)
//! cancel  ─► available += quantity
//! ```
//!
//! Every public operation runs inside one ledger-wide critical section
//! (read, validate, mutate, write), so concurrent callers observe operations as
//! if they ran one after another. Validation always completes before the first
//! write.

use crate::collections::{self, load, next_reservation_id};
use crate::config::{CapacityPolicy, LedgerOptions};
use crate::dashboard::DashboardSummary;
use crate::seed::{self, SeedReport};
use reservation_ledger_core::environment::Clock;
use reservation_ledger_core::error::{Entity, LedgerError, Result};
use reservation_ledger_core::store::{DocumentStore, EVENTS_KEY, RESERVATIONS_KEY, USERS_KEY};
use reservation_ledger_core::types::{
    Cancellation, CreateReservation, Event, EventId, PublicUser, Reservation, ReservationDetails,
    ReservationId, UpdateReservation, User, UserId,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Confirmation text returned with every successful cancellation.
pub const CANCELLATION_MESSAGE: &str = "reservation cancelled";

struct Inner<S, C> {
    store: S,
    clock: C,
    options: LedgerOptions,
    lock: Mutex<()>,
}

/// Reservation ledger over a document store `S` and a clock `C`.
///
/// Cheap to clone; clones share the store and the critical section.
///
/// # Example
///
/// ```ignore
/// let ledger = Ledger::new(JsonFileStore::new("./data"), SystemClock);
/// ledger.initialize().await?;
///
/// let user = ledger.authenticate("admin", "1234").await?;
/// let created = ledger
///     .create_reservation(CreateReservation::new(user.id, EventId::new(1)).with_quantity(2))
///     .await?;
/// ledger.cancel_reservation(created.reservation.id).await?;
/// ```
pub struct Ledger<S, C> {
    inner: Arc<Inner<S, C>>,
}

impl<S, C> Clone for Ledger<S, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: DocumentStore, C: Clock> Ledger<S, C> {
    /// Create a ledger with default options (strict capacity, no latency).
    #[must_use]
    pub fn new(store: S, clock: C) -> Self {
        Self::with_options(store, clock, LedgerOptions::default())
    }

    /// Create a ledger with explicit options.
    #[must_use]
    pub fn with_options(store: S, clock: C, options: LedgerOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                clock,
                options,
                lock: Mutex::new(()),
            }),
        }
    }

    /// The options this ledger was built with.
    #[must_use]
    pub fn options(&self) -> &LedgerOptions {
        &self.inner.options
    }

    /// The underlying document store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Seed every collection whose document is absent. Never overwrites data.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the store fails.
    pub async fn initialize(&self) -> Result<SeedReport> {
        let _guard = self.inner.lock.lock().await;
        Ok(seed::initialize(&self.inner.store)?)
    }

    /// Drop all collections and seed them again.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the store fails.
    pub async fn reset(&self) -> Result<SeedReport> {
        let _guard = self.inner.lock.lock().await;
        Ok(seed::reset(&self.inner.store)?)
    }

    /// Add sample reservations for a user who has none yet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the store fails.
    pub async fn add_demo_reservations(&self, user_id: UserId) -> Result<usize> {
        let _guard = self.inner.lock.lock().await;
        let now = self.inner.clock.now();
        Ok(seed::add_demo_reservations(&self.inner.store, user_id, now)?)
    }

    /// Remove every reservation, returning their places to the events.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the store fails.
    pub async fn clear_reservations(&self) -> Result<usize> {
        let _guard = self.inner.lock.lock().await;
        Ok(seed::clear_reservations(&self.inner.store)?)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Look up a user by exact username and password.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Auth`] when no user matches.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<PublicUser> {
        self.pause(self.inner.options.latency.authenticate).await;
        let _guard = self.inner.lock.lock().await;

        let users: Vec<User> = load(&self.inner.store, USERS_KEY)?;
        match users
            .iter()
            .find(|u| u.username == username && u.password == password)
        {
            Some(user) => {
                tracing::info!(user_id = %user.id, username, "user authenticated");
                Ok(user.to_public())
            }
            None => {
                tracing::warn!(username, "authentication rejected");
                Err(LedgerError::Auth)
            }
        }
    }

    /// Events with at least one free place, in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the store fails.
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.pause(self.inner.options.latency.list_events).await;
        let _guard = self.inner.lock.lock().await;

        let events: Vec<Event> = load(&self.inner.store, EVENTS_KEY)?;
        let open: Vec<Event> = events.into_iter().filter(Event::has_availability).collect();
        tracing::debug!(count = open.len(), "listed events");
        Ok(open)
    }

    /// An event by id, whether or not it still has places.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if no event has this id.
    pub async fn get_event(&self, id: EventId) -> Result<Event> {
        self.pause(self.inner.options.latency.get_event).await;
        let _guard = self.inner.lock.lock().await;

        let events: Vec<Event> = load(&self.inner.store, EVENTS_KEY)?;
        events
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| LedgerError::not_found(Entity::Event, id.value()))
    }

    /// A user's reservations joined with their events, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the store fails.
    pub async fn list_reservations(&self, user_id: UserId) -> Result<Vec<ReservationDetails>> {
        self.pause(self.inner.options.latency.list_reservations).await;
        let _guard = self.inner.lock.lock().await;
        self.user_reservations(user_id)
    }

    fn user_reservations(&self, user_id: UserId) -> Result<Vec<ReservationDetails>> {
        let reservations: Vec<Reservation> = load(&self.inner.store, RESERVATIONS_KEY)?;
        let events: Vec<Event> = load(&self.inner.store, EVENTS_KEY)?;

        let mut joined: Vec<ReservationDetails> = reservations
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .map(|reservation| join(reservation, &events))
            .collect();
        joined.sort_by(|a, b| b.reservation.created_at.cmp(&a.reservation.created_at));

        tracing::debug!(%user_id, count = joined.len(), "listed reservations");
        Ok(joined)
    }

    /// A reservation by id, joined with its event.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if no reservation has this id.
    pub async fn get_reservation(&self, id: ReservationId) -> Result<ReservationDetails> {
        self.pause(self.inner.options.latency.get_reservation).await;
        let _guard = self.inner.lock.lock().await;

        let reservations: Vec<Reservation> = load(&self.inner.store, RESERVATIONS_KEY)?;
        let reservation = reservations
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| LedgerError::not_found(Entity::Reservation, id.value()))?;
        let events: Vec<Event> = load(&self.inner.store, EVENTS_KEY)?;
        Ok(join(reservation, &events))
    }

    /// Dashboard statistics for a user as of the clock's current date.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Storage`] if the store fails.
    pub async fn dashboard(&self, user_id: UserId) -> Result<DashboardSummary> {
        self.pause(self.inner.options.latency.list_reservations).await;
        let _guard = self.inner.lock.lock().await;

        let reservations = self.user_reservations(user_id)?;
        let today = self.inner.clock.now().date_naive();
        Ok(DashboardSummary::compute(&reservations, today))
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Reserve places on an event.
    ///
    /// Checks, in order: both ids present, quantity at least 1, event exists, capacity (per [`CapacityPolicy`]), no other active
    /// reservation for the same user and event.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`], [`LedgerError::NotFound`],
    /// [`LedgerError::Capacity`] or [`LedgerError::Conflict`] for the first
    /// failed check, or [`LedgerError::Storage`] if persisting fails.
    #[tracing::instrument(skip(self), name = "ledger_create_reservation")]
    pub async fn create_reservation(&self, request: CreateReservation) -> Result<ReservationDetails> {
        self.pause(self.inner.options.latency.create_reservation).await;
        let _guard = self.inner.lock.lock().await;

        let (Some(user_id), Some(event_id)) = (request.user_id, request.event_id) else {
            return Err(reject(LedgerError::Validation(
                "missing required fields".to_string(),
            )));
        };
        let quantity = request.quantity();
        check_min_quantity(quantity).map_err(reject)?;

        let mut events: Vec<Event> = load(&self.inner.store, EVENTS_KEY)?;
        let mut reservations: Vec<Reservation> = load(&self.inner.store, RESERVATIONS_KEY)?;

        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| reject(LedgerError::not_found(Entity::Event, event_id.value())))?;

        let fits = match self.inner.options.capacity_policy {
            CapacityPolicy::Strict => event.available >= i64::from(quantity),
            CapacityPolicy::Permissive => event.available > 0,
        };
        if !fits {
            return Err(reject(LedgerError::Capacity {
                event_id,
                available: event.available,
                requested: quantity,
            }));
        }

        if reservations
            .iter()
            .any(|r| r.user_id == user_id && r.event_id == event_id && r.is_active())
        {
            return Err(reject(LedgerError::Conflict { user_id, event_id }));
        }

        let now = self.inner.clock.now();
        let reservation = Reservation::new(
            next_reservation_id(now, &reservations),
            user_id,
            event_id,
            quantity,
            now,
        );
        event.available -= i64::from(quantity);
        let event = event.clone();

        reservations.push(reservation.clone());
        collections::commit(&self.inner.store, &events, &reservations)?;

        tracing::info!(
            reservation_id = %reservation.id,
            %user_id,
            %event_id,
            quantity,
            available = event.available,
            "reservation created"
        );
        Ok(ReservationDetails {
            reservation,
            event: Some(event),
        })
    }

    /// Change the number of places held by an active reservation.
    ///
    /// Availability of the event shifts by the difference between the new and
    /// the old quantity. Under [`CapacityPolicy::Strict`] an increase larger
    /// than the remaining places is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown id,
    /// [`LedgerError::Validation`] for a cancelled reservation or an
    /// out-of-range quantity, [`LedgerError::Capacity`] when the increase does
    /// not fit, or [`LedgerError::Storage`] if persisting fails.
    #[tracing::instrument(skip(self), name = "ledger_update_reservation")]
    pub async fn update_reservation(
        &self,
        id: ReservationId,
        update: UpdateReservation,
    ) -> Result<Reservation> {
        self.pause(self.inner.options.latency.update_reservation).await;
        let _guard = self.inner.lock.lock().await;

        let mut reservations: Vec<Reservation> = load(&self.inner.store, RESERVATIONS_KEY)?;
        let mut events: Vec<Event> = load(&self.inner.store, EVENTS_KEY)?;

        let reservation = reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| reject(LedgerError::not_found(Entity::Reservation, id.value())))?;
        if !reservation.is_active() {
            return Err(reject(LedgerError::Validation(
                "cannot modify a cancelled reservation".to_string(),
            )));
        }
        self.check_quantity(update.quantity).map_err(reject)?;

        let delta = i64::from(update.quantity) - i64::from(reservation.quantity);
        if let Some(event) = events.iter_mut().find(|e| e.id == reservation.event_id) {
            if delta > 0
                && self.inner.options.capacity_policy == CapacityPolicy::Strict
                && event.available < delta
            {
                return Err(reject(LedgerError::Capacity {
                    event_id: event.id,
                    available: event.available,
                    requested: update.quantity,
                }));
            }
            event.available -= delta;
        }

        reservation.change_quantity(update.quantity, self.inner.clock.now())?;
        let updated = reservation.clone();
        collections::commit(&self.inner.store, &events, &reservations)?;

        tracing::info!(
            reservation_id = %updated.id,
            quantity = updated.quantity,
            delta,
            "reservation updated"
        );
        Ok(updated)
    }

    /// Cancel an active reservation, returning its places to the event.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] for an unknown id,
    /// [`LedgerError::Validation`] if it is already cancelled, or
    /// [`LedgerError::Storage`] if persisting fails.
    #[tracing::instrument(skip(self), name = "ledger_cancel_reservation")]
    pub async fn cancel_reservation(&self, id: ReservationId) -> Result<Cancellation> {
        self.pause(self.inner.options.latency.cancel_reservation).await;
        let _guard = self.inner.lock.lock().await;

        let mut reservations: Vec<Reservation> = load(&self.inner.store, RESERVATIONS_KEY)?;
        let mut events: Vec<Event> = load(&self.inner.store, EVENTS_KEY)?;

        let reservation = reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| reject(LedgerError::not_found(Entity::Reservation, id.value())))?;
        reservation.cancel(self.inner.clock.now()).map_err(reject)?;

        if let Some(event) = events.iter_mut().find(|e| e.id == reservation.event_id) {
            event.available += i64::from(reservation.quantity);
        }
        let cancelled = reservation.clone();
        collections::commit(&self.inner.store, &events, &reservations)?;

        tracing::info!(
            reservation_id = %cancelled.id,
            event_id = %cancelled.event_id,
            quantity = cancelled.quantity,
            "reservation cancelled"
        );
        Ok(Cancellation {
            reservation: cancelled,
            message: CANCELLATION_MESSAGE.to_string(),
        })
    }

    /// Bounds on an edited quantity: `1..=max_quantity`.
    fn check_quantity(&self, quantity: u32) -> Result<()> {
        check_min_quantity(quantity)?;
        let max = self.inner.options.max_quantity;
        if quantity > max {
            return Err(LedgerError::Validation(format!(
                "quantity must be at most {max}"
            )));
        }
        Ok(())
    }
}

fn check_min_quantity(quantity: u32) -> Result<()> {
    if quantity < 1 {
        return Err(LedgerError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn join(reservation: Reservation, events: &[Event]) -> ReservationDetails {
    let event = events.iter().find(|e| e.id == reservation.event_id).cloned();
    ReservationDetails { reservation, event }
}

fn reject(err: LedgerError) -> LedgerError {
    tracing::warn!(error = %err, kind = ?err.kind(), "operation rejected");
    err
}
