//! First-run seed data and development helpers.
//!
//! Seeding only ever creates documents that are entirely absent, so running it
//! on every start is safe.

use crate::collections::{self, load, next_reservation_id, save};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reservation_ledger_core::store::{
    DocumentStore, StoreError, EVENTS_KEY, RESERVATIONS_KEY, USERS_KEY,
};
use reservation_ledger_core::types::{
    Event, EventId, Reservation, ReservationId, ReservationStatus, User, UserId,
};
use serde::Serialize;

/// Which collections a call to [`initialize`] created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    /// The users document was absent and has been seeded
    pub users: bool,
    /// The events document was absent and has been seeded
    pub events: bool,
    /// The reservations document was absent and has been created empty
    pub reservations: bool,
}

impl SeedReport {
    /// Whether anything was written.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        !self.users && !self.events && !self.reservations
    }
}

/// Seed each collection whose document is absent.
///
/// # Errors
///
/// Returns [`StoreError`] if the store cannot be read or written.
pub fn initialize<S: DocumentStore + ?Sized>(store: &S) -> Result<SeedReport, StoreError> {
    let mut report = SeedReport::default();

    if !store.contains(USERS_KEY)? {
        save(store, USERS_KEY, &seed_users())?;
        report.users = true;
    }
    if !store.contains(EVENTS_KEY)? {
        save(store, EVENTS_KEY, &seed_events())?;
        report.events = true;
    }
    if !store.contains(RESERVATIONS_KEY)? {
        save::<_, Reservation>(store, RESERVATIONS_KEY, &[])?;
        report.reservations = true;
    }

    if !report.is_noop() {
        tracing::info!(
            users = report.users,
            events = report.events,
            reservations = report.reservations,
            "seeded ledger collections"
        );
    }
    Ok(report)
}

/// Drop all three collections and seed them again.
///
/// # Errors
///
/// Returns [`StoreError`] if the store cannot be written.
pub fn reset<S: DocumentStore + ?Sized>(store: &S) -> Result<SeedReport, StoreError> {
    store.remove(USERS_KEY)?;
    store.remove(EVENTS_KEY)?;
    store.remove(RESERVATIONS_KEY)?;
    tracing::warn!("ledger collections reset");
    initialize(store)
}

/// Empty the reservations collection, handing the places held by active
/// reservations back to their events. Returns how many reservations were removed.
///
/// # Errors
///
/// Returns [`StoreError`] if the store cannot be read or written.
pub fn clear_reservations<S: DocumentStore + ?Sized>(store: &S) -> Result<usize, StoreError> {
    let reservations: Vec<Reservation> = load(store, RESERVATIONS_KEY)?;
    let mut events: Vec<Event> = load(store, EVENTS_KEY)?;

    for reservation in reservations.iter().filter(|r| r.is_active()) {
        if let Some(event) = events.iter_mut().find(|e| e.id == reservation.event_id) {
            event.available += i64::from(reservation.quantity);
        }
    }

    collections::commit(store, &events, &[])?;
    tracing::warn!(removed = reservations.len(), "cleared all reservations");
    Ok(reservations.len())
}

/// Give `user_id` three sample reservations unless they already have some.
///
/// Adds two active reservations (event 1 × 2, event 3 × 1) and one cancelled
/// reservation (event 4). Availability of the referenced events is reduced by
/// the active quantities. Returns how many reservations were added.
///
/// # Errors
///
/// Returns [`StoreError`] if the store cannot be read or written.
pub fn add_demo_reservations<S: DocumentStore + ?Sized>(
    store: &S,
    user_id: UserId,
    now: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let mut reservations: Vec<Reservation> = load(store, RESERVATIONS_KEY)?;
    if reservations.iter().any(|r| r.user_id == user_id) {
        tracing::info!(%user_id, "user already has reservations, demo data skipped");
        return Ok(0);
    }

    let mut events: Vec<Event> = load(store, EVENTS_KEY)?;
    let base = next_reservation_id(now, &reservations).value();
    let mut demo = vec![
        demo_reservation(base, user_id, 1, 2, day(15), None),
        demo_reservation(base + 1, user_id, 3, 1, day(16), None),
        demo_reservation(base + 2, user_id, 4, 1, day(10), Some(day(14))),
    ];
    // Only reservations whose event exists are kept, so availability stays consistent.
    demo.retain(|r| events.iter().any(|e| e.id == r.event_id));

    for reservation in demo.iter().filter(|r| r.is_active()) {
        if let Some(event) = events.iter_mut().find(|e| e.id == reservation.event_id) {
            event.available -= i64::from(reservation.quantity);
        }
    }

    let added = demo.len();
    reservations.extend(demo);
    collections::commit(store, &events, &reservations)?;
    tracing::info!(%user_id, added, "added demo reservations");
    Ok(added)
}

fn demo_reservation(
    id: i64,
    user_id: UserId,
    event_id: i64,
    quantity: u32,
    created_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
) -> Reservation {
    let mut reservation = Reservation::new(
        ReservationId::new(id),
        user_id,
        EventId::new(event_id),
        quantity,
        created_at,
    );
    if let Some(at) = cancelled_at {
        reservation.status = ReservationStatus::Cancelled;
        reservation.updated_at = at;
        reservation.cancelled_at = Some(at);
    }
    reservation
}

fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, month, day).unwrap_or_default()
}

/// The two accounts present on first run.
#[must_use]
pub fn seed_users() -> Vec<User> {
    vec![
        User {
            id: UserId::new(1),
            username: "admin".to_string(),
            password: "1234".to_string(),
            name: "Juan Pérez".to_string(),
            email: "juan@example.com".to_string(),
        },
        User {
            id: UserId::new(2),
            username: "maria".to_string(),
            password: "1234".to_string(),
            name: "María García".to_string(),
            email: "maria@example.com".to_string(),
        },
    ]
}

/// The five events present on first run.
#[must_use]
pub fn seed_events() -> Vec<Event> {
    vec![
        seed_event(
            1,
            "Concierto de Jazz en el Parque",
            date(11, 20),
            "19:00",
            "Parque Central",
            "Noche de jazz con las mejores bandas locales",
            "Música",
            (25_000, 100, 95),
            "https://images.unsplash.com/photo-1511192336575-5a79af67a629?w=400",
        ),
        seed_event(
            2,
            "Exposición de Arte Contemporáneo",
            date(11, 22),
            "10:00",
            "Museo de Arte Moderno",
            "Obras de artistas emergentes colombianos",
            "Arte",
            (15_000, 50, 45),
            "https://images.unsplash.com/photo-1547891654-e66ed7ebb968?w=400",
        ),
        seed_event(
            3,
            "Taller de Fotografía",
            date(11, 25),
            "14:00",
            "Casa de la Cultura",
            "Aprende técnicas básicas de fotografía digital",
            "Taller",
            (30_000, 20, 12),
            "https://images.unsplash.com/photo-1452587925148-ce544e77e70d?w=400",
        ),
        seed_event(
            4,
            "Obra de Teatro: \"El Quijote\"",
            date(11, 28),
            "20:00",
            "Teatro Municipal",
            "Adaptación moderna del clásico de Cervantes",
            "Teatro",
            (40_000, 150, 130),
            "https://images.unsplash.com/photo-1503095396549-807759245b35?w=400",
        ),
        seed_event(
            5,
            "Festival de Cine Independiente",
            date(12, 1),
            "16:00",
            "Cine Colombia",
            "Proyección de cortometrajes latinoamericanos",
            "Cine",
            (20_000, 80, 65),
            "https://images.unsplash.com/photo-1489599849927-2ee91cede3ba?w=400",
        ),
    ]
}

#[allow(clippy::too_many_arguments)] // Flat literal rows read better than a builder here
fn seed_event(
    id: i64,
    name: &str,
    date: NaiveDate,
    time: &str,
    location: &str,
    description: &str,
    category: &str,
    (price, capacity, available): (u64, u32, i64),
    image: &str,
) -> Event {
    Event {
        id: EventId::new(id),
        name: name.to_string(),
        date,
        time: time.to_string(),
        location: location.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        price,
        capacity,
        available,
        image: Some(image.to_string()),
    }
}
