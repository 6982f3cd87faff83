//! Command-line front end for the reservation ledger.
//!
//! Operates on the JSON documents under `LEDGER_DATA_DIR` and prints results as
//! JSON. Collections are seeded on every start if absent.

use clap::{Parser, Subcommand};
use reservation_ledger::{Ledger, LedgerConfig, JsonFileStore};
use reservation_ledger_core::environment::SystemClock;
use reservation_ledger_core::types::{
    CreateReservation, EventId, ReservationId, UpdateReservation, UserId,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reservation-ledger", about = "Cultural event reservation ledger")]
struct Cli {
    /// Directory holding the JSON documents (overrides LEDGER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed any missing collection
    Init,
    /// Drop all collections and seed them again
    Reset,
    /// Check a username and password
    Login { username: String, password: String },
    /// List events with free places
    Events,
    /// Show one event
    Event { id: i64 },
    /// List a user's reservations, most recent first
    Reservations { user_id: i64 },
    /// Show one reservation
    Reservation { id: i64 },
    /// Reserve places on an event
    Reserve {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        event: i64,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change the quantity of a reservation
    Update {
        id: i64,
        #[arg(long)]
        quantity: u32,
    },
    /// Cancel a reservation
    Cancel { id: i64 },
    /// Dashboard statistics for a user
    Dashboard { user_id: i64 },
    /// Add sample reservations for a user without any
    DemoData { user_id: i64 },
    /// Remove every reservation
    ClearReservations,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = LedgerConfig::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data_dir.clone());
    info!(
        data_dir = %data_dir.display(),
        capacity_policy = %config.capacity_policy,
        simulate_latency = config.simulate_latency,
        "Configuration loaded"
    );

    let ledger = Ledger::with_options(JsonFileStore::new(data_dir), SystemClock, config.options());
    let seeded = ledger.initialize().await?;

    match cli.command {
        Command::Init => print_json(&seeded)?,
        Command::Reset => print_json(&ledger.reset().await?)?,
        Command::Login { username, password } => {
            print_json(&ledger.authenticate(&username, &password).await?)?;
        }
        Command::Events => print_json(&ledger.list_events().await?)?,
        Command::Event { id } => print_json(&ledger.get_event(EventId::new(id)).await?)?,
        Command::Reservations { user_id } => {
            print_json(&ledger.list_reservations(UserId::new(user_id)).await?)?;
        }
        Command::Reservation { id } => {
            print_json(&ledger.get_reservation(ReservationId::new(id)).await?)?;
        }
        Command::Reserve {
            user,
            event,
            quantity,
        } => {
            let request =
                CreateReservation::new(UserId::new(user), EventId::new(event)).with_quantity(quantity);
            print_json(&ledger.create_reservation(request).await?)?;
        }
        Command::Update { id, quantity } => {
            let updated = ledger
                .update_reservation(ReservationId::new(id), UpdateReservation { quantity })
                .await?;
            print_json(&updated)?;
        }
        Command::Cancel { id } => {
            print_json(&ledger.cancel_reservation(ReservationId::new(id)).await?)?;
        }
        Command::Dashboard { user_id } => {
            print_json(&ledger.dashboard(UserId::new(user_id)).await?)?;
        }
        Command::DemoData { user_id } => {
            let added = ledger.add_demo_reservations(UserId::new(user_id)).await?;
            print_json(&serde_json::json!({ "added": added }))?;
        }
        Command::ClearReservations => {
            let removed = ledger.clear_reservations().await?;
            print_json(&serde_json::json!({ "removed": removed }))?;
        }
    }

    Ok(())
}
