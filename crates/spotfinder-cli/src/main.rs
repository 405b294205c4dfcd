mod booking;
mod nearby;
mod reservations;
mod terminal;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use spotfinder_backend::{BackendClient, BackendSettings, DevicePosition, IpPositionProvider};
use spotfinder_core::{AppConfig, DEFAULT_STAY_HOURS};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "spotfinder")]
#[command(about = "Find nearby parking and watch live availability")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Pins the origin instead of asking the position provider.
#[derive(Debug, Clone, Copy, clap::Args)]
struct OriginArgs {
    /// Latitude of the search origin
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Longitude of the search origin
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List parking locations ranked by distance
    Nearby {
        #[command(flatten)]
        origin: OriginArgs,
        /// Only show locations whose name or address contains this text
        #[arg(long)]
        query: Option<String>,
        /// Order by distance, nearest first
        #[arg(long)]
        sort: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Keep the ranked list up to date until Ctrl-C
    Watch {
        #[command(flatten)]
        origin: OriginArgs,
        /// Only show locations whose name or address contains this text
        #[arg(long)]
        query: Option<String>,
    },
    /// Show the spot grid for one floor of a location
    Spots {
        /// Location id
        #[arg(long)]
        location: String,
        /// Floor number (1-based)
        #[arg(long, default_value_t = 1)]
        floor: u32,
    },
    /// Price a stay at a location
    Quote {
        /// Location id
        #[arg(long)]
        location: String,
        /// Length of stay in hours
        #[arg(long, default_value_t = DEFAULT_STAY_HOURS)]
        hours: u32,
    },
    /// Reserve a spot
    Book {
        /// Location id
        #[arg(long)]
        location: String,
        /// Floor number (1-based)
        #[arg(long)]
        floor: u32,
        /// Spot id as shown by `spots` (e.g. F1-03)
        #[arg(long)]
        spot: String,
        /// Car model
        #[arg(long)]
        model: String,
        /// License plate
        #[arg(long)]
        plate: String,
        /// Length of stay in hours
        #[arg(long, default_value_t = DEFAULT_STAY_HOURS)]
        hours: u32,
    },
    /// List active bookings and booking history
    Bookings,
    /// Cancel an active booking
    Cancel {
        /// Booking id as shown by `bookings`
        #[arg(long)]
        booking: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = spotfinder_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = Arc::new(BackendClient::new(&BackendSettings::from_app_config(
        &config,
    ))?);

    match cli.command {
        Commands::Nearby {
            origin,
            query,
            sort,
            json,
        } => {
            let position = device_position(&config, origin)?;
            nearby::run_nearby(&config, &client, &position, query.as_deref(), sort, json).await?;
        }
        Commands::Watch { origin, query } => {
            let position = device_position(&config, origin)?;
            nearby::run_watch(&config, client, position, query).await?;
        }
        Commands::Spots { location, floor } => {
            booking::run_spots(&client, &location, floor).await?;
        }
        Commands::Quote { location, hours } => {
            booking::run_quote(&client, &location, hours).await?;
        }
        Commands::Book {
            location,
            floor,
            spot,
            model,
            plate,
            hours,
        } => {
            booking::run_book(
                &client,
                &booking::BookingRequest {
                    location_id: location,
                    floor,
                    spot_id: spot,
                    model,
                    plate,
                    hours,
                },
            )
            .await?;
        }
        Commands::Bookings => {
            reservations::run_bookings(&client).await?;
        }
        Commands::Cancel { booking } => {
            reservations::run_cancel(&client, &booking).await?;
        }
    }

    Ok(())
}

/// Explicit `--lat/--lng` wins, then the configured lookup URL; with neither
/// the provider behaves like a denied permission and the default origin is
/// used.
fn device_position(config: &AppConfig, origin: OriginArgs) -> anyhow::Result<DevicePosition> {
    if let (Some(lat), Some(lng)) = (origin.lat, origin.lng) {
        return Ok(DevicePosition::Fixed(spotfinder_core::Coordinate::new(lat, lng)));
    }
    match &config.position_url {
        Some(url) => Ok(DevicePosition::Ip(IpPositionProvider::new(
            url,
            Duration::from_millis(config.position_timeout_ms),
            &config.user_agent,
        )?)),
        None => Ok(DevicePosition::Disabled),
    }
}
