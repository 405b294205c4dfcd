//! `spots`, `quote` and `book` command handlers.

use anyhow::Context;
use chrono::Utc;
use spotfinder_backend::BackendClient;
use spotfinder_core::{
    floor_layout, quote, spot_rows, LocationRecord, NewBooking, ParkingSpot, SpotStatus,
    VehicleDetails, DEFAULT_SPOTS_PER_FLOOR, SPOTS_PER_ROW,
};

/// Arguments of `book`, gathered from the command line.
#[derive(Debug)]
pub(crate) struct BookingRequest {
    pub location_id: String,
    pub floor: u32,
    pub spot_id: String,
    pub model: String,
    pub plate: String,
    pub hours: u32,
}

async fn find_location(client: &BackendClient, id: &str) -> anyhow::Result<LocationRecord> {
    let locations = client.list_locations().await?;
    locations
        .into_iter()
        .find(|l| l.id == id)
        .ok_or_else(|| anyhow::anyhow!("parking location '{id}' not found"))
}

fn status_glyph(status: SpotStatus) -> char {
    match status {
        SpotStatus::Available => ' ',
        SpotStatus::Occupied => 'x',
        SpotStatus::Selected => '*',
        SpotStatus::Disabled => '-',
    }
}

/// Render a floor as rows of `[ID glyph]` cells.
pub(crate) fn format_floor(spots: &[ParkingSpot]) -> String {
    spot_rows(spots, SPOTS_PER_ROW)
        .iter()
        .map(|row| {
            row.iter()
                .map(|spot| format!("[{} {}]", spot.id, status_glyph(spot.status)))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// # Errors
///
/// Returns an error if the location is unknown, the floor is out of range,
/// or the fetch fails.
pub(crate) async fn run_spots(
    client: &BackendClient,
    location_id: &str,
    floor: u32,
) -> anyhow::Result<()> {
    let location = find_location(client, location_id).await?;
    let spots = floor_layout(&location, floor, DEFAULT_SPOTS_PER_FLOOR)?;
    let free = spots
        .iter()
        .filter(|s| s.status == SpotStatus::Available)
        .count();

    println!("{} \u{2014} floor {floor} of {}", location.name, location.floors);
    println!("{free} of {} spots free ('x' = occupied)", spots.len());
    println!();
    println!("{}", format_floor(&spots));
    Ok(())
}

/// # Errors
///
/// Returns an error if the location is unknown or `hours` is out of range.
pub(crate) async fn run_quote(
    client: &BackendClient,
    location_id: &str,
    hours: u32,
) -> anyhow::Result<()> {
    let location = find_location(client, location_id).await?;
    let total = quote(location.price_per_hour, hours)?;
    println!(
        "{}: {hours}h at {}/h = {total}",
        location.name, location.price_per_hour
    );
    Ok(())
}

/// Validate and submit a booking.
///
/// # Errors
///
/// Returns an error if the location or spot is unknown, the spot is taken,
/// the vehicle details are invalid, or the backend rejects the insert.
pub(crate) async fn run_book(
    client: &BackendClient,
    request: &BookingRequest,
) -> anyhow::Result<()> {
    let location = find_location(client, &request.location_id).await?;
    let spots = floor_layout(&location, request.floor, DEFAULT_SPOTS_PER_FLOOR)?;
    let spot = spots
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(&request.spot_id))
        .with_context(|| {
            format!(
                "spot '{}' does not exist on floor {}",
                request.spot_id, request.floor
            )
        })?;

    let vehicle = VehicleDetails {
        model: request.model.clone(),
        license_plate: request.plate.clone(),
    };
    let new_booking = NewBooking::prepare(&location, spot, &vehicle, Utc::now(), request.hours)?;

    tracing::info!(
        location_id = %new_booking.location_id,
        spot_id = %new_booking.spot_id,
        price = %new_booking.price,
        "submitting booking"
    );
    let booking = client
        .create_booking(&new_booking)
        .await
        .context("failed to create booking")?;

    println!("Booking confirmed: {}", booking.id);
    println!(
        "  {} \u{2014} spot {} (floor {})",
        booking.location_name, booking.spot_id, booking.floor
    );
    println!(
        "  {} to {}",
        booking.start_time.format("%Y-%m-%d %H:%M"),
        booking.end_time.format("%Y-%m-%d %H:%M")
    );
    println!(
        "  {} ({})  total {}",
        booking.vehicle_model, booking.license_plate, booking.price
    );
    println!("{}", remaining_line(&location.with_spot_taken()));
    Ok(())
}

/// Availability at `location` as it stands after a booking.
fn remaining_line(location: &LocationRecord) -> String {
    format!(
        "  {} of {} spots left at {}",
        location.available_spots(),
        location.total_spots(),
        location.name
    )
}
