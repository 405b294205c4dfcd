//! `bookings` and `cancel` command handlers.

use std::fmt::Write as _;

use anyhow::Context;
use spotfinder_backend::BackendClient;
use spotfinder_core::{Booking, Reservations, RowId};

fn format_bookings(out: &mut String, title: &str, bookings: &[Booking]) {
    let _ = writeln!(out, "{title} ({})", bookings.len());
    if bookings.is_empty() {
        let _ = writeln!(out, "  none");
        return;
    }
    for booking in bookings {
        let _ = writeln!(
            out,
            "  {:<10}{:<24}{:<8}{:<18}{:<12}{:>8}  {}",
            booking.id.to_string(),
            booking.location_name,
            booking.spot_id,
            booking.start_time.format("%Y-%m-%d %H:%M"),
            booking.license_plate,
            booking.price,
            booking.status
        );
    }
}

/// Active bookings first, then history.
pub(crate) fn format_reservations(reservations: &Reservations) -> String {
    let mut out = String::new();
    format_bookings(&mut out, "Active", &reservations.active);
    out.push('\n');
    format_bookings(&mut out, "History", &reservations.history);
    out
}

/// # Errors
///
/// Returns an error if the bookings cannot be fetched.
pub(crate) async fn run_bookings(client: &BackendClient) -> anyhow::Result<()> {
    let reservations = Reservations::split(client.list_bookings().await?);
    print!("{}", format_reservations(&reservations));
    Ok(())
}

/// Cancel one active booking.
///
/// # Errors
///
/// Returns an error if the booking does not exist, is no longer active, or
/// the backend rejects the update.
pub(crate) async fn run_cancel(client: &BackendClient, booking_id: &str) -> anyhow::Result<()> {
    let id = RowId::from(booking_id);
    let reservations = Reservations::split(client.list_bookings().await?);
    let booking = reservations
        .find(&id)
        .ok_or_else(|| anyhow::anyhow!("booking '{id}' not found"))?;
    booking.ensure_cancellable()?;

    let cancelled = client
        .cancel_booking(&booking.id)
        .await
        .context("failed to cancel booking")?;
    println!(
        "Cancelled booking {} at {} (spot {})",
        cancelled.id, cancelled.location_name, cancelled.spot_id
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use spotfinder_core::BookingStatus;

    fn booking(id: i64, status: BookingStatus) -> Booking {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        Booking {
            id: RowId::Number(id),
            location_id: "p2".to_string(),
            location_name: "Central Plaza".to_string(),
            spot_id: "F1-03".to_string(),
            floor: 1,
            start_time: start,
            end_time: start + chrono::Duration::hours(2),
            vehicle_model: "Swift".to_string(),
            license_plate: "MH15AB1234".to_string(),
            price: Decimal::from(120),
            status,
        }
    }

    #[test]
    fn active_section_comes_before_history() {
        let reservations = Reservations::split(vec![
            booking(1, BookingStatus::Completed),
            booking(2, BookingStatus::Active),
        ]);
        let text = format_reservations(&reservations);
        let active = text.find("Active (1)").unwrap();
        let history = text.find("History (1)").unwrap();
        assert!(active < history);
        assert!(text.contains("completed"));
        assert!(text.contains("2025-03-01 10:00"));
    }

    #[test]
    fn empty_sections_say_none() {
        let text = format_reservations(&Reservations::default());
        assert_eq!(text.matches("  none").count(), 2);
    }
}
