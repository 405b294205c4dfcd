//! Plain-text rendering of the ranked list.

use std::io::Write;

use spotfinder_core::{Coordinate, RankedLocation};
use spotfinder_sync::{MapProvider, Notice};

/// Format a ranked list as an aligned table. The selected row is starred.
pub(crate) fn format_table(locations: &[RankedLocation], selected: Option<&str>) -> String {
    use std::fmt::Write as _;

    let mut out = format!(
        "  {:<8}{:<28}{:>10}{:>12}{:>10}  ADDRESS\n",
        "ID", "NAME", "DISTANCE", "FREE/TOTAL", "PRICE/H"
    );
    for ranked in locations {
        let location = &ranked.location;
        let marker = if selected == Some(location.id.as_str()) {
            '*'
        } else {
            ' '
        };
        let distance = ranked.distance_label.as_deref().unwrap_or("\u{2014}");
        let name = truncate(&location.name, 26);
        let spots = format!("{}/{}", location.available_spots(), location.total_spots());
        let _ = writeln!(
            out,
            "{marker} {:<8}{:<28}{:>10}{:>12}{:>10}  {}",
            location.id, name, distance, spots, location.price_per_hour, location.address
        );
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

/// [`MapProvider`] that redraws the table on stdout.
pub(crate) struct TerminalMap;

impl MapProvider for TerminalMap {
    fn center_on(&mut self, origin: Coordinate) {
        println!("Searching near {origin}");
    }

    fn render_markers(&mut self, locations: &[RankedLocation], selected: Option<&str>) {
        let stamp = chrono::Local::now().format("%H:%M:%S");
        let mut stdout = std::io::stdout().lock();
        // Clear screen and home the cursor.
        let _ = write!(stdout, "\x1b[2J\x1b[H");
        let _ = writeln!(
            stdout,
            "Parking near you ({} locations, updated {stamp})",
            locations.len()
        );
        if locations.is_empty() {
            let _ = writeln!(stdout, "No parking locations found");
        } else {
            let _ = write!(stdout, "{}", format_table(locations, selected));
        }
        let _ = writeln!(
            stdout,
            "\nType a location id and press Enter to select it; Ctrl-C to quit."
        );
        let _ = stdout.flush();
    }

    fn notify(&mut self, notice: &Notice) {
        eprintln!("! {notice}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use spotfinder_core::{Availability, LocationRecord};

    fn ranked(id: &str, name: &str, label: Option<&str>) -> RankedLocation {
        RankedLocation {
            location: LocationRecord {
                id: id.to_string(),
                name: name.to_string(),
                address: "123 Main St, Downtown".to_string(),
                coordinate: None,
                price_per_hour: Decimal::from(60),
                spots: Availability::new(80, 12).unwrap(),
                floors: 2,
            },
            distance_km: None,
            distance_label: label.map(str::to_string),
        }
    }

    #[test]
    fn table_marks_selected_row() {
        let rows = vec![
            ranked("p1", "Central Plaza", Some("1.1 km")),
            ranked("p2", "City Center Parking", Some("2.4 km")),
        ];
        let table = format_table(&rows, Some("p2"));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("  p1"));
        assert!(lines[2].starts_with("* p2"));
        assert!(lines[1].contains("1.1 km"));
        assert!(lines[1].contains("12/80"));
    }

    #[test]
    fn missing_distance_shows_dash() {
        let table = format_table(&[ranked("p1", "Central Plaza", None)], None);
        assert!(table.contains('\u{2014}'));
    }

    #[test]
    fn long_names_are_truncated() {
        assert_eq!(truncate("Short", 26), "Short");
        let long = truncate("An Extremely Long Parking Garage Name", 26);
        assert_eq!(long.chars().count(), 26);
        assert!(long.ends_with("..."));
    }
}
