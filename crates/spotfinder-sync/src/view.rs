//! The seam between the synchronizer and whatever draws the map.

use std::fmt;

use spotfinder_core::{Coordinate, RankedLocation};

/// Non-blocking, user-visible notices. None of these end the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Device position was denied or timed out; the default origin is in use.
    PositionUnavailable { reason: String },
    /// A fetch failed. `showing_stale` is true when the previous list is
    /// still on screen.
    FetchFailed { reason: String, showing_stale: bool },
    /// The change feed could not be attached; the list will not update until
    /// the view is mounted again.
    SubscriptionFailed { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::PositionUnavailable { reason } => {
                write!(f, "Using default location ({reason})")
            }
            Notice::FetchFailed {
                reason,
                showing_stale: true,
            } => write!(
                f,
                "Could not refresh parking locations; showing last known list ({reason})"
            ),
            Notice::FetchFailed {
                reason,
                showing_stale: false,
            } => write!(f, "Failed to load parking locations ({reason})"),
            Notice::SubscriptionFailed { reason } => {
                write!(f, "Live availability updates are unavailable ({reason})")
            }
        }
    }
}

/// Messages flowing from the map layer into the view task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A marker or card was picked.
    LocationSelected(String),
    Unmount,
}

/// Rendering capability injected into the synchronizer.
///
/// Calls are made from the view task only, one at a time.
pub trait MapProvider: Send + 'static {
    fn center_on(&mut self, origin: Coordinate);

    /// Replace all markers. `selected` is the id of the highlighted location,
    /// if any.
    fn render_markers(&mut self, locations: &[RankedLocation], selected: Option<&str>);

    fn notify(&mut self, notice: &Notice);
}
