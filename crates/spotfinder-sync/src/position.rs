//! Position acquisition with a bounded wait and a default origin.

use std::time::Duration;

use spotfinder_backend::PositionProvider;
use spotfinder_core::Coordinate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionSource {
    Device,
    Fallback { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    pub source: PositionSource,
}

impl PositionFix {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, PositionSource::Fallback { .. })
    }
}

/// Ask `provider` for the current position, waiting at most `timeout`.
///
/// Denial, lookup failure, timeout and an out-of-range coordinate all resolve
/// to `fallback`. Falling back is routine (permission is often denied), so it
/// is logged at `info`.
pub async fn acquire_position<P: PositionProvider>(
    provider: &P,
    timeout: Duration,
    fallback: Coordinate,
) -> PositionFix {
    let reason = match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(Ok(coordinate)) if !coordinate.is_valid() => {
            format!("device reported an invalid coordinate ({coordinate})")
        }
        Ok(Ok(coordinate)) => {
            tracing::debug!(%coordinate, "device position acquired");
            return PositionFix {
                coordinate,
                source: PositionSource::Device,
            };
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timed out after {}ms", timeout.as_millis()),
    };

    tracing::info!(%reason, origin = %fallback, "device position unavailable; using default origin");
    PositionFix {
        coordinate: fallback,
        source: PositionSource::Fallback { reason },
    }
}
