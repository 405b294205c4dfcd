//! Position providers.

use std::time::Duration;

use reqwest::Client;
use spotfinder_core::Coordinate;

use crate::error::{BackendError, PositionError};
use crate::service::PositionProvider;
use crate::types::PositionResponse;

/// Resolves the current position from an IP geolocation endpoint returning
/// `{"lat": .., "lon": ..}` (or `latitude`/`longitude`).
pub struct IpPositionProvider {
    client: Client,
    url: String,
}

impl IpPositionProvider {
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the HTTP client cannot be built.
    pub fn new(url: &str, timeout: Duration, user_agent: &str) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.to_owned())
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }
}

impl PositionProvider for IpPositionProvider {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(BackendError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            }
            .into());
        }

        let body = response.text().await.map_err(BackendError::from)?;
        let parsed: PositionResponse =
            serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
                context: format!("position({})", self.url),
                source: e,
            })?;

        let coordinate = Coordinate::new(parsed.lat, parsed.lng);
        if !coordinate.is_valid() {
            return Err(PositionError::InvalidCoordinate {
                lat: parsed.lat,
                lng: parsed.lng,
            });
        }
        Ok(coordinate)
    }
}

/// The "device" position as configured for this process.
pub enum DevicePosition {
    /// Position pinned by the caller.
    Fixed(Coordinate),
    /// Looked up over the network.
    Ip(IpPositionProvider),
    /// No source configured; behaves like a denied permission.
    Disabled,
}

impl PositionProvider for DevicePosition {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        match self {
            DevicePosition::Fixed(c) if c.is_valid() => Ok(*c),
            DevicePosition::Fixed(c) => Err(PositionError::InvalidCoordinate {
                lat: c.lat,
                lng: c.lng,
            }),
            DevicePosition::Ip(provider) => provider.current_position().await,
            DevicePosition::Disabled => Err(PositionError::Denied),
        }
    }
}
