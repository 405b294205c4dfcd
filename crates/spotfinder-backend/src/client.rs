//! HTTP client for the backend's PostgREST surface.
//!
//! Wraps `reqwest` with API-key headers, retry on transient failures, and
//! typed row conversion. Reads go through [`retry_with_backoff`]; booking
//! inserts and cancellations are sent once.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, Url};
use sha2::{Digest, Sha256};
use spotfinder_core::{AppConfig, Booking, BookingStatus, LocationRecord, NewBooking, RowId};

use crate::error::BackendError;
use crate::retry::retry_with_backoff;
use crate::service::LocationSource;
use crate::types::LocationRow;

/// Connection settings for [`BackendClient`].
#[derive(Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub api_key: String,
    pub locations_table: String,
    pub bookings_table: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl BackendSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.backend_url.clone(),
            api_key: config.backend_key.clone(),
            locations_table: config.locations_table.clone(),
            bookings_table: config.bookings_table.clone(),
            timeout_secs: config.request_timeout_secs,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        }
    }
}

impl std::fmt::Debug for BackendSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("locations_table", &self.locations_table)
            .field("bookings_table", &self.bookings_table)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}

/// Client for the parking backend.
pub struct BackendClient {
    client: Client,
    base_url: Url,
    api_key: String,
    locations_table: String,
    bookings_table: String,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl BackendClient {
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`BackendError::InvalidUrl`] if the base URL
    /// does not parse.
    pub fn new(settings: &BackendSettings) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.clone())
            .build()?;

        // Exactly one trailing slash so `join` appends rather than replacing
        // the last path segment.
        let normalised = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| BackendError::InvalidUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: settings.api_key.clone(),
            locations_table: settings.locations_table.clone(),
            bookings_table: settings.bookings_table.clone(),
            max_retries: settings.max_retries,
            retry_backoff_base_ms: settings.retry_backoff_base_ms,
        })
    }

    /// Fetch every parking location.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Http`] / [`BackendError::UnexpectedStatus`] once the
    ///   retry budget is spent.
    /// - [`BackendError::Deserialize`] if the rows do not match the expected shape.
    pub async fn list_locations(&self) -> Result<Vec<LocationRecord>, BackendError> {
        let url = self.locations_url()?;
        let body = retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            let url = url.clone();
            async move { self.get_text(&url).await }
        })
        .await?;

        let rows: Vec<LocationRow> =
            serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
                context: format!("list_locations({})", self.locations_table),
                source: e,
            })?;

        tracing::debug!(count = rows.len(), table = %self.locations_table, "fetched parking locations");
        Ok(rows.into_iter().map(LocationRow::into_record).collect())
    }

    /// SHA-256 of the current location listing, used to detect changes.
    ///
    /// Single attempt: the change feed polls again on its next tick.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Http`] or [`BackendError::UnexpectedStatus`] if
    /// the listing cannot be fetched.
    pub async fn locations_fingerprint(&self) -> Result<String, BackendError> {
        let url = self.locations_url()?;
        let body = self.get_text(&url).await?;
        Ok(fingerprint(&body))
    }

    /// Insert a booking and return the stored row.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Http`] / [`BackendError::UnexpectedStatus`] on failure.
    /// - [`BackendError::Deserialize`] if the echoed row is malformed.
    /// - [`BackendError::EmptyResponse`] if no row is echoed back.
    pub async fn create_booking(&self, booking: &NewBooking) -> Result<Booking, BackendError> {
        let url = self.table_url(&self.bookings_table)?;
        let response = self
            .authed(self.client.post(url.clone()))
            .header("Prefer", "return=representation")
            .json(booking)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let context = format!("create_booking({})", self.bookings_table);
        let rows: Vec<Booking> =
            serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
                context: context.clone(),
                source: e,
            })?;

        let created = rows
            .into_iter()
            .next()
            .ok_or(BackendError::EmptyResponse { context })?;
        tracing::info!(
            booking_id = %created.id,
            location_id = %created.location_id,
            spot_id = %created.spot_id,
            "booking created"
        );
        Ok(created)
    }

    /// Fetch every booking, newest first.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Http`] / [`BackendError::UnexpectedStatus`] once the
    ///   retry budget is spent.
    /// - [`BackendError::Deserialize`] if the rows do not match the expected shape.
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, BackendError> {
        let mut url = self.table_url(&self.bookings_table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "start_time.desc");
        let body = retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            let url = url.clone();
            async move { self.get_text(&url).await }
        })
        .await?;

        let bookings: Vec<Booking> =
            serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
                context: format!("list_bookings({})", self.bookings_table),
                source: e,
            })?;

        tracing::debug!(count = bookings.len(), table = %self.bookings_table, "fetched bookings");
        Ok(bookings)
    }

    /// Mark booking `id` as cancelled and return the updated row.
    ///
    /// # Errors
    ///
    /// - [`BackendError::Http`] / [`BackendError::UnexpectedStatus`] on failure.
    /// - [`BackendError::Deserialize`] if the echoed row is malformed.
    /// - [`BackendError::EmptyResponse`] if no row matched `id`.
    pub async fn cancel_booking(&self, id: &RowId) -> Result<Booking, BackendError> {
        let mut url = self.table_url(&self.bookings_table)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        let response = self
            .authed(self.client.patch(url.clone()))
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "status": BookingStatus::Cancelled }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let context = format!("cancel_booking({}, {id})", self.bookings_table);
        let rows: Vec<Booking> =
            serde_json::from_str(&body).map_err(|e| BackendError::Deserialize {
                context: context.clone(),
                source: e,
            })?;

        let cancelled = rows
            .into_iter()
            .next()
            .ok_or(BackendError::EmptyResponse { context })?;
        tracing::info!(booking_id = %cancelled.id, status = %cancelled.status, "booking cancelled");
        Ok(cancelled)
    }

    fn table_url(&self, table: &str) -> Result<Url, BackendError> {
        self.base_url
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| BackendError::InvalidUrl {
                url: format!("{}rest/v1/{table}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// Listing URL with a stable order so the fingerprint only moves when
    /// the data does.
    fn locations_url(&self) -> Result<Url, BackendError> {
        let mut url = self.table_url(&self.locations_table)?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "id.asc");
        Ok(url)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Sends an authenticated GET and returns the body of a 2xx response.
    async fn get_text(&self, url: &Url) -> Result<String, BackendError> {
        let response = self
            .authed(self.client.get(url.clone()))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

impl LocationSource for BackendClient {
    async fn fetch_all_locations(&self) -> Result<Vec<LocationRecord>, BackendError> {
        self.list_locations().await
    }
}

fn fingerprint(body: &str) -> String {
    format!("{:x}", Sha256::digest(body.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> BackendClient {
        BackendClient::new(&BackendSettings {
            base_url: base_url.to_owned(),
            api_key: "test-key".to_owned(),
            locations_table: "parking_locations".to_owned(),
            bookings_table: "bookings".to_owned(),
            timeout_secs: 30,
            user_agent: "spotfinder-test".to_owned(),
            max_retries: 0,
            retry_backoff_base_ms: 0,
        })
        .expect("client construction should not fail")
    }

    #[test]
    fn locations_url_has_select_and_order() {
        let client = test_client("https://demo.supabase.co");
        let url = client.locations_url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://demo.supabase.co/rest/v1/parking_locations?select=*&order=id.asc"
        );
    }

    #[test]
    fn base_url_path_is_preserved() {
        let client = test_client("http://localhost:54321/proxy/");
        let url = client.table_url("bookings").unwrap();
        assert_eq!(url.as_str(), "http://localhost:54321/proxy/rest/v1/bookings");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = BackendClient::new(&BackendSettings {
            base_url: "not a url".to_owned(),
            api_key: "k".to_owned(),
            locations_table: "parking_locations".to_owned(),
            bookings_table: "bookings".to_owned(),
            timeout_secs: 30,
            user_agent: "ua".to_owned(),
            max_retries: 0,
            retry_backoff_base_ms: 0,
        });
        assert!(matches!(result, Err(BackendError::InvalidUrl { .. })));
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        let a = fingerprint("[]");
        assert_eq!(a.len(), 64, "SHA-256 hex is 64 chars");
        assert_eq!(a, fingerprint("[]"));
        assert_ne!(a, fingerprint("[{}]"));
    }

    #[test]
    fn settings_debug_redacts_key() {
        let settings = BackendSettings {
            base_url: "https://demo.supabase.co".to_owned(),
            api_key: "super-secret".to_owned(),
            locations_table: "parking_locations".to_owned(),
            bookings_table: "bookings".to_owned(),
            timeout_secs: 30,
            user_agent: "ua".to_owned(),
            max_retries: 0,
            retry_backoff_base_ms: 0,
        };
        assert!(!format!("{settings:?}").contains("super-secret"));
    }
}
