//! Backend collaborators: the PostgREST location/booking client, the polling
//! change feed, and position providers.

pub mod client;
pub mod error;
pub mod feed;
pub mod position;
mod retry;
pub mod service;
pub mod types;

pub use client::{BackendClient, BackendSettings};
pub use error::{BackendError, PositionError};
pub use feed::{PollingChangeFeed, PollingSubscription};
pub use position::{DevicePosition, IpPositionProvider};
pub use service::{ChangeCallback, ChangeFeed, LocationSource, PositionProvider, Subscription};
