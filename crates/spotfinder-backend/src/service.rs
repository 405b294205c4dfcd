//! Collaborator contracts consumed by the synchronizer.
//!
//! Each trait has one production implementation in this crate; tests supply
//! their own.

use std::future::Future;
use std::sync::Arc;

use spotfinder_core::{Coordinate, LocationRecord};

use crate::error::{BackendError, PositionError};

/// Returns the full current set of parking locations (no pagination).
pub trait LocationSource: Send + Sync + 'static {
    fn fetch_all_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<LocationRecord>, BackendError>> + Send;
}

impl<T: LocationSource> LocationSource for Arc<T> {
    fn fetch_all_locations(
        &self,
    ) -> impl Future<Output = Result<Vec<LocationRecord>, BackendError>> + Send {
        (**self).fetch_all_locations()
    }
}

/// Invoked whenever the feed reports that something changed.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// A live listener attachment. Detached on [`Subscription::unsubscribe`] or
/// when dropped.
pub trait Subscription: Send + 'static {
    fn unsubscribe(self);
}

/// "Any row changed" notifications; callers re-fetch to learn what.
pub trait ChangeFeed: Send + Sync + 'static {
    type Subscription: Subscription;

    fn subscribe(
        &self,
        on_change: ChangeCallback,
    ) -> impl Future<Output = Result<Self::Subscription, BackendError>> + Send;
}

/// Source of the user's current position. May fail (denied, unreachable);
/// callers supply the fallback.
pub trait PositionProvider: Send + Sync + 'static {
    fn current_position(&self) -> impl Future<Output = Result<Coordinate, PositionError>> + Send;
}
