//! Live availability synchronizer.
//!
//! One task per mounted view: acquire a position (with fallback), attach to
//! the change feed, and keep the ranked location list rendered through a
//! [`MapProvider`] until the view unmounts.

pub mod guard;
pub mod position;
pub mod state;
pub mod synchronizer;
pub mod view;

pub use guard::RefreshGuard;
pub use position::{acquire_position, PositionFix, PositionSource};
pub use state::SyncState;
pub use synchronizer::{mount, SyncConfig, SyncHandle};
pub use view::{MapProvider, Notice, ViewEvent};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("view task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
