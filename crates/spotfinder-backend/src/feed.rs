//! Polling change feed.
//!
//! Polls the location listing on a fixed interval and fires the callback when
//! its SHA-256 fingerprint moves. The fingerprint taken while subscribing is
//! the baseline, so attaching never fires by itself.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::client::BackendClient;
use crate::error::BackendError;
use crate::service::{ChangeCallback, ChangeFeed, Subscription};

pub struct PollingChangeFeed {
    client: Arc<BackendClient>,
    interval: Duration,
}

impl PollingChangeFeed {
    #[must_use]
    pub fn new(client: Arc<BackendClient>, interval: Duration) -> Self {
        Self { client, interval }
    }
}

/// Handle to the background poll task. Dropping it stops polling.
pub struct PollingSubscription {
    task: JoinHandle<()>,
}

impl Subscription for PollingSubscription {
    fn unsubscribe(self) {
        tracing::debug!("change feed listener detached");
        drop(self);
    }
}

impl Drop for PollingSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ChangeFeed for PollingChangeFeed {
    type Subscription = PollingSubscription;

    async fn subscribe(
        &self,
        on_change: ChangeCallback,
    ) -> Result<PollingSubscription, BackendError> {
        let baseline = self.client.locations_fingerprint().await?;
        let client = Arc::clone(&self.client);
        let interval = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick fires immediately; the baseline already covers it.
            ticker.tick().await;

            let mut last = baseline;
            loop {
                ticker.tick().await;
                match client.locations_fingerprint().await {
                    Ok(current) if current != last => {
                        tracing::debug!(fingerprint = %current, "parking locations changed");
                        last = current;
                        on_change();
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "change feed poll failed; retrying next tick");
                    }
                }
            }
        });

        tracing::debug!(?interval, "change feed listener attached");
        Ok(PollingSubscription { task })
    }
}
