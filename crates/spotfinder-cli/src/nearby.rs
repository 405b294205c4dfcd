//! `nearby` and `watch` command handlers.

use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use spotfinder_backend::{BackendClient, DevicePosition, PollingChangeFeed};
use spotfinder_core::{filter_by_query, rank_locations, sort_by_distance, AppConfig};
use spotfinder_sync::{acquire_position, mount, PositionSource, SyncConfig, ViewEvent};
use tokio::sync::mpsc;

use crate::terminal::{format_table, TerminalMap};

/// One-shot ranking: position, fetch, rank, then optionally filter and sort.
///
/// # Errors
///
/// Returns an error if the location fetch fails or JSON output cannot be
/// serialized.
pub(crate) async fn run_nearby(
    config: &AppConfig,
    client: &BackendClient,
    position: &DevicePosition,
    query: Option<&str>,
    sort: bool,
    json: bool,
) -> anyhow::Result<()> {
    let fix = acquire_position(
        position,
        Duration::from_millis(config.position_timeout_ms),
        config.default_origin,
    )
    .await;
    if let PositionSource::Fallback { reason } = &fix.source {
        eprintln!("Using default location ({reason})");
    }

    let records = client.list_locations().await?;
    let mut ranked = rank_locations(fix.coordinate, &records);
    ranked = filter_by_query(ranked, query.unwrap_or_default());
    if sort {
        ranked = sort_by_distance(ranked);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    if ranked.is_empty() {
        println!("No parking locations found");
        return Ok(());
    }
    println!("Searching near {}", fix.coordinate);
    print!("{}", format_table(&ranked, None));
    Ok(())
}

/// Mount a live view and keep it rendered until Ctrl-C. Lines typed on stdin
/// are treated as location ids to select.
///
/// # Errors
///
/// Returns an error if the stdin thread cannot be spawned, the Ctrl-C
/// handler cannot be installed, or the view task panicked.
pub(crate) async fn run_watch(
    config: &AppConfig,
    client: Arc<BackendClient>,
    position: DevicePosition,
    query: Option<String>,
) -> anyhow::Result<()> {
    let feed = PollingChangeFeed::new(
        Arc::clone(&client),
        Duration::from_millis(config.feed_poll_interval_ms),
    );
    let mut sync_config = SyncConfig::from_app_config(config);
    sync_config.query = query;

    let handle = mount(sync_config, client, feed, position, TerminalMap);

    // Blocking reads stay off the runtime so shutdown never waits on stdin.
    // The thread is detached and dies with the process.
    let events = handle.event_sender();
    std::thread::Builder::new()
        .name("stdin-selections".to_string())
        .spawn(move || forward_selections(std::io::stdin().lock(), &events))?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("received ctrl-c, unmounting view");
    handle.unmount().await?;
    Ok(())
}

/// Send each non-blank line of `reader` as a selection. Stops at EOF, on a
/// read error, or once the view has gone away.
fn forward_selections<R: BufRead>(reader: R, events: &mpsc::UnboundedSender<ViewEvent>) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        let id = line.trim();
        if id.is_empty() {
            continue;
        }
        if events
            .send(ViewEvent::LocationSelected(id.to_string()))
            .is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn stdin_lines_become_selections() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        forward_selections(Cursor::new("p1\n\n  p2 \n"), &tx);

        let mut selected = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                ViewEvent::LocationSelected(id) => selected.push(id),
                ViewEvent::Unmount => panic!("unexpected unmount"),
            }
        }
        assert_eq!(selected, vec!["p1".to_string(), "p2".to_string()]);
    }

    #[test]
    fn forwarding_stops_when_view_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        // Returns instead of looping over the remaining input.
        forward_selections(Cursor::new("p1\np2\n"), &tx);
        assert!(tx.is_closed());
    }
}
