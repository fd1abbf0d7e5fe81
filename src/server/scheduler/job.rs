use std::time::Duration;
use log::{info};
use tokio::{pin, select, time};
use tokio_util::sync::CancellationToken;
use tokio_util::task::task_tracker;
use crate::server::handoff::HandoffStore;

pub(crate) const SWEEP_INTERVAL: Duration = Duration::from_secs(60); // run once every minute

async fn worker(store: HandoffStore, interval: Duration, cancel_token: CancellationToken) {
    let interval = time::interval(interval);
    pin!(interval);
    loop {
        select! {
            _ = interval.tick() => {},
            _ = cancel_token.cancelled() => {
                info!("received cancel signal, returning gracefully");
                return;
            }
        }

        let evicted = store.evict_expired().await;
        if evicted > 0 {
            info!("evicted {} expired hand-off slot(s), {} pending", evicted, store.len().await);
        }
    }
}

/// Evict expired hand-off slots every `interval` until cancelled.
pub async fn handoff_sweeper(store: HandoffStore, interval: Duration, cancel_token: CancellationToken) {
    let tracker = task_tracker::TaskTracker::new();
    tracker.spawn(worker(store, interval, cancel_token));
    if tracker.close() {
        tracker.wait().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::model::invoice::Invoice;
    use crate::server::util::time::helper::set_mock_now;

    #[tokio::test]
    async fn sweeper_stops_on_cancel() {
        set_mock_now(100);
        let store = HandoffStore::new(Duration::from_secs(30));
        store.put(&Invoice::draft()).await.unwrap();
        // current thread runtime, the spawned sweeper reads the same mock clock
        set_mock_now(200);
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(handoff_sweeper(store.clone(), Duration::from_millis(10), cancel_token.clone()));

        let mut waited = 0;
        while store.len().await > 0 && waited < 100 {
            time::sleep(Duration::from_millis(10)).await;
            waited += 1;
        }
        assert_eq!(store.len().await, 0);

        cancel_token.cancel();
        time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
        set_mock_now(0);
    }
}
