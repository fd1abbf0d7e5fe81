//! Single-use slots that carry one serialized invoice from the request that
//! submits it to the request that renders it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use log::{info, warn};
use rand::Rng;
use serde::Serialize;
use tokio::sync::Mutex;
use crate::server::model::invoice::Invoice;
use crate::server::util::time;

/// Opaque key of a slot, 128 random bits in hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HandoffToken(String);

impl HandoffToken {
    fn generate() -> Self {
        Self(format!("{:032x}", rand::thread_rng().gen::<u128>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandoffToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Slot {
    payload: String,
    stored_at: DateTime<Utc>,
}

struct Slots {
    slots: Mutex<HashMap<HandoffToken, Slot>>,
    ttl: TimeDelta,
}

/// Shared across workers, clones point at the same slots.
#[derive(Clone)]
pub(crate) struct HandoffStore(Arc<Slots>);

impl HandoffStore {
    pub fn new(ttl: Duration) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or_else(|_| TimeDelta::days(365));
        Self(Arc::new(Slots {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }))
    }

    /// Serialize the invoice into a fresh slot.
    pub async fn put(&self, invoice: &Invoice) -> anyhow::Result<HandoffToken> {
        let payload = serde_json::to_string(invoice).context("failed to serialize invoice")?;
        Ok(self.put_payload(payload).await)
    }

    pub(crate) async fn put_payload(&self, payload: String) -> HandoffToken {
        let mut slots = self.0.slots.lock().await;
        let mut token = HandoffToken::generate();
        while slots.contains_key(&token) {
            token = HandoffToken::generate();
        }
        slots.insert(token.clone(), Slot { payload, stored_at: time::helper::get_utc_now() });
        info!("stored hand-off slot, {} slot(s) pending", slots.len());
        token
    }

    /// Remove the slot and hand back its invoice.
    ///
    /// Unknown, already taken, expired and unreadable slots all come back as
    /// `None`: there is simply nothing to render.
    pub async fn take(&self, token: &str) -> Option<Invoice> {
        let slot = self
            .0
            .slots
            .lock()
            .await
            .remove(&HandoffToken(token.to_string()))?;
        if self.is_expired(&slot, time::helper::get_utc_now()) {
            info!("hand-off slot expired before it was taken");
            return None;
        }
        match serde_json::from_str(&slot.payload) {
            Ok(invoice) => Some(invoice),
            Err(e) => {
                warn!("discarding unreadable hand-off payload, {}", e);
                None
            }
        }
    }

    /// Drop every stale slot, returns how many went.
    pub async fn evict_expired(&self) -> usize {
        let now = time::helper::get_utc_now();
        let mut slots = self.0.slots.lock().await;
        let before = slots.len();
        slots.retain(|_, slot| !self.is_expired(slot, now));
        before - slots.len()
    }

    pub async fn len(&self) -> usize {
        self.0.slots.lock().await.len()
    }

    fn is_expired(&self, slot: &Slot, now: DateTime<Utc>) -> bool {
        now - slot.stored_at > self.0.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::util::time::helper::set_mock_now;

    const TTL: Duration = Duration::from_secs(600);

    fn invoice() -> Invoice {
        let mut invoice = Invoice::draft();
        invoice.details.invoice_number = "1001".to_string();
        invoice.items[0].price = 124.0;
        invoice.items[0].tax_included = true;
        invoice
    }

    #[tokio::test]
    async fn take_returns_what_was_put_once() {
        let store = HandoffStore::new(TTL);
        let token = store.put(&invoice()).await.unwrap();
        assert_eq!(token.as_str().len(), 32);
        assert_eq!(store.len().await, 1);

        assert_eq!(store.take(token.as_str()).await, Some(invoice()));
        assert_eq!(store.take(token.as_str()).await, None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn unknown_token_is_empty() {
        let store = HandoffStore::new(TTL);
        store.put(&invoice()).await.unwrap();
        assert_eq!(store.take("nope").await, None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn tokens_are_distinct() {
        let store = HandoffStore::new(TTL);
        let a = store.put(&invoice()).await.unwrap();
        let b = store.put(&invoice()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn malformed_payload_is_empty() {
        let store = HandoffStore::new(TTL);
        let token = store.put_payload("{\"items\": 42".to_string()).await;
        assert_eq!(store.take(token.as_str()).await, None);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn expired_slots_are_gone() {
        set_mock_now(1_000);
        let store = HandoffStore::new(TTL);
        let stale = store.put(&invoice()).await.unwrap();

        set_mock_now(1_000 + 601);
        let fresh = store.put(&invoice()).await.unwrap();
        assert_eq!(store.take(stale.as_str()).await, None);
        assert_eq!(store.take(fresh.as_str()).await, Some(invoice()));
        set_mock_now(0);
    }

    #[tokio::test]
    async fn evicts_only_stale_slots() {
        set_mock_now(5_000);
        let store = HandoffStore::new(TTL);
        store.put(&invoice()).await.unwrap();
        store.put(&invoice()).await.unwrap();

        set_mock_now(5_000 + 300);
        let fresh = store.put(&invoice()).await.unwrap();
        assert_eq!(store.evict_expired().await, 0);

        set_mock_now(5_000 + 601);
        assert_eq!(store.evict_expired().await, 2);
        assert_eq!(store.len().await, 1);
        assert!(store.take(fresh.as_str()).await.is_some());
        set_mock_now(0);
    }
}
