//! Quick-search hand-off between the home page and the listings page.
//!
//! Each browsing session owns one slot holding at most one pending quick
//! search. Reading the slot removes its content, so a back-navigation to the
//! listings page never re-applies stale criteria.

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::services::cache::{keys, RedisCache};

use super::criteria::{FilterCriteria, QuickSearch};

/// Storage for per-session slots holding raw JSON payloads
#[async_trait]
pub trait HandoffSlot: Send + Sync {
    /// Stores `payload`, replacing any unread one, expiring after `ttl`
    async fn put(&self, session_id: &str, payload: String, ttl: Duration) -> Result<()>;

    /// Removes and returns the pending payload, if any
    async fn take(&self, session_id: &str) -> Result<Option<String>>;
}

#[async_trait]
impl HandoffSlot for RedisCache {
    async fn put(&self, session_id: &str, payload: String, ttl: Duration) -> Result<()> {
        self.put_raw(&keys::handoff(session_id), payload, ttl).await
    }

    async fn take(&self, session_id: &str) -> Result<Option<String>> {
        self.take_raw(&keys::handoff(session_id)).await
    }
}

/// Process-local slots, for tests and single-instance development
#[derive(Default)]
pub struct MemorySlot {
    slots: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HandoffSlot for MemorySlot {
    async fn put(&self, session_id: &str, payload: String, ttl: Duration) -> Result<()> {
        let mut slots = self.slots.lock();
        slots.retain(|_, (_, expires_at)| *expires_at > Instant::now());
        slots.insert(session_id.to_string(), (payload, Instant::now() + ttl));
        Ok(())
    }

    async fn take(&self, session_id: &str) -> Result<Option<String>> {
        let taken = self.slots.lock().remove(session_id);
        Ok(taken
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(payload, _)| payload))
    }
}

/// Single-read channel carrying a [`QuickSearch`] into the listings page
#[derive(Clone)]
pub struct HandoffChannel {
    slot: Arc<dyn HandoffSlot>,
    ttl: Duration,
}

impl HandoffChannel {
    pub fn new(slot: Arc<dyn HandoffSlot>, ttl: Duration) -> Self {
        Self { slot, ttl }
    }

    /// Write side, used by the home page quick search
    pub async fn offer(&self, session_id: &str, search: &QuickSearch) -> Result<()> {
        let payload = serde_json::to_string(search).context("Failed to serialize quick search")?;
        self.slot.put(session_id, payload, self.ttl).await?;
        tracing::debug!(session_id, "Quick search handed off");
        Ok(())
    }

    /// Read side. Storage failures and malformed payloads read as "nothing
    /// pending"; the slot is empty afterwards either way.
    pub async fn receive(&self, session_id: &str) -> Option<QuickSearch> {
        let payload = match self.slot.take(session_id).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Failed to read hand-off slot");
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(search) => Some(search),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Discarding malformed hand-off payload");
                None
            }
        }
    }

    /// Fresh criteria for a listings page mount, with any pending quick search applied
    pub async fn initial_criteria(&self, session_id: &str) -> FilterCriteria {
        self.receive(session_id)
            .await
            .map(QuickSearch::into_criteria)
            .unwrap_or_default()
    }
}
