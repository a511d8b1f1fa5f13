use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::bot_command::core::{RateQuote, RateSource};

pub const RATE_TTL: Duration = Duration::from_secs(120);

struct CacheSlot {
    quote: RateQuote,
    fetched_at: Instant,
}

/// Single-slot cache in front of the rate sources.
///
/// Readers holding a fresh slot never touch the upstream. Refreshes are
/// serialized by `refresh`, so concurrent callers that find the slot stale
/// wait for the one in-flight fetch instead of starting their own. A failed
/// refresh keeps the previous quote without extending its freshness.
pub struct RateCache {
    upstream: Arc<dyn RateSource>,
    slot: RwLock<Option<CacheSlot>>,
    refresh: Mutex<()>,
    ttl: Duration,
}

impl RateCache {
    pub fn new(upstream: Arc<dyn RateSource>) -> Self {
        Self {
            upstream,
            slot: RwLock::new(None),
            refresh: Mutex::new(()),
            ttl: RATE_TTL,
        }
    }

    async fn fresh(&self) -> Option<RateQuote> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|slot| slot.fetched_at.elapsed() < self.ttl)
            .map(|slot| slot.quote.clone())
    }

    pub async fn get(&self) -> Option<RateQuote> {
        if let Some(quote) = self.fresh().await {
            tracing::debug!("rate cache hit");
            return Some(quote);
        }

        let _refresh = self.refresh.lock().await;
        if let Some(quote) = self.fresh().await {
            tracing::debug!("rate refreshed while waiting");
            return Some(quote);
        }

        tracing::info!("refreshing rate");
        match self.upstream.fetch().await {
            Ok(quote) => {
                *self.slot.write().await = Some(CacheSlot {
                    quote: quote.clone(),
                    fetched_at: Instant::now(),
                });
                Some(quote)
            }
            Err(err) => {
                tracing::warn!("rate refresh failed, serving previous quote: {err}");
                self.slot.read().await.as_ref().map(|slot| slot.quote.clone())
            }
        }
    }
}
