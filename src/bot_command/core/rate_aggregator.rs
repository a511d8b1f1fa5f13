use async_trait::async_trait;
use std::sync::Arc;

use super::{RateQuote, RateSource};
use crate::error::SourceUnavailable;

/// Ordered fallback chain: the scraped page first, the structured lookup second.
/// Each source is asked once per call.
pub struct RateAggregator {
    sources: Vec<Arc<dyn RateSource>>,
}

impl RateAggregator {
    pub fn new(primary: Arc<dyn RateSource>, fallback: Arc<dyn RateSource>) -> Self {
        Self {
            sources: vec![primary, fallback],
        }
    }

    pub async fn quote(&self) -> Option<RateQuote> {
        for source in &self.sources {
            match source.fetch().await {
                Ok(quote) => {
                    tracing::info!(
                        source = source.name(),
                        rate = %quote.per_unit_rate(),
                        fetched_at = %quote.fetched_at(),
                        "rate fetched"
                    );
                    return Some(quote);
                }
                Err(err) => tracing::warn!("{err}"),
            }
        }
        None
    }
}

#[async_trait]
impl RateSource for RateAggregator {
    fn name(&self) -> &'static str {
        "aggregator"
    }

    async fn fetch(&self) -> Result<RateQuote, SourceUnavailable> {
        self.quote()
            .await
            .ok_or_else(|| SourceUnavailable::new(self.name(), "no source produced a quote"))
    }
}
