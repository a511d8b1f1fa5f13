use async_trait::async_trait;
use chrono::{DateTime, Local};
use rust_decimal::Decimal;

use crate::error::SourceUnavailable;

pub mod amount;
pub use amount::{parse_amount, parse_fee_percent};

pub mod boc_page;
pub use boc_page::BocPage;

pub mod boc_lookup;
pub use boc_lookup::{BocLookup, HttpLookup, LookupValue, RateLookup};

pub mod rate_aggregator;
pub use rate_aggregator::RateAggregator;

pub mod calculator;
pub use calculator::ConversionResult;

/// Ceiling for a plausible "CNY per 100 USD" figure.
const MAX_RAW_100_RATE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// USD cash-sell quote in CNY. `per_unit_rate` is always `raw_100_rate / 100`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateQuote {
    per_unit_rate: Decimal,
    raw_100_rate: Decimal,
    published_at: Option<String>,
    fetched_at: DateTime<Local>,
}

impl RateQuote {
    /// Builds a quote from the publisher's "CNY per 100 USD" figure.
    /// Returns `None` unless the figure is strictly positive and below
    /// `MAX_RAW_100_RATE`.
    pub fn from_raw_100(raw_100_rate: Decimal, published_at: Option<String>) -> Option<Self> {
        if raw_100_rate <= Decimal::ZERO || raw_100_rate > MAX_RAW_100_RATE {
            return None;
        }
        Some(Self {
            per_unit_rate: raw_100_rate / Decimal::ONE_HUNDRED,
            raw_100_rate,
            published_at: published_at.filter(|p| !p.trim().is_empty()),
            fetched_at: Local::now(),
        })
    }

    pub fn per_unit_rate(&self) -> Decimal {
        self.per_unit_rate
    }

    pub fn raw_100_rate(&self) -> Decimal {
        self.raw_100_rate
    }

    pub fn published_at(&self) -> Option<&str> {
        self.published_at.as_deref()
    }

    pub fn fetched_at(&self) -> DateTime<Local> {
        self.fetched_at
    }

    /// Reply text for a plain quote request.
    pub fn describe(&self) -> String {
        format!(
            "人民币对美元现汇卖出价：{} CNY per USD（100 USD = {} CNY，发布时间 {}）",
            self.per_unit_rate.normalize(),
            self.raw_100_rate.normalize(),
            self.published_at().unwrap_or("未知"),
        )
    }
}

/// One strategy for obtaining a quote.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn fetch(&self) -> Result<RateQuote, SourceUnavailable>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn per_unit_rate_is_hundredth_of_raw() {
        let quote = RateQuote::from_raw_100(dec!(712.34), Some("10:30:00".to_owned())).unwrap();
        assert_eq!(quote.per_unit_rate(), dec!(7.1234));
        assert_eq!(quote.raw_100_rate(), dec!(712.34));
        assert_eq!(quote.published_at(), Some("10:30:00"));
    }

    #[test]
    fn rejects_non_positive_rates() {
        assert!(RateQuote::from_raw_100(Decimal::ZERO, None).is_none());
        assert!(RateQuote::from_raw_100(dec!(-1), None).is_none());
    }

    #[test]
    fn rejects_implausibly_large_rates() {
        assert!(RateQuote::from_raw_100(dec!(100000), None).is_some());
        assert!(RateQuote::from_raw_100(dec!(100000.01), None).is_none());
        let huge = Decimal::from_scientific("1e25").unwrap();
        assert!(RateQuote::from_raw_100(huge, None).is_none());
    }

    #[test]
    fn describe_mentions_both_rates() {
        let quote = RateQuote::from_raw_100(dec!(712.34), None).unwrap();
        let text = quote.describe();
        assert!(text.contains("7.1234 CNY per USD"));
        assert!(text.contains("100 USD = 712.34 CNY"));
        assert!(text.contains("未知"));
    }
}
