use anyhow::{bail, Context};
use async_trait::async_trait;
use futures::FutureExt;
use rust_decimal::Decimal;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;

use super::{RateQuote, RateSource};
use crate::error::SourceUnavailable;

/// Argument shapes tried in order; the upstream has accepted each of these at some point.
const ATTEMPTS: &[(&str, &str)] = &[("USD", "SE_ASK"), ("USD", "SE,ASK"), ("USD", "")];

/// Shapes the lookup is known to answer with.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupValue {
    Empty,
    Scalar(String),
    Sequence(Vec<LookupValue>),
    Mapping(Vec<(String, LookupValue)>),
}

impl From<serde_json::Value> for LookupValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null | Value::Bool(_) => Self::Empty,
            Value::Number(n) => Self::Scalar(n.to_string()),
            Value::String(s) => Self::Scalar(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl LookupValue {
    /// First strictly positive number found, searching depth-first in order.
    pub fn first_number(&self) -> Option<Decimal> {
        match self {
            Self::Empty => None,
            Self::Scalar(text) => {
                let text = text.trim().replace(',', "");
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .ok()
                    .filter(|n| *n > Decimal::ZERO)
            }
            Self::Sequence(items) => items.iter().find_map(Self::first_number),
            Self::Mapping(entries) => entries.iter().find_map(|(_, v)| v.first_number()),
        }
    }
}

/// Third-party numeric lookup taking a currency code and a sort-order argument.
#[async_trait]
pub trait RateLookup: Send + Sync {
    async fn lookup(&self, currency: &str, sort: &str) -> anyhow::Result<LookupValue>;
}

/// JSON lookup endpoint answering `GET {url}?currency=..&sort=..`.
pub struct HttpLookup {
    http_client: reqwest::Client,
    url: Option<String>,
}

impl HttpLookup {
    pub fn new(http_client: reqwest::Client, url: Option<String>) -> Self {
        Self { http_client, url }
    }
}

#[async_trait]
impl RateLookup for HttpLookup {
    async fn lookup(&self, currency: &str, sort: &str) -> anyhow::Result<LookupValue> {
        let Some(url) = &self.url else {
            bail!("lookup endpoint is not configured");
        };
        let url = reqwest::Url::parse_with_params(url, &[("currency", currency), ("sort", sort)])
            .context("Invalid lookup URL")?;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .context("Request failed")?
            .error_for_status()
            .context("Bad status")?;
        let value = response
            .json::<serde_json::Value>()
            .await
            .context("Can't parse response")?;
        Ok(value.into())
    }
}

/// Structured fallback source built on a [`RateLookup`].
pub struct BocLookup {
    lookup: Arc<dyn RateLookup>,
}

impl BocLookup {
    pub fn new(lookup: Arc<dyn RateLookup>) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl RateSource for BocLookup {
    fn name(&self) -> &'static str {
        "boc_lookup"
    }

    async fn fetch(&self) -> Result<RateQuote, SourceUnavailable> {
        for (currency, sort) in ATTEMPTS {
            let attempt = AssertUnwindSafe(self.lookup.lookup(currency, sort))
                .catch_unwind()
                .await;
            match attempt {
                Ok(Ok(value)) => {
                    let quote = value
                        .first_number()
                        .and_then(|n| RateQuote::from_raw_100(n, None));
                    match quote {
                        Some(quote) => return Ok(quote),
                        None => tracing::debug!(sort, "lookup returned no usable number"),
                    }
                }
                Ok(Err(err)) => tracing::debug!(sort, "lookup attempt failed: {err:#}"),
                Err(_) => tracing::warn!(sort, "lookup attempt panicked"),
            }
        }
        Err(SourceUnavailable::new(self.name(), "all lookup attempts failed"))
    }
}
