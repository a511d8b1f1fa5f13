use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::{RateQuote, RateSource};
use crate::error::SourceUnavailable;

pub const DEFAULT_URL: &str = "https://www.boc.cn/sourcedb/whpj/";

const SELL_COLUMN: &str = "现汇卖出价";
const CURRENCY_ROW: &str = "美元";
const DATE_COLUMN: &str = "发布日期";
const TIME_COLUMN: &str = "发布时间";

static ROW: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<tr(?:\s[^>]*)?>(.*?)</tr>").unwrap());
static CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<t[hd](?:\s[^>]*)?>(.*?)</t[hd]>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Scrapes the publisher's own rate table.
pub struct BocPage {
    http_client: reqwest::Client,
    url: String,
}

/// Values read from the rate table, before validation.
#[derive(Debug, PartialEq)]
pub struct ScrapedRate {
    pub raw_100_rate: Decimal,
    pub published_at: Option<String>,
}

impl BocPage {
    pub fn new(http_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }

    async fn download(&self) -> anyhow::Result<String> {
        self.http_client
            .get(&self.url)
            .send()
            .await
            .context("Request failed")?
            .error_for_status()
            .context("Bad status")?
            .text()
            .await
            .context("Can't read body")
    }
}

#[async_trait]
impl RateSource for BocPage {
    fn name(&self) -> &'static str {
        "boc_page"
    }

    async fn fetch(&self) -> Result<RateQuote, SourceUnavailable> {
        let html = self
            .download()
            .await
            .map_err(|err| SourceUnavailable::new(self.name(), err))?;
        let scraped = parse_rate_table(&html)
            .ok_or_else(|| SourceUnavailable::new(self.name(), "USD sell rate not found in table"))?;
        RateQuote::from_raw_100(scraped.raw_100_rate, scraped.published_at)
            .ok_or_else(|| SourceUnavailable::new(self.name(), "implausible rate in table"))
    }
}

fn cell_text(raw: &str) -> String {
    TAG.replace_all(raw, "")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_owned()
}

fn rows(html: &str) -> impl Iterator<Item = Vec<String>> + '_ {
    ROW.captures_iter(html).map(|row| {
        CELL.captures_iter(&row[1])
            .map(|cell| cell_text(&cell[1]))
            .collect()
    })
}

/// Finds the USD row's sell column in the rate table.
/// Any missing header, row or column, or a non-numeric cell, yields `None`.
pub fn parse_rate_table(html: &str) -> Option<ScrapedRate> {
    let mut header: Option<Vec<String>> = None;
    for cells in rows(html) {
        if header.is_none() {
            if cells.iter().any(|c| c.contains(SELL_COLUMN)) {
                header = Some(cells);
            }
            continue;
        }
        let columns = header.as_ref()?;
        if !cells.first().is_some_and(|c| c.contains(CURRENCY_ROW)) {
            continue;
        }

        let column = |label: &str| {
            columns
                .iter()
                .position(|c| c.contains(label))
                .and_then(|i| cells.get(i))
                .filter(|v| !v.is_empty())
        };

        let raw = column(SELL_COLUMN)?.replace(',', "");
        let raw_100_rate = Decimal::from_str(&raw).ok()?;
        let published_at = match (column(DATE_COLUMN), column(TIME_COLUMN)) {
            (Some(date), Some(time)) if !time.contains(date.as_str()) => {
                Some(format!("{date} {time}"))
            }
            (_, Some(time)) => Some(time.clone()),
            (Some(date), None) => Some(date.clone()),
            (None, None) => None,
        };
        return Some(ScrapedRate {
            raw_100_rate,
            published_at,
        });
    }
    None
}
