use thiserror::Error;

/// User-correctable input problems. Always answered with a re-prompt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("请输入金额，例如 500000 或 50万")]
    Empty,
    #[error("无法识别金额「{0}」，例如 500000、3.5万、1万2千3百50")]
    NoAmount(String),
    #[error("金额必须大于 0")]
    NonPositive,
    #[error("金额不能超过 1,000,000,000")]
    TooLarge,
    #[error("无法识别手续费「{0}」，请输入 0 到 100 之间的百分比，例如 2.3")]
    InvalidFee(String),
    #[error("手续费必须在 0% 到 100% 之间")]
    FeeOutOfRange,
}

/// A rate source failed to produce a quote. Never leaves the rate aggregator.
#[derive(Debug, Error)]
#[error("rate source `{origin}` unavailable: {reason}")]
pub struct SourceUnavailable {
    pub origin: &'static str,
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(origin: &'static str, reason: impl std::fmt::Display) -> Self {
        Self {
            origin,
            reason: format!("{reason:#}"),
        }
    }
}
