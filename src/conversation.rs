use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use teloxide::types::ChatId;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::bot_command::core::parse_fee_percent;
use crate::error::ParseError;

pub const PENDING_TTL: Duration = Duration::from_secs(120);

const CANCEL_TOKENS: &[&str] = &["取消", "cancel", "/cancel", "算了", "退出"];
const AFFIRMATIVE_TOKENS: &[&str] = &["是", "yes", "y", "好", "沿用", "ok"];

fn is_token(text: &str, tokens: &[&str]) -> bool {
    let text = text.trim().to_lowercase();
    tokens.iter().any(|t| *t == text)
}

#[derive(Debug, Clone)]
struct PendingConversion {
    amount_usd: Decimal,
    created_at: Instant,
    remembered_fee_percent: Option<Decimal>,
}

#[derive(Default)]
struct Conversations {
    pending: HashMap<ChatId, PendingConversion>,
    fees: HashMap<ChatId, Decimal>,
}

/// What a follow-up message did to the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Supply {
    /// No conversion in progress; the text is not ours.
    Ignored,
    Expired,
    Cancelled,
    /// Bad fee text; the conversion stays pending.
    Reprompt(ParseError),
    /// Fee accepted and remembered; the pending entry is gone.
    Ready {
        amount_usd: Decimal,
        fee_percent: Decimal,
    },
}

impl Supply {
    /// Notice for every outcome except `Ignored` and `Ready`.
    pub fn notice(&self) -> Option<String> {
        match self {
            Self::Ignored | Self::Ready { .. } => None,
            Self::Expired => Some("换算已超时，请重新发送 /convert <金额>。".to_owned()),
            Self::Cancelled => Some("已取消换算。".to_owned()),
            Self::Reprompt(err) => Some(format!("{err}\n回复「取消」放弃本次换算。")),
        }
    }
}

/// Per-chat "awaiting fee" state plus the last fee each chat used.
pub struct ConversationStore {
    inner: Mutex<Conversations>,
    pending_ttl: Duration,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self {
            inner: Mutex::default(),
            pending_ttl: PENDING_TTL,
        }
    }
}

impl ConversationStore {
    /// Starts (or restarts) a conversion and returns the fee prompt.
    pub async fn begin(&self, chat_id: ChatId, amount_usd: Decimal) -> String {
        let mut inner = self.inner.lock().await;
        let remembered_fee_percent = inner.fees.get(&chat_id).copied();
        let replaced = inner
            .pending
            .insert(
                chat_id,
                PendingConversion {
                    amount_usd,
                    created_at: Instant::now(),
                    remembered_fee_percent,
                },
            )
            .is_some();
        tracing::debug!(chat_id = chat_id.0, %amount_usd, replaced, "conversion started");

        let mut prompt = format!(
            "换算 {} USD。请输入手续费百分比（例如 2.3），回复「取消」放弃。",
            amount_usd.normalize()
        );
        if let Some(fee) = remembered_fee_percent {
            prompt.push_str(&format!("\n回复「是」沿用上次的 {}%。", fee.normalize()));
        }
        prompt
    }

    /// Feeds a follow-up message into the chat's pending conversion.
    pub async fn supply(&self, chat_id: ChatId, text: &str) -> Supply {
        let mut inner = self.inner.lock().await;
        let Some(pending) = inner.pending.get(&chat_id).cloned() else {
            return Supply::Ignored;
        };

        if pending.created_at.elapsed() > self.pending_ttl {
            inner.pending.remove(&chat_id);
            tracing::debug!(chat_id = chat_id.0, "conversion expired");
            return Supply::Expired;
        }

        if is_token(text, CANCEL_TOKENS) {
            inner.pending.remove(&chat_id);
            tracing::debug!(chat_id = chat_id.0, "conversion cancelled");
            return Supply::Cancelled;
        }

        let fee_percent = match pending.remembered_fee_percent {
            Some(fee) if is_token(text, AFFIRMATIVE_TOKENS) => fee,
            _ => match parse_fee_percent(text) {
                Ok(fee) => fee,
                Err(err) => return Supply::Reprompt(err),
            },
        };

        inner.pending.remove(&chat_id);
        inner.fees.insert(chat_id, fee_percent);
        tracing::debug!(chat_id = chat_id.0, %fee_percent, "fee supplied");
        Supply::Ready {
            amount_usd: pending.amount_usd,
            fee_percent,
        }
    }

    #[cfg(test)]
    pub async fn is_pending(&self, chat_id: ChatId) -> bool {
        self.inner.lock().await.pending.contains_key(&chat_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CHAT: ChatId = ChatId(42);

    #[tokio::test]
    async fn fee_completes_conversion() {
        let store = ConversationStore::default();
        let prompt = store.begin(CHAT, dec!(1000)).await;
        assert!(prompt.contains("1000 USD"));
        assert!(!prompt.contains("沿用"));

        assert_eq!(
            store.supply(CHAT, "2.5%").await,
            Supply::Ready {
                amount_usd: dec!(1000),
                fee_percent: dec!(2.5)
            }
        );
        assert!(!store.is_pending(CHAT).await);
        assert_eq!(store.supply(CHAT, "2.5").await, Supply::Ignored);
    }

    #[tokio::test]
    async fn text_without_pending_conversion_is_ignored() {
        let store = ConversationStore::default();
        assert_eq!(store.supply(CHAT, "hello").await, Supply::Ignored);
        assert_eq!(Supply::Ignored.notice(), None);
    }

    #[tokio::test]
    async fn cancel_drops_pending_conversion() {
        let store = ConversationStore::default();
        for token in ["取消", "Cancel", " CANCEL ", "/cancel", "算了"] {
            store.begin(CHAT, dec!(1000)).await;
            assert_eq!(store.supply(CHAT, token).await, Supply::Cancelled);
            assert!(!store.is_pending(CHAT).await);
        }
        assert_eq!(store.supply(CHAT, "2").await, Supply::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_conversion_times_out() {
        let store = ConversationStore::default();
        store.begin(CHAT, dec!(1000)).await;
        tokio::time::advance(PENDING_TTL + Duration::from_secs(1)).await;

        let outcome = store.supply(CHAT, "2.5").await;
        assert_eq!(outcome, Supply::Expired);
        assert!(outcome.notice().unwrap().contains("超时"));
        assert!(!store.is_pending(CHAT).await);
    }

    #[tokio::test(start_paused = true)]
    async fn conversion_within_ttl_is_accepted() {
        let store = ConversationStore::default();
        store.begin(CHAT, dec!(1000)).await;
        tokio::time::advance(PENDING_TTL).await;
        assert!(matches!(store.supply(CHAT, "1").await, Supply::Ready { .. }));
    }

    #[tokio::test]
    async fn invalid_fee_reprompts_and_keeps_pending() {
        let store = ConversationStore::default();
        store.begin(CHAT, dec!(1000)).await;

        let outcome = store.supply(CHAT, "abc").await;
        assert_eq!(
            outcome,
            Supply::Reprompt(ParseError::InvalidFee("abc".to_owned()))
        );
        assert!(outcome.notice().unwrap().contains("取消"));
        assert_eq!(
            store.supply(CHAT, "150").await,
            Supply::Reprompt(ParseError::FeeOutOfRange)
        );
        assert!(store.is_pending(CHAT).await);
        assert!(matches!(store.supply(CHAT, "3").await, Supply::Ready { .. }));
    }

    #[tokio::test]
    async fn affirmative_reuses_previous_fee() {
        let store = ConversationStore::default();
        store.begin(CHAT, dec!(1000)).await;
        store.supply(CHAT, "2.3").await;

        let prompt = store.begin(CHAT, dec!(500000)).await;
        assert!(prompt.contains("沿用上次的 2.3%"));
        assert_eq!(
            store.supply(CHAT, "是").await,
            Supply::Ready {
                amount_usd: dec!(500000),
                fee_percent: dec!(2.3)
            }
        );
    }

    #[tokio::test]
    async fn affirmative_without_memory_is_parsed_as_fee() {
        let store = ConversationStore::default();
        store.begin(CHAT, dec!(1000)).await;
        assert_eq!(
            store.supply(CHAT, "yes").await,
            Supply::Reprompt(ParseError::InvalidFee("yes".to_owned()))
        );
        assert!(store.is_pending(CHAT).await);
    }

    #[tokio::test]
    async fn new_conversion_replaces_pending_one() {
        let store = ConversationStore::default();
        store.begin(CHAT, dec!(1000)).await;
        store.begin(CHAT, dec!(2000)).await;
        assert_eq!(
            store.supply(CHAT, "1").await,
            Supply::Ready {
                amount_usd: dec!(2000),
                fee_percent: dec!(1)
            }
        );
        assert_eq!(store.supply(CHAT, "1").await, Supply::Ignored);
    }

    #[tokio::test]
    async fn chats_do_not_see_each_other() {
        let store = ConversationStore::default();
        let other = ChatId(7);
        store.begin(CHAT, dec!(1000)).await;
        store.supply(CHAT, "4").await;
        store.begin(CHAT, dec!(1000)).await;

        assert_eq!(store.supply(other, "1").await, Supply::Ignored);
        let prompt = store.begin(other, dec!(10)).await;
        assert!(!prompt.contains("沿用"));
        assert_eq!(
            store.supply(other, "是").await,
            Supply::Reprompt(ParseError::InvalidFee("是".to_owned()))
        );
        assert!(store.is_pending(CHAT).await);
    }
}
