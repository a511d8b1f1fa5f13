use async_trait::async_trait;
use teloxide::{prelude::*, types::ChatId};

use super::core::ConversionResult;
use crate::conversation::{ConversationStore, Supply};
use crate::rate_cache::RateCache;

/// A plain text message that may continue a pending conversion.
pub struct Reply;

pub struct Args<'a> {
    pub text: &'a str,
    pub conversations: &'a ConversationStore,
    pub rates: &'a RateCache,
}

const NO_RESULT: &str = "未获取到汇率数据，无法完成换算，请稍后重新发送 /convert <金额>。";

/// Outbound messages for a follow-up, in delivery order. Empty when the
/// chat has no conversion in progress.
pub async fn replies(
    conversations: &ConversationStore,
    rates: &RateCache,
    chat_id: ChatId,
    text: &str,
) -> Vec<String> {
    match conversations.supply(chat_id, text).await {
        Supply::Ready {
            amount_usd,
            fee_percent,
        } => match rates.get().await {
            Some(quote) => match ConversionResult::compute(amount_usd, &quote, fee_percent) {
                Some(result) => vec![result.terse(), result.detailed()],
                None => {
                    tracing::warn!(rate = %quote.per_unit_rate(), %amount_usd, "conversion overflowed");
                    vec![NO_RESULT.to_owned()]
                }
            },
            None => vec![NO_RESULT.to_owned()],
        },
        outcome => outcome.notice().into_iter().collect(),
    }
}

#[async_trait]
impl<'a> super::Command<Args<'a>> for Reply {
    async fn execute(bot: Bot, msg: Message, args: Args<'a>) {
        let texts = replies(args.conversations, args.rates, msg.chat.id, args.text).await;
        super::reply_all(&bot, &msg, texts).await;
    }
}
