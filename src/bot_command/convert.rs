use async_trait::async_trait;
use teloxide::{prelude::*, types::ChatId};

use super::core::parse_amount;
use crate::conversation::ConversationStore;

pub struct Convert;

pub struct Args<'a> {
    pub amount: String,
    pub conversations: &'a ConversationStore,
}

/// Starts a conversion, or explains why the amount was rejected.
/// A rejected amount leaves any earlier pending conversion untouched.
pub async fn begin(conversations: &ConversationStore, chat_id: ChatId, amount: &str) -> String {
    match parse_amount(amount) {
        Ok(amount_usd) => conversations.begin(chat_id, amount_usd).await,
        Err(err) => format!("{err}\n用法：/convert <金额>，例如 /convert 50万"),
    }
}

#[async_trait]
impl<'a> super::Command<Args<'a>> for Convert {
    async fn execute(bot: Bot, msg: Message, args: Args<'a>) {
        let text = begin(args.conversations, msg.chat.id, &args.amount).await;
        bot.send_message(msg.chat.id, text)
            .reply_to_message_id(msg.id)
            .send()
            .await
            .ok();
    }
}
