use async_trait::async_trait;
use teloxide::prelude::*;

use crate::conversation::ConversationStore;

pub struct Cancel;

pub struct Args<'a> {
    pub conversations: &'a ConversationStore,
}

#[async_trait]
impl<'a> super::Command<Args<'a>> for Cancel {
    async fn execute(bot: Bot, msg: Message, args: Args<'a>) {
        let text = args
            .conversations
            .supply(msg.chat.id, "cancel")
            .await
            .notice()
            .unwrap_or_else(|| "当前没有进行中的换算。".to_owned());
        bot.send_message(msg.chat.id, text)
            .reply_to_message_id(msg.id)
            .send()
            .await
            .ok();
    }
}
