use async_trait::async_trait;
use teloxide::prelude::*;

pub struct DebugEnv;

pub struct Args<'a> {
    pub settings: &'a crate::Settings,
}

#[async_trait]
impl<'a> super::Command<Args<'a>> for DebugEnv {
    async fn execute(bot: Bot, msg: Message, args: Args<'a>) {
        bot.send_message(msg.chat.id, args.settings.describe())
            .reply_to_message_id(msg.id)
            .send()
            .await
            .ok();
    }
}
