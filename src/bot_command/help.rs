use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

pub struct Help;

type Args = ();

const CHINESE_ALIASES: &str = "中文命令：/汇率 查询汇率，/换算 <金额> 开始换算（如 /换算 1万2千）。";

/// Command list followed by the Chinese spellings, which the derive can't list.
pub fn help_text() -> String {
    format!(
        "{}\n\n{CHINESE_ALIASES}",
        super::BotCommand::descriptions()
    )
}

#[async_trait]
impl super::Command<Args> for Help {
    async fn execute(bot: Bot, msg: Message, _args: Args) {
        bot.send_message(msg.chat.id, help_text())
            .reply_to_message_id(msg.id)
            .await
            .ok();
    }
}
