use async_trait::async_trait;
use teloxide::prelude::*;

pub struct Start;

type Args = ();

const WELCOME: &str = "欢迎！发送 /rate 或 /汇率 获取人民币对美元现汇卖出价。\n\
                       发送 /convert <金额> 或 /换算 <金额>（例如 /换算 50万）计算含手续费的换算结果。\n\
                       调试：/debug_env";

#[async_trait]
impl super::Command<Args> for Start {
    async fn execute(bot: Bot, msg: Message, _args: Args) {
        bot.send_message(msg.chat.id, WELCOME)
            .reply_to_message_id(msg.id)
            .await
            .ok();
    }
}
