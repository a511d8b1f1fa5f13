use async_trait::async_trait;
use teloxide::{prelude::*, utils::command::BotCommands};

pub mod core;

pub mod start;
pub use start::Start;

pub mod help;
pub use help::Help;

pub mod rate;
pub use rate::Rate;

pub mod convert;
pub use convert::Convert;

pub mod cancel;
pub use cancel::Cancel;

pub mod reply;
pub use reply::Reply;

pub mod debug_env;
pub use debug_env::DebugEnv;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum BotCommand {
    #[command(description = "Welcome message")]
    Start,
    #[command(description = "Display this text")]
    Help,
    #[command(description = "USD cash-sell rate in CNY (also /汇率)")]
    Rate,
    #[command(description = "Convert a USD amount with a fee, e.g. /convert 50万 (also /换算)")]
    Convert { amount: String },
    #[command(description = "Cancel the conversion in progress")]
    Cancel,
    #[command(rename = "debug_env", description = "Show which settings the bot found")]
    DebugEnv,
}

/// How a plain text message is routed.
#[derive(Debug, PartialEq)]
pub enum Intent {
    Quote,
    BeginConversion(String),
    Continuation(String),
    /// A command addressed to some other bot in the same group.
    Ignore,
}

/// Recognizes the Chinese command spellings, which `BotCommands` can't alias.
/// Everything else continues a conversation.
pub fn classify(text: &str, bot_username: &str) -> Intent {
    let trimmed = text.trim();
    let (head, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    let (name, addressee) = match head.split_once('@') {
        Some((name, addressee)) => (name, Some(addressee)),
        None => (head, None),
    };
    if name.starts_with('/') && addressee.is_some_and(|a| !a.eq_ignore_ascii_case(bot_username)) {
        return Intent::Ignore;
    }
    match name {
        "/汇率" | "/rate" => Intent::Quote,
        "/换算" | "/convert" => Intent::BeginConversion(rest.trim().to_owned()),
        _ => Intent::Continuation(text.to_owned()),
    }
}

#[async_trait]
pub trait Command<Args> {
    async fn execute(bot: Bot, msg: Message, args: Args)
    where
        Args: 'async_trait;
}

/// Sends each text as its own reply, in order.
pub async fn reply_all(bot: &Bot, msg: &Message, texts: Vec<String>) {
    for text in texts {
        bot.send_message(msg.chat.id, text)
            .reply_to_message_id(msg.id)
            .send()
            .await
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: &str = "boc_rate_bot";

    #[test]
    fn chinese_commands() {
        assert_eq!(classify("/汇率", ME), Intent::Quote);
        assert_eq!(classify("/汇率@boc_rate_bot", ME), Intent::Quote);
        assert_eq!(
            classify("/换算 50万", ME),
            Intent::BeginConversion("50万".to_owned())
        );
        assert_eq!(
            classify("/换算@boc_rate_bot  1万2千 ", ME),
            Intent::BeginConversion("1万2千".to_owned())
        );
        assert_eq!(classify("/换算", ME), Intent::BeginConversion(String::new()));
    }

    #[test]
    fn anything_else_continues_the_conversation() {
        assert_eq!(classify("2.3", ME), Intent::Continuation("2.3".to_owned()));
        assert_eq!(classify("是", ME), Intent::Continuation("是".to_owned()));
        assert_eq!(classify("汇率", ME), Intent::Continuation("汇率".to_owned()));
    }

    #[test]
    fn commands_for_other_bots_are_ignored() {
        assert_eq!(classify("/rate@other_bot", ME), Intent::Ignore);
        assert_eq!(classify("/换算@other_bot 50万", ME), Intent::Ignore);
        assert_eq!(classify("/汇率@BOC_RATE_BOT", ME), Intent::Quote);
        assert_eq!(
            classify("mail me@example.com", ME),
            Intent::Continuation("mail me@example.com".to_owned())
        );
    }

    #[test]
    fn english_commands_parse() {
        assert!(matches!(
            BotCommand::parse("/convert 50万", "boc_rate_bot"),
            Ok(BotCommand::Convert { amount }) if amount == "50万"
        ));
        assert!(matches!(
            BotCommand::parse("/debug_env", "boc_rate_bot"),
            Ok(BotCommand::DebugEnv)
        ));
    }
}
