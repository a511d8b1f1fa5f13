use async_trait::async_trait;
use teloxide::prelude::*;

use crate::rate_cache::RateCache;

pub struct Rate;

pub struct Args<'a> {
    pub rates: &'a RateCache,
}

pub const NO_QUOTE: &str = "未获取到汇率数据。";

pub async fn quote_text(rates: &RateCache) -> String {
    match rates.get().await {
        Some(quote) => quote.describe(),
        None => NO_QUOTE.to_owned(),
    }
}

#[async_trait]
impl<'a> super::Command<Args<'a>> for Rate {
    async fn execute(bot: Bot, msg: Message, args: Args<'a>) {
        bot.send_message(msg.chat.id, quote_text(args.rates).await)
            .reply_to_message_id(msg.id)
            .send()
            .await
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot_command::core::rate_aggregator::tests::FixedSource;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn quote_or_apology() {
        let rates = RateCache::new(FixedSource::new(Some(dec!(712.34))));
        assert!(quote_text(&rates).await.contains("7.1234 CNY per USD"));

        let rates = RateCache::new(FixedSource::new(None));
        assert_eq!(quote_text(&rates).await, NO_QUOTE);
    }
}
