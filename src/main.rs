use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{Me, Update};
use teloxide::update_listeners::webhooks;

mod bot_command;
use bot_command::core::{BocLookup, BocPage, HttpLookup, RateAggregator};
use bot_command::{BotCommand, Command, Intent};

mod conversation;
use conversation::ConversationStore;

mod error;
mod ext;
use ext::MessageExt;

mod health;

mod rate_cache;
use rate_cache::RateCache;

mod settings;
use settings::Settings;

mod telemetry;

async fn serve(addr: SocketAddr, app: axum::Router) {
    if let Err(err) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!("http server stopped: {err}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init();

    let settings = Arc::new(envy::from_env::<Settings>().context("Invalid environment")?);
    settings.log_startup();

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .build()
        .context("Can't build HTTP client")?;
    let aggregator = RateAggregator::new(
        Arc::new(BocPage::new(http_client.clone(), &settings.rate_page_url)),
        Arc::new(BocLookup::new(Arc::new(HttpLookup::new(
            http_client,
            settings.rate_lookup_url.clone(),
        )))),
    );
    let rates = Arc::new(RateCache::new(Arc::new(aggregator)));
    let conversations = Arc::new(ConversationStore::default());
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

    let Some(token) = settings.bot_token() else {
        tracing::warn!("TELEGRAM_TOKEN (or TOKEN) is not set, serving health endpoints only");
        serve(addr, health::router(settings.clone())).await;
        return Ok(());
    };
    let bot = Bot::new(token);

    let handler = Update::filter_message()
        .branch(dptree::entry().filter_command::<BotCommand>().endpoint({
            let rates = rates.clone();
            let conversations = conversations.clone();
            let settings = settings.clone();
            move |bot: Bot, msg: Message, cmd: BotCommand| {
                let rates = rates.clone();
                let conversations = conversations.clone();
                let settings = settings.clone();
                async move {
                    match cmd {
                        BotCommand::Start => bot_command::Start::execute(bot, msg, ()).await,
                        BotCommand::Help => bot_command::Help::execute(bot, msg, ()).await,
                        BotCommand::Rate => {
                            bot_command::Rate::execute(
                                bot,
                                msg,
                                bot_command::rate::Args { rates: &rates },
                            )
                            .await
                        }
                        BotCommand::Convert { amount } => {
                            bot_command::Convert::execute(
                                bot,
                                msg,
                                bot_command::convert::Args {
                                    amount,
                                    conversations: &conversations,
                                },
                            )
                            .await
                        }
                        BotCommand::Cancel => {
                            bot_command::Cancel::execute(
                                bot,
                                msg,
                                bot_command::cancel::Args {
                                    conversations: &conversations,
                                },
                            )
                            .await
                        }
                        BotCommand::DebugEnv => {
                            bot_command::DebugEnv::execute(
                                bot,
                                msg,
                                bot_command::debug_env::Args {
                                    settings: &settings,
                                },
                            )
                            .await
                        }
                    };
                    respond(())
                }
            }
        }))
        .branch(dptree::entry().endpoint({
            let rates = rates.clone();
            let conversations = conversations.clone();
            move |bot: Bot, msg: Message, me: Me| {
                let rates = rates.clone();
                let conversations = conversations.clone();
                async move {
                    let Some(text) = msg.plain_text().map(str::to_owned) else {
                        return respond(());
                    };
                    match bot_command::classify(&text, me.username()) {
                        Intent::Ignore => {}
                        Intent::Quote => {
                            bot_command::Rate::execute(
                                bot,
                                msg,
                                bot_command::rate::Args { rates: &rates },
                            )
                            .await
                        }
                        Intent::BeginConversion(amount) => {
                            bot_command::Convert::execute(
                                bot,
                                msg,
                                bot_command::convert::Args {
                                    amount,
                                    conversations: &conversations,
                                },
                            )
                            .await
                        }
                        Intent::Continuation(text) => {
                            bot_command::Reply::execute(
                                bot,
                                msg,
                                bot_command::reply::Args {
                                    text: &text,
                                    conversations: &conversations,
                                    rates: &rates,
                                },
                            )
                            .await
                        }
                    };
                    respond(())
                }
            }
        }));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .enable_ctrlc_handler()
        .build();

    match settings.webhook_url() {
        Some(webhook_url) => {
            let url = reqwest::Url::parse(&webhook_url).context("Invalid BASE_URL")?;
            let (listener, stop_flag, router) =
                webhooks::axum_to_router(bot, webhooks::Options::new(addr, url))
                    .await
                    .context("Can't register webhook")?;
            tracing::info!(
                base_url = settings.base_url().unwrap_or_default(),
                "webhook registered"
            );
            let app = router.merge(health::router(settings.clone()));
            tokio::spawn(async move {
                if let Err(err) = axum::Server::bind(&addr)
                    .serve(app.into_make_service())
                    .with_graceful_shutdown(stop_flag)
                    .await
                {
                    tracing::error!("http server stopped: {err}");
                }
            });
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => {
            tracing::warn!("BASE_URL is not set, using long polling");
            tokio::spawn(serve(addr, health::router(settings.clone())));
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}
