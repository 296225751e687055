//! Telegram runtime entrypoint.

use crate::bot;
use crate::bot::gateway::TelegramGateway;
use crate::bot::handlers::{extract_media, Command};
use crate::config::BotSettings;
use mediavault_core::classify::ClassificationFlow;
use mediavault_core::dispatch::CallbackDispatcher;
use mediavault_core::gateway::MediaGateway;
use mediavault_core::prompts::PromptTracker;
use mediavault_core::router::DistributionRouter;
use mediavault_core::search::SearchIndex;
use mediavault_core::store::{FileStore, PgFileStore};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{error, info};

/// Run the Telegram transport runtime.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let store = init_store(&settings).await;

    let bot = Bot::new(settings.telegram.telegram_token.clone());
    let gateway: Arc<dyn MediaGateway> = Arc::new(TelegramGateway::new(bot.clone()));
    let flow = Arc::new(ClassificationFlow::new(
        store.clone(),
        gateway,
        Arc::new(PromptTracker::new()),
        DistributionRouter::new(settings.archive.routing_table()),
        settings.archive.storage_channel_id,
    ));
    let dispatcher = Arc::new(CallbackDispatcher::new(
        flow.clone(),
        settings.archive.admin_users(),
    ));
    let search = Arc::new(SearchIndex::new(store));
    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![flow, dispatcher, search])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn init_store(settings: &BotSettings) -> Arc<dyn FileStore> {
    match PgFileStore::connect(&settings.archive.database_url).await {
        Ok(store) => {
            info!("File store initialized.");
            Arc::new(store)
        }
        Err(e) => {
            error!("Failed to initialize file store: {}", e);
            std::process::exit(1);
        }
    }
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(
                    dptree::filter(|msg: Message| extract_media(&msg).is_some())
                        .endpoint(handle_media),
                )
                .branch(
                    dptree::filter(|msg: Message| {
                        msg.reply_to_message().is_some() && msg.text().is_some()
                    })
                    .endpoint(handle_reply),
                )
                .branch(
                    dptree::filter(|msg: Message| {
                        msg.chat.is_private()
                            && msg.text().is_some_and(|t| !t.starts_with('/'))
                    })
                    .endpoint(handle_search),
                ),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dispatcher: Arc<CallbackDispatcher>,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => bot::handlers::start(bot, msg, dispatcher).await,
    };
    if let Err(e) = res {
        error!("Command error: {}", e);
    }
    respond(())
}

async fn handle_media(
    bot: Bot,
    msg: Message,
    flow: Arc<ClassificationFlow>,
    dispatcher: Arc<CallbackDispatcher>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_media(bot, msg, flow, dispatcher).await {
        error!("Media handler error: {}", e);
    }
    respond(())
}

async fn handle_reply(
    bot: Bot,
    msg: Message,
    flow: Arc<ClassificationFlow>,
    dispatcher: Arc<CallbackDispatcher>,
    search: Arc<SearchIndex>,
) -> Result<(), teloxide::RequestError> {
    match bot::handlers::handle_reply(bot.clone(), msg.clone(), flow, dispatcher.clone()).await {
        Ok(true) => {}
        // a reply to an unrelated message is still a search in private chats
        Ok(false) => {
            if msg.chat.is_private() && msg.text().is_some_and(|t| !t.starts_with('/')) {
                if let Err(e) = bot::handlers::handle_search(bot, msg, search, dispatcher).await {
                    error!("Search handler error: {}", e);
                }
            }
        }
        Err(e) => error!("Reply handler error: {}", e),
    }
    respond(())
}

async fn handle_search(
    bot: Bot,
    msg: Message,
    search: Arc<SearchIndex>,
    dispatcher: Arc<CallbackDispatcher>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::handlers::handle_search(bot, msg, search, dispatcher).await {
        error!("Search handler error: {}", e);
    }
    respond(())
}

async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    dispatcher: Arc<CallbackDispatcher>,
) -> Result<(), teloxide::RequestError> {
    if let Err(e) = bot::callbacks::handle_callback(bot, q, dispatcher).await {
        error!("Callback handler error: {}", e);
    }
    respond(())
}
