//! DeskGenie Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use teloxide::utils::command::BotCommands as TeloxideBotCommands;
use tracing::{error, info, warn};

use DeskGenie::{
    config::Settings,
    utils::logging,
    database::{DatabaseService, connection::{create_pool, run_migrations}},
    services::ServiceFactory,
    handlers::{
        commands::{admin, start},
        callbacks::handle_callback,
        messages::{handle_bot_added, handle_message},
        reply_user_errors,
    },
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on shutdown
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting DeskGenie Telegram Bot...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = DeskGenie::database::connection::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        acquire_timeout: std::time::Duration::from_secs(30),
        idle_timeout: Some(std::time::Duration::from_secs(600)),
        max_lifetime: Some(std::time::Duration::from_secs(1800)),
    };
    let db_pool = create_pool(&db_config).await?;

    // Run database migrations
    run_migrations(&db_pool).await?;

    // Initialize database service
    let database_service = DatabaseService::new(db_pool);

    // Initialize bot
    let bot = Bot::new(&settings.bot.token);

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(bot.clone(), settings.clone(), database_service);
    let services_arc = Arc::new(services);

    info!("Setting up bot handlers...");
    let handler = create_handler();

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![services_arc])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("DeskGenie bot is ready!");
    dispatcher.dispatch().await;

    info!("DeskGenie bot has been shut down.");
    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    // Handle commands
                    dptree::entry()
                        .filter_command::<BotCommands>()
                        .endpoint(handle_commands),
                )
                .branch(
                    // Everything else is ticket intake
                    dptree::endpoint(handle_messages),
                ),
        )
        .branch(
            // Handle callback queries (claim/resolve/chat buttons)
            Update::filter_callback_query().endpoint(handle_callbacks),
        )
        .branch(
            // Handle my chat member updates (bot added to chats)
            Update::filter_my_chat_member().endpoint(handle_chat_member_updates),
        )
}

#[derive(TeloxideBotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "DeskGenie Bot Commands")]
enum BotCommands {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Show your id and role")]
    Whoami,
    #[command(description = "Show your submitted tickets")]
    Myhistory,
    #[command(description = "Manage support chats (admin only)")]
    Chats,
    #[command(description = "List all tickets (admin only)")]
    Tickets,
    #[command(description = "Change a user's role (admin only)")]
    Setrole(String),
    #[command(description = "Rebroadcast unclaimed tickets (admin only)")]
    Republish,
    #[command(description = "Rebroadcast one ticket (admin only)")]
    Republishticket(String),
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: BotCommands,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let services = (*services).clone();
    let chat_id = msg.chat.id;

    let result = match cmd {
        BotCommands::Start => start::handle_start(bot.clone(), msg, services).await,
        BotCommands::Help => start::handle_help(bot.clone(), msg).await,
        BotCommands::Whoami => start::handle_who_am_i(bot.clone(), msg, services).await,
        BotCommands::Myhistory => start::handle_my_history(bot.clone(), msg, services).await,
        BotCommands::Chats => admin::handle_chats(bot.clone(), msg, services).await,
        BotCommands::Tickets => admin::handle_tickets(bot.clone(), msg, services).await,
        BotCommands::Setrole(args) => {
            admin::handle_set_role(bot.clone(), msg, args, services).await
        }
        BotCommands::Republish => admin::handle_republish(bot.clone(), msg, services).await,
        BotCommands::Republishticket(args) => {
            admin::handle_republish_ticket(bot.clone(), msg, args, services).await
        }
    };

    if let Err(e) = reply_user_errors(&bot, chat_id, result).await {
        error!(error = %e, "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle regular messages (ticket intake)
async fn handle_messages(bot: Bot, msg: Message, services: Arc<ServiceFactory>) -> HandlerResult {
    let services = (*services).clone();
    let chat_id = msg.chat.id;

    let result = handle_message(bot.clone(), msg, services).await;
    if let Err(e) = reply_user_errors(&bot, chat_id, result).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }

    Ok(())
}

/// Handle callback queries
async fn handle_callbacks(
    bot: Bot,
    query: teloxide::types::CallbackQuery,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let services = (*services).clone();

    if let Err(e) = handle_callback(bot, query, services).await {
        error!(error = %e, "Error handling callback query");
        return Err(e.into());
    }

    Ok(())
}

/// Handle chat member updates (bot added to chats)
async fn handle_chat_member_updates(
    bot: Bot,
    update: teloxide::types::ChatMemberUpdated,
    services: Arc<ServiceFactory>,
) -> HandlerResult {
    let services = (*services).clone();

    // Only react to the bot itself joining a chat
    let me = bot.get_me().await?;
    if update.new_chat_member.user.id == me.id && update.new_chat_member.is_present() {
        let title = update.chat.title().map(str::to_string);
        if let Err(e) = handle_bot_added(bot, update.chat.id, title, services).await {
            error!(error = %e, "Error handling bot added to chat");
            return Err(e.into());
        }
    }

    Ok(())
}
