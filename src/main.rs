use clap::{Parser, Subcommand};
use std::sync::Arc;

use greenhouse_bot::application::messaging::MessageParser;
use greenhouse_bot::application::services::{ChatWorkers, CommandService, MessageService};
use greenhouse_bot::domain::traits::Bot;
use greenhouse_bot::infrastructure::adapters::console::CONSOLE_CHAT;
use greenhouse_bot::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use greenhouse_bot::infrastructure::config::Config;
use greenhouse_bot::infrastructure::device::HttpDeviceClient;
use greenhouse_bot::infrastructure::storage::MemoryAuthStore;

/// Seconds Telegram holds a getUpdates request open
const POLL_TIMEOUT_SECONDS: i64 = 30;

#[derive(Parser)]
#[command(name = "greenhouse-bot")]
#[command(about = "Chat remote control for a plant watering controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            if let Err(e) = run_bot(&cli.config, cli.token) {
                tracing::error!("{}", e);
                std::process::exit(1);
            }
        }
        Commands::Version => {
            println!("greenhouse-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn load_config(config_path: &str, token_override: Option<String>) -> Config {
    let mut config = if std::path::Path::new(config_path).exists() {
        match Config::load(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config: {}, using defaults", e);
                Config::default()
            }
        }
    } else {
        tracing::info!("No config file at {}, using defaults", config_path);
        Config::default()
    };

    config.apply_env();
    if let Some(token) = token_override {
        config.set_token(token);
    }
    config
}

fn run_bot(config_path: &str, token_override: Option<String>) -> Result<(), String> {
    let config = load_config(config_path, token_override);
    config.validate().map_err(|e| format!("Invalid configuration: {}", e))?;

    tracing::info!("Starting {}", config.bot.name);
    tracing::info!("Device endpoint: {}", config.device.base_url());

    let device = HttpDeviceClient::new(&config.device)
        .map_err(|e| format!("Failed to create device client: {}", e))?;
    let auth = MemoryAuthStore::new(config.auth.secret.clone());
    let commands = Arc::new(CommandService::new(Arc::new(auth), Arc::new(device)));
    let parser = MessageParser::new(config.bot.prefix.clone());

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start runtime: {}", e))?;

    if let Some(token) = config.telegram_token() {
        let mut bot = TelegramAdapter::new(token).map_err(|e| e.to_string())?;
        rt.block_on(async {
            if let Err(e) = bot.fetch_bot_info().await {
                return Err(format!("Failed to fetch bot info: {}", e));
            }

            // Register bot commands with Telegram
            if let Err(e) = bot.register_commands().await {
                tracing::warn!("Failed to register commands: {}", e);
            }

            run_telegram_bot(Arc::new(bot), commands, parser).await;
            Ok(())
        })
    } else if config.console_enabled() {
        // Run console bot (dev mode)
        rt.block_on(run_console_bot(Arc::new(ConsoleAdapter::new()), commands, parser));
        Ok(())
    } else {
        Err("No adapter enabled".to_string())
    }
}

async fn run_telegram_bot(bot: Arc<TelegramAdapter>, commands: Arc<CommandService>, parser: MessageParser) {
    if let Err(e) = bot.start().await {
        tracing::error!("Failed to start bot: {}", e);
        return;
    }

    let info = bot.bot_info();
    tracing::info!("Bot started: @{}", info.username);

    let service = MessageService::new(Arc::clone(&bot), commands);
    let mut workers = ChatWorkers::new(service);
    let mut offset: i64 = 0;

    tracing::info!("Starting message loop...");

    loop {
        match bot.get_updates(offset, POLL_TIMEOUT_SECONDS).await {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::info!("Received {} updates", updates.len());
                }
                for update in &updates {
                    match TelegramAdapter::to_message(update, &parser) {
                        Some(message) => workers.dispatch(message),
                        None => tracing::debug!("Skipping update {}", update.update_id),
                    }
                }

                offset = TelegramAdapter::get_next_offset(&updates, offset);
            }
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            }
        }
    }
}

async fn run_console_bot(bot: Arc<ConsoleAdapter>, commands: Arc<CommandService>, parser: MessageParser) {
    use greenhouse_bot::domain::entities::User;

    if let Err(e) = bot.start().await {
        tracing::error!("Failed to start bot: {}", e);
        return;
    }

    let info = bot.bot_info();
    tracing::info!("Bot started: @{}", info.username);

    let service = MessageService::new(Arc::clone(&bot), commands);
    let user = User::new(CONSOLE_CHAT).with_name("Console", None::<String>);

    // Main loop (for console mode)
    while let Some(input) = bot.read_line("> ").await {
        if input.is_empty() {
            continue;
        }

        let message = parser
            .parse(CONSOLE_CHAT, input, Some(user.clone()))
            .with_platform("console");
        if !message.content.is_command() {
            if let Err(e) = bot.send_message(CONSOLE_CHAT, "Commands start with /. Try /help").await {
                tracing::error!("Failed to write console hint: {}", e);
            }
            continue;
        }

        if let Err(e) = service.handle(message).await {
            tracing::error!("Failed to handle console input: {}", e);
        }
    }

    tracing::info!("Console input closed, exiting");
}

fn init_config() {
    let config = Config::default();
    match serde_yaml::to_string(&config) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml, set auth.secret and adjust as needed.");
        }
        Err(e) => tracing::error!("Failed to render default config: {}", e),
    }
}
