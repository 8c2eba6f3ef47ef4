use dotenv::dotenv;
use std::sync::Arc;
use std::time::Instant;
use web3_memory_backend::ai::{AiClient, IntentClassifier};
use web3_memory_backend::blockchain::BlockchainService;
use web3_memory_backend::channels::{MessageDispatcher, start_telegram_listener};
use web3_memory_backend::config::Config;
use web3_memory_backend::db::Database;
use web3_memory_backend::routes::{AppState, build_router};

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();

    log::info!("Initializing database at {}", config.database_url);
    let db = match Database::new(&config.database_url) {
        Ok(db) => Arc::new(db),
        Err(e) => {
            log::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let providers = config.load_providers();
    log::info!(
        "Block explorers: {}",
        providers
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    let blockchain = Arc::new(BlockchainService::new(providers));

    let ai_client = match AiClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("Failed to create model client: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("Using model {} at {}", config.openai_model, config.openai_endpoint);
    let classifier = Arc::new(IntentClassifier::new(ai_client));

    let dispatcher = Arc::new(MessageDispatcher::new(
        db.clone(),
        classifier,
        blockchain.clone(),
    ));

    let telegram_enabled = match config.telegram_bot_token.clone() {
        Some(token) => {
            tokio::spawn(start_telegram_listener(token, dispatcher.clone()));
            true
        }
        None => {
            log::warn!("TELEGRAM_BOT_TOKEN not set, Telegram listener disabled");
            false
        }
    };

    let state = Arc::new(AppState {
        db,
        dispatcher,
        blockchain,
        start_time: Instant::now(),
        telegram_enabled,
    });

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    log::info!("Web3 Memory Bot listening on http://{}", addr);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {}", e);
        }
        log::info!("Shutting down");
    };

    if let Err(e) = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
    {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
