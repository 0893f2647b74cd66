use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks;

use sloganbot::core::init_logger;
use sloganbot::storage::create_pool;
use sloganbot::{create_bot, schema, AppConfig, HandlerDeps};

/// Main entry point for the Telegram bot
///
/// # Errors
/// Returns an error if initialization fails (configuration, logging,
/// database, bot creation) or if the webhook listener cannot be started.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Arc::new(AppConfig::from_env()?);

    // Initialize logger (console + file)
    init_logger(&config.log_file_path)?;

    log::info!("Starting bot...");

    // Create database connection pool
    let db_pool = Arc::new(create_pool(&config.database_path)?);

    // Create bot instance
    let bot = create_bot(&config)?;

    let handler_deps = HandlerDeps::new(Arc::clone(&config), Arc::clone(&db_pool));
    let handler = schema(handler_deps);

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(DependencyMap::new())
        .enable_ctrlc_handler()
        .build();

    if let Some(webhook_url) = config.webhook_url.clone() {
        // Webhook mode
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        log::info!("Starting bot in webhook mode at {} (listening on {})", webhook_url, addr);

        let (listener, stop_flag, router) =
            webhooks::axum_to_router(bot, webhooks::Options::new(addr, webhook_url)).await?;

        // Serve the webhook endpoint and the health probes from one router
        let router = router
            .route("/", get(health))
            .route("/health", get(health));
        let tcp_listener = tokio::net::TcpListener::bind(addr).await?;
        tokio::spawn(async move {
            if let Err(e) = axum::serve(tcp_listener, router)
                .with_graceful_shutdown(stop_flag)
                .await
            {
                log::error!("Webhook server error: {}", e);
            }
        });

        dispatcher
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;
    } else {
        // Long polling mode (default)
        log::info!("Starting bot in long polling mode");
        dispatcher.dispatch().await;
    }

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

/// Liveness probe for the hosting platform.
async fn health() -> &'static str {
    "OK"
}
