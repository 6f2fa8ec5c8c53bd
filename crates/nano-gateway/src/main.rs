//! nano-gateway entry point
//!
//! Run with:
//! ```bash
//! BOT_APP_ID=... BOT_TOKEN=... cargo run -p nano-gateway
//! ```
//!
//! Configuration is loaded from environment variables and an optional `.env`.

use std::sync::Arc;

use nano_common::{try_init_tracing_with_config, AppConfig, AppError, TracingConfig};
use nano_gateway::{rules, Bot, Ctx, Manager, Options};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Gateway client stopped");
        eprintln!("nano-gateway: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    if let Err(e) = try_init_tracing_with_config(&TracingConfig::from(&config.log)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }
    info!(
        app = %config.app.name,
        env = ?config.app.env,
        app_id = %config.bot.app_id,
        "Configuration loaded"
    );

    let bot = Bot::builder(config.bot.clone())
        .gateway(config.gateway.clone())
        .build()
        .map_err(|e| AppError::Api(e.to_string()))?;

    let manager = Arc::new(Manager::new(Arc::clone(bot.matchers()), &config.storage.data_dir));
    manager.register_admin();
    register_demo(&manager)?;

    let sessions = bot.start().await.map_err(|e| AppError::Api(e.to_string()))?;
    info!(sessions = sessions.len(), "Gateway client started");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    Ok(())
}

/// `/echo <text>` and `ping`
fn register_demo(manager: &Manager) -> Result<(), AppError> {
    let engine = manager
        .register(
            "demo",
            Options::new().help("/echo <text>: repeat the text\nping: answer pong"),
        )
        .map_err(|e| AppError::Registration(e.to_string()))?;

    engine
        .on_message_command("echo", [rules::only_to_me()])
        .handle_owned(|ctx| async move {
            let text = ctx.state.get_str("args").unwrap_or_default().trim().to_string();
            if !text.is_empty() {
                say(&ctx, text).await;
            }
        });
    engine
        .on_message_full_match("ping", [rules::only_to_me()])
        .handle_owned(|ctx| async move { say(&ctx, "pong").await });
    Ok(())
}

async fn say(ctx: &Ctx, text: impl Into<String>) {
    if let Err(e) = ctx.send_text(text).await {
        warn!(error = %e, event = ctx.name(), "Reply failed");
    }
}
