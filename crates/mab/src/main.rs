use std::sync::Arc;

use tokio::signal;
use tracing::info;

use mab_core::{config::Config, messaging::port::MessagingPort, relay::Relay};
use mab_openai::OpenAiClient;
use mab_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> Result<(), mab_core::Error> {
    mab_core::logging::init("mab")?;

    let cfg = Config::load()?;

    // Health checks must answer even while the bot is still connecting.
    let _health = mab_health::spawn(cfg.http_port);

    let bot = mab_telegram::Bot::new(cfg.telegram_bot_token.clone());
    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let completion = Arc::new(OpenAiClient::new(
        cfg.openai_api_key.clone(),
        cfg.openai_base_url.clone(),
        cfg.openai_timeout,
    )?);

    let relay = Arc::new(Relay::new(
        messenger,
        completion,
        cfg.allowed_users.clone(),
        cfg.completion.clone(),
    ));

    mab_telegram::router::run_polling(bot, relay, shutdown_signal())
        .await
        .map_err(|e| mab_core::Error::External(format!("telegram bot failed: {e}")))?;

    info!("process exiting");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl-c"),
        _ = terminate => info!("received SIGTERM"),
    }
}
