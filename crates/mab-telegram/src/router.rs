use std::{future::Future, sync::Arc};

use teloxide::{
    dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*,
    types::AllowedUpdate, update_listeners::Polling,
};
use tracing::{info, warn};

use mab_core::relay::Relay;

use crate::handlers;

/// Long-poll `message` updates and feed them to the relay until `shutdown` resolves.
///
/// Any webhook is removed and pending updates are dropped before polling starts.
pub async fn run_polling(
    bot: Bot,
    relay: Arc<Relay>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    bot.delete_webhook().drop_pending_updates(true).await?;

    match bot.get_me().await {
        Ok(me) => info!(bot = %me.username(), "bot started, polling"),
        Err(e) => warn!(error = %e, "getMe failed, polling anyway"),
    }
    info!(allowed_users = relay.allowed().len(), "access list loaded");

    let handler = Update::filter_message()
        .branch(
            dptree::filter(|msg: Message| handlers::is_start_command(msg.text()))
                .endpoint(handlers::handle_start),
        )
        .branch(dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handlers::handle_text));

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![relay])
        .default_handler(|_| async {})
        .build();

    let token = dispatcher.shutdown_token();
    tokio::spawn(async move {
        shutdown.await;
        info!("shutdown signal received");
        match token.shutdown() {
            Ok(done) => done.await,
            Err(e) => warn!(error = %e, "dispatcher was not running"),
        }
    });

    let listener = Polling::builder(bot)
        .allowed_updates(vec![AllowedUpdate::Message])
        .build();

    dispatcher
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("update listener error"),
        )
        .await;

    info!("bot stopped");
    Ok(())
}
