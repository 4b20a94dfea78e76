//! Telegram update handlers.
//!
//! Each handler converts the teloxide `Message` into a core `InboundMessage`
//! and hands it to the relay. Relay failures are logged, never returned to the
//! dispatcher.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};
use tracing::{error, warn};

use mab_core::{
    domain::{ChatId, UserId},
    messaging::types::InboundMessage,
    relay::Relay,
};

/// Telegram may send `/cmd@botname arg1 ...`
fn parse_command(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }
    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    Some((cmd, rest))
}

pub fn is_start_command(text: Option<&str>) -> bool {
    text.and_then(parse_command)
        .is_some_and(|(cmd, _)| cmd == "start")
}

fn inbound(msg: &Message) -> Option<InboundMessage> {
    let text = msg.text()?.to_string();
    let user = msg.from();
    Some(InboundMessage {
        chat_id: ChatId(msg.chat.id.0),
        user_id: user.map(|u| UserId(u.id.0 as i64)),
        full_name: user.map(|u| u.full_name()).unwrap_or_default(),
        text,
    })
}

pub async fn handle_start(msg: Message, relay: Arc<Relay>) -> ResponseResult<()> {
    let Some(inbound) = inbound(&msg) else {
        return Ok(());
    };
    if let Err(e) = relay.handle_start(&inbound).await {
        error!(chat_id = inbound.chat_id.0, error = %e, "start reply failed");
    }
    Ok(())
}

pub async fn handle_text(msg: Message, relay: Arc<Relay>) -> ResponseResult<()> {
    let Some(inbound) = inbound(&msg) else {
        warn!(chat_id = msg.chat.id.0, "text handler got a message without text");
        return Ok(());
    };
    if let Err(e) = relay.handle_text(&inbound).await {
        error!(chat_id = inbound.chat_id.0, error = %e, "reply failed");
    }
    Ok(())
}
