use crate::domain::{ChatId, UserId};

/// Inbound text message, stripped of Telegram-specific fields.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    /// `None` for messages without a sender (e.g. channel posts).
    pub user_id: Option<UserId>,
    /// Sender display name ("first last"), used in the greeting.
    pub full_name: String,
    pub text: String,
}

/// Limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    /// Hard per-message limit, in characters.
    pub max_message_len: usize,
}
