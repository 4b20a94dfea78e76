use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::MessagingCapabilities,
    Result,
};

/// Outbound messenger port.
///
/// The relay only ever sends new messages; it never edits or deletes.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    /// Send a message rendered with the platform's HTML parse mode.
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    /// Send a message verbatim, without any parse mode.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageRef>;
}
