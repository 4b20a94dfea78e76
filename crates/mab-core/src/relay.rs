//! The per-message relay pipeline: allow-list, prompt, completion, chunked reply.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    chunking::{deliver_chunked, CHUNK_MAX_CHARS},
    completion::{CompletionParams, CompletionPort},
    formatting::{bold, prefixed_code_within},
    messaging::{port::MessagingPort, types::InboundMessage},
    prompt::build_analysis_request,
    security::AllowList,
    Error, Result,
};

pub const DENIED_REPLY: &str = "Доступ запрещён. Вы не в белом списке.";
pub const EMPTY_REPLY: &str = "Пустое сообщение. Отправь текст для анализа.";
pub const ERROR_PREFIX: &str = "Произошла ошибка: ";

/// Upper bound for the single error reply.
pub const ERROR_REPLY_MAX_CHARS: usize = 4000;

/// Which branch of the pipeline handled a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Sender not in the allow-list; the denial reply was sent.
    Denied,
    /// `/start` from an allowed sender; the greeting was sent.
    Greeted,
    /// Blank text; the empty-input reply was sent.
    Empty,
    /// The completion was delivered as `chunks` messages (0 for an empty completion).
    Delivered { chunks: usize },
    /// The completion or its delivery failed; one error reply was sent.
    Failed { error: String },
}

/// Long-lived handles shared by every message handler.
pub struct Relay {
    messenger: Arc<dyn MessagingPort>,
    completion: Arc<dyn CompletionPort>,
    allowed: AllowList,
    params: CompletionParams,
}

impl Relay {
    pub fn new(
        messenger: Arc<dyn MessagingPort>,
        completion: Arc<dyn CompletionPort>,
        allowed: AllowList,
        params: CompletionParams,
    ) -> Self {
        Self {
            messenger,
            completion,
            allowed,
            params,
        }
    }

    pub fn allowed(&self) -> &AllowList {
        &self.allowed
    }

    /// `/start`: greet allowed senders by name.
    pub async fn handle_start(&self, msg: &InboundMessage) -> Result<RelayOutcome> {
        if !self.allowed.is_authorized(msg.user_id) {
            return self.deny(msg).await;
        }

        let greeting = format!(
            "Привет, {}!\nОтправь мне текст для анализа.",
            bold(&msg.full_name)
        );
        self.messenger.send_html(msg.chat_id, &greeting).await?;
        Ok(RelayOutcome::Greeted)
    }

    /// Any other text: analyze it and relay the completion back to the chat.
    ///
    /// Only a failure to send the denial, empty-input or error reply is
    /// returned as `Err`; everything else is a [`RelayOutcome`].
    pub async fn handle_text(&self, msg: &InboundMessage) -> Result<RelayOutcome> {
        if !self.allowed.is_authorized(msg.user_id) {
            return self.deny(msg).await;
        }

        let user_text = msg.text.trim();
        if user_text.is_empty() {
            self.messenger.send_html(msg.chat_id, EMPTY_REPLY).await?;
            return Ok(RelayOutcome::Empty);
        }

        info!(
            chat_id = msg.chat_id.0,
            user_id = ?msg.user_id.map(|u| u.0),
            chars = user_text.chars().count(),
            "analyzing message"
        );

        let req = build_analysis_request(user_text, &self.params);
        let answer = match self.completion.complete(&req).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(chat_id = msg.chat_id.0, error = ?e, "completion request failed");
                return self.report_failure(msg, &e).await;
            }
        };

        let limit = CHUNK_MAX_CHARS.min(self.messenger.capabilities().max_message_len);
        match deliver_chunked(self.messenger.as_ref(), msg.chat_id, &answer, limit).await {
            Ok(sent) => {
                info!(
                    chat_id = msg.chat_id.0,
                    chunks = sent.len(),
                    "analysis delivered"
                );
                Ok(RelayOutcome::Delivered { chunks: sent.len() })
            }
            Err(e) => {
                error!(chat_id = msg.chat_id.0, error = ?e, "reply delivery failed");
                self.report_failure(msg, &e).await
            }
        }
    }

    async fn deny(&self, msg: &InboundMessage) -> Result<RelayOutcome> {
        warn!(
            user_id = ?msg.user_id.map(|u| u.0),
            chat_id = msg.chat_id.0,
            "access denied"
        );
        self.messenger.send_html(msg.chat_id, DENIED_REPLY).await?;
        Ok(RelayOutcome::Denied)
    }

    async fn report_failure(&self, msg: &InboundMessage, err: &Error) -> Result<RelayOutcome> {
        let limit = ERROR_REPLY_MAX_CHARS.min(self.messenger.capabilities().max_message_len);
        let error = err.to_string();
        let reply = prefixed_code_within(ERROR_PREFIX, &error, limit);
        self.messenger.send_html(msg.chat_id, &reply).await?;
        Ok(RelayOutcome::Failed { error })
    }
}
