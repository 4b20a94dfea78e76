//! Splitting long replies into Telegram-sized messages.

use crate::{
    domain::{ChatId, MessageRef},
    messaging::port::MessagingPort,
    Result,
};

/// Maximum characters per delivered chunk (below Telegram's 4096 hard limit).
pub const CHUNK_MAX_CHARS: usize = 3800;

/// Lazy iterator over consecutive prefixes of at most `max_chars` characters.
///
/// Boundaries are purely positional; words and markup may be split.
#[derive(Clone, Debug)]
pub struct Chunks<'a> {
    rest: &'a str,
    max_chars: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let cut = self
            .rest
            .char_indices()
            .nth(self.max_chars)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(cut);
        self.rest = rest;
        Some(chunk)
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// `max_chars` is clamped to at least 1.
pub fn split_chunks(text: &str, max_chars: usize) -> Chunks<'_> {
    Chunks {
        rest: text,
        max_chars: max_chars.max(1),
    }
}

/// Send `text` as consecutive plain-text messages, each awaited before the next.
///
/// Empty text sends nothing. Stops at the first failed send.
pub async fn deliver_chunked(
    messenger: &dyn MessagingPort,
    chat_id: ChatId,
    text: &str,
    max_chars: usize,
) -> Result<Vec<MessageRef>> {
    let mut sent = Vec::new();
    for chunk in split_chunks(text, max_chars) {
        sent.push(messenger.send_text(chat_id, chunk).await?);
    }
    Ok(sent)
}
