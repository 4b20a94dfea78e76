use crate::completion::{ChatMessage, CompletionParams, CompletionRequest};

/// Analyst instruction sent as the system message of every request.
pub const SYSTEM_PROMPT: &str = "
Ты - AI-аналитик для менеджеров. Твоя задача - анализировать предоставленный текст и давать структурированный ответ.
Структура ответа:
1. Ключевые моменты: Перечисли основные идеи.
2. Рекомендации: Предложи действия на основе анализа.
3. Риски: Укажи потенциальные проблемы.

Анализируй текст объективно и конструктивно.
";

/// Two-message exchange: the fixed system prompt, then the user's text verbatim.
pub fn build_analysis_request(user_text: &str, params: &CompletionParams) -> CompletionRequest {
    CompletionRequest {
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_text)],
        params: params.clone(),
    }
}
