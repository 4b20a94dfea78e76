//! OpenAI adapter (chat completions).
//!
//! Implements `CompletionPort` over `POST {base_url}/chat/completions`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mab_core::{
    completion::{ChatMessage, CompletionPort, CompletionRequest},
    errors::Error,
    Result,
};

#[derive(Clone, Debug)]
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("openai http client: {e}")))?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl CompletionPort for OpenAiClient {
    async fn complete(&self, req: &CompletionRequest) -> Result<String> {
        let body = ChatCompletionBody {
            model: &req.params.model,
            messages: &req.messages,
            temperature: req.params.temperature,
            max_tokens: req.params.max_tokens,
        };

        debug!(model = %req.params.model, messages = req.messages.len(), "openai request");

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("openai request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "openai completion failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("openai json error: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Upstream("openai completion returned no choices".to_string()))?;

        // `content` may be null (e.g. refusals); the relay then sends nothing.
        Ok(choice.message.content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use mab_core::{
        completion::CompletionParams,
        prompt::{build_analysis_request, SYSTEM_PROMPT},
    };

    use super::*;

    fn client(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new("sk-test", server.url("/v1/"), Duration::from_secs(5)).expect("client")
    }

    #[tokio::test]
    async fn sends_messages_and_parameters() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer sk-test")
                .json_body(json!({
                    "model": "gpt-4o-mini",
                    "messages": [
                        {"role": "system", "content": SYSTEM_PROMPT},
                        {"role": "user", "content": "Report Q1 sales"}
                    ],
                    "temperature": 0.3,
                    "max_tokens": 1500
                }));
            then.status(200).json_body(json!({
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "analysis"}}]
            }));
        });

        let req = build_analysis_request("Report Q1 sales", &CompletionParams::default());
        let text = client(&server).complete(&req).await.expect("completion");

        assert_eq!(text, "analysis");
        mock.assert();
    }

    #[tokio::test]
    async fn non_success_status_is_an_upstream_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429)
                .body(r#"{"error":{"message":"You exceeded your current quota"}}"#);
        });

        let req = build_analysis_request("x", &CompletionParams::default());
        let err = client(&server).complete(&req).await.unwrap_err();

        assert!(matches!(err, Error::Upstream(ref m) if m.contains("429") && m.contains("quota")));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn missing_choices_is_an_upstream_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({ "choices": [] }));
        });

        let req = build_analysis_request("x", &CompletionParams::default());
        let err = client(&server).complete(&req).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(ref m) if m.contains("no choices")));
    }

    #[tokio::test]
    async fn malformed_json_is_an_upstream_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body("not json");
        });

        let req = build_analysis_request("x", &CompletionParams::default());
        let err = client(&server).complete(&req).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(ref m) if m.contains("json")));
    }

    #[tokio::test]
    async fn null_content_is_empty_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            }));
        });

        let req = build_analysis_request("x", &CompletionParams::default());
        let text = client(&server).complete(&req).await.expect("completion");
        assert!(text.is_empty());
    }
}
