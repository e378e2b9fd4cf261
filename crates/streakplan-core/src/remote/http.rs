//! Messages-style HTTP generator client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{GenerationRequest, GenerativeClient, RemoteError};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
/// Output token ceiling of [`DEFAULT_MODEL`]; larger `max_tokens` values are
/// rejected with a 400.
pub const DEFAULT_MODEL_MAX_OUTPUT_TOKENS: u32 = 8_192;
const API_VERSION: &str = "2023-06-01";

/// Connection settings for [`HttpGenerativeClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

pub struct HttpGenerativeClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpGenerativeClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, RemoteError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            model: config.model,
        })
    }

    fn body(&self, request: &GenerationRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "system": request.system,
            "messages": [{"role": "user", "content": request.prompt}],
        })
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[async_trait]
impl GenerativeClient for HttpGenerativeClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, RemoteError> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!(%url, model = %self.model, "sending generation request");

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.body(&request))
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        if text.trim().is_empty() {
            return Err(RemoteError::EmptyResponse);
        }
        debug!(chars = text.len(), "received generation response");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpGenerativeClient {
        HttpGenerativeClient::new(HttpClientConfig {
            base_url: "http://localhost:9/".into(),
            api_key: "k".into(),
            model: "m".into(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        assert_eq!(client().base_url, "http://localhost:9");
    }

    #[test]
    fn body_has_messages_shape() {
        let body = client().body(&GenerationRequest {
            system: "sys".into(),
            prompt: "hello".into(),
            max_tokens: 128,
        });
        assert_eq!(body["model"], "m");
        assert_eq!(body["max_tokens"], 128);
        assert_eq!(body["system"], "sys");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn response_ignores_non_text_blocks() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{"content": [{"type": "text", "text": "a"}, {"type": "tool_use", "id": "x"}, {"type": "text", "text": "b"}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.content.len(), 3);
        assert!(matches!(parsed.content[1], ContentBlock::Other));
    }
}
