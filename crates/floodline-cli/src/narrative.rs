use crate::config::ProviderConfig;
use crate::error::Result;
use async_trait::async_trait;
use floodline::engine::narrative::{
    DisabledGenerator, NarrativeError, NarrativeGenerator, NarrativeRequest,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

const SYSTEM_MESSAGE: &str = "You are a helpful architectural advisor focused on climate resilience. Respond clearly and concisely.";

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> std::result::Result<String, NarrativeError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(NarrativeError::EmptyResponse)
    }
}

/// Narrative generator backed by an OpenAI-style chat completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(provider: &ProviderConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("floodline/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: provider.endpoint.clone(),
            model: provider.model.clone(),
            temperature: provider.temperature,
            api_key,
        })
    }

    fn request_body<'a>(&'a self, request: &'a NarrativeRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: request.max_tokens,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
        }
    }
}

fn transport_error(e: reqwest::Error, budget: std::time::Duration) -> NarrativeError {
    if e.is_timeout() {
        NarrativeError::Timeout(budget)
    } else {
        NarrativeError::Transport(e.to_string())
    }
}

#[async_trait]
impl NarrativeGenerator for ChatCompletionsClient {
    async fn generate(
        &self,
        request: &NarrativeRequest,
    ) -> std::result::Result<String, NarrativeError> {
        debug!(
            "Posting narrative request to {} (model {}, max_tokens {}).",
            self.endpoint, self.model, request.max_tokens
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(request.timeout)
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| transport_error(e, request.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NarrativeError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| transport_error(e, request.timeout))?;
        body.into_text()
    }
}

/// Picks the generator for a run: the HTTP client when the provider is
/// enabled and its API key is present, otherwise [`DisabledGenerator`].
pub fn build_generator(provider: &ProviderConfig) -> Result<Arc<dyn NarrativeGenerator>> {
    if !provider.enabled {
        info!("Narrative provider disabled; fallback texts will be reported.");
        return Ok(Arc::new(DisabledGenerator));
    }

    match std::env::var(&provider.api_key_env) {
        Ok(api_key) if !api_key.trim().is_empty() => {
            info!(
                "Using narrative provider at {} with model '{}'.",
                provider.endpoint, provider.model
            );
            Ok(Arc::new(ChatCompletionsClient::new(provider, api_key)?))
        }
        _ => {
            warn!(
                "Environment variable {} is not set; continuing without a narrative provider.",
                provider.api_key_env
            );
            Ok(Arc::new(DisabledGenerator))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn provider(endpoint: &str) -> ProviderConfig {
        ProviderConfig {
            enabled: true,
            endpoint: endpoint.to_string(),
            model: "gpt-4o".to_string(),
            temperature: 1.0,
            api_key_env: "FLOODLINE_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
        }
    }

    fn request() -> NarrativeRequest {
        NarrativeRequest {
            prompt: "Assess this design.".to_string(),
            max_tokens: 600,
            timeout: Duration::from_secs(5),
        }
    }

    async fn read_http_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serves a single canned response and hands back the raw request.
    async fn serve_once(status_line: &'static str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let raw_request = read_http_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            raw_request
        });
        (format!("http://{}/v1/chat/completions", addr), handle)
    }

    #[test]
    fn request_body_matches_chat_completions_shape() {
        let client = ChatCompletionsClient::new(&provider("http://unused"), "k".to_string()).unwrap();
        let request = request();
        let body = serde_json::to_value(client.request_body(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["temperature"], 1.0);
        assert_eq!(body["max_tokens"], 600);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], SYSTEM_MESSAGE);
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Assess this design.");
    }

    #[test]
    fn first_choice_content_is_extracted() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"1. A\n2. B"}},{"message":{"content":"ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "1. A\n2. B");
    }

    #[test]
    fn missing_or_blank_content_is_an_empty_response() {
        for json in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"  "}}]}"#,
        ] {
            let response: ChatResponse = serde_json::from_str(json).unwrap();
            assert!(matches!(
                response.into_text(),
                Err(NarrativeError::EmptyResponse)
            ));
        }
    }

    #[tokio::test]
    async fn successful_call_returns_message_content() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"1. Elevate.\n2. Worth it."}}]}"#,
        )
        .await;
        let client = ChatCompletionsClient::new(&provider(&endpoint), "test-key".to_string()).unwrap();

        let text = client.generate(&request()).await.unwrap();
        assert_eq!(text, "1. Elevate.\n2. Worth it.");

        let raw_request = server.await.unwrap();
        assert!(raw_request.starts_with("POST /v1/chat/completions"));
        assert!(raw_request.to_ascii_lowercase().contains("authorization: bearer test-key"));
        assert!(raw_request.contains("\"max_tokens\":600"));
    }

    #[tokio::test]
    async fn error_status_becomes_provider_error() {
        let (endpoint, server) =
            serve_once("429 Too Many Requests", r#"{"error":"rate limited"}"#).await;
        let client = ChatCompletionsClient::new(&provider(&endpoint), "test-key".to_string()).unwrap();

        match client.generate(&request()).await {
            Err(NarrativeError::Provider { status, message }) => {
                assert_eq!(status, 429);
                assert!(message.contains("rate limited"));
            }
            other => panic!("Expected provider error, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = format!("http://{}/v1/chat/completions", addr);
        let client = ChatCompletionsClient::new(&provider(&endpoint), "test-key".to_string()).unwrap();
        assert!(matches!(
            client.generate(&request()).await,
            Err(NarrativeError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn disabled_provider_uses_the_disabled_generator() {
        let mut config = provider("http://unused");
        config.enabled = false;
        let generator = build_generator(&config).unwrap();
        assert!(matches!(
            generator.generate(&request()).await,
            Err(NarrativeError::Disabled)
        ));
    }

    #[tokio::test]
    async fn missing_api_key_falls_back_to_the_disabled_generator() {
        let generator = build_generator(&provider("http://unused")).unwrap();
        assert!(matches!(
            generator.generate(&request()).await,
            Err(NarrativeError::Disabled)
        ));
    }
}
