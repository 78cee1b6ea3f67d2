//! Blocking LLM client for command translation
//!
//! A model-agnostic HTTP client for calling LLM APIs. Supports both
//! Anthropic and OpenAI-compatible APIs, detected from the endpoint URL.
//! A base URL such as `https://api.openai.com/v1` gets the endpoint path
//! (`/chat/completions` or `/messages`) appended.
//! The async reqwest client is driven by a private current-thread runtime,
//! so callers see a plain blocking `send`.

use crate::core::config::Config;
use crate::core::error::{Result, TaiError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::runtime::Runtime;

/// Sends one prompt and returns the model's raw text
pub trait ModelClient {
    fn send(&self, prompt: &str) -> Result<String>;
}

impl<T: ModelClient + ?Sized> ModelClient for &T {
    fn send(&self, prompt: &str) -> Result<String> {
        (**self).send(prompt)
    }
}

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

const MAX_TOKENS: u32 = 512;
const OPENAI_ENDPOINT: &str = "/chat/completions";
const ANTHROPIC_ENDPOINT: &str = "/messages";

/// HTTP client for a remote language model
pub struct LlmClient {
    client: Client,
    runtime: Runtime,
    api_key: Option<String>,
    api_url: String,
    model: String,
    temperature: f32,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    ///
    /// `api_url` may be a full endpoint or a base URL; see [`resolve_endpoint`].
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self> {
        let api_url = resolve_endpoint(&api_url);
        let api_format = Self::detect_api_format(&api_url);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TaiError::Transport(e.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            client,
            runtime,
            api_key,
            api_url,
            model,
            temperature: 0.0,
            api_format,
        })
    }

    /// Create a client from the invocation config
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.api_key.clone(),
            config.api_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_temperature(config.temperature))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") || url.trim_end_matches('/').ends_with("/messages") {
            ApiFormat::Anthropic
        } else {
            // OpenAI and compatible APIs (DeepSeek, local servers, etc.)
            ApiFormat::OpenAI
        }
    }

    /// The API key, or an auth error when none is configured
    fn credentials(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(TaiError::Auth(
                "missing API key; set TERMINAL_AI_API_KEY or OPENAI_API_KEY, or pass --api-key"
                    .into(),
            )),
        }
    }

    async fn complete_anthropic(&self, api_key: &str, prompt: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: self.temperature,
            messages: vec![Message {
                role: "user".into(),
                content: prompt.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TaiError::Transport(e.to_string()))?;

        let response = check_status(response).await?;

        let completion: AnthropicResponse = decode(response).await?;

        completion
            .content
            .into_iter()
            .find_map(|c| c.text)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| TaiError::Transport("Empty response".into()))
    }

    async fn complete_openai(&self, api_key: &str, prompt: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            temperature: self.temperature,
            messages: vec![Message {
                role: "user".into(),
                content: prompt.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| TaiError::Transport(e.to_string()))?;

        let response = check_status(response).await?;

        let completion: OpenAIResponse = decode(response).await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| TaiError::Transport("Empty response".into()))
    }
}

impl ModelClient for LlmClient {
    fn send(&self, prompt: &str) -> Result<String> {
        let api_key = self.credentials()?;
        tracing::debug!(
            "Sending prompt ({} bytes) to {} as {:?}",
            prompt.len(),
            self.api_url,
            self.api_format
        );

        match self.api_format {
            ApiFormat::Anthropic => self
                .runtime
                .block_on(self.complete_anthropic(api_key, prompt)),
            ApiFormat::OpenAI => self.runtime.block_on(self.complete_openai(api_key, prompt)),
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    Err(TaiError::Transport(format!(
        "API error ({}): {}",
        status,
        error_text.trim()
    )))
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response
        .text()
        .await
        .map_err(|e| TaiError::Transport(e.to_string()))?;
    Ok(serde_json::from_str(&body)?)
}

/// Append the endpoint path to a base URL
///
/// URLs that already end in `/chat/completions` or `/messages` are kept.
/// Otherwise Anthropic hosts get `/messages` and everything else gets
/// `/chat/completions`.
pub fn resolve_endpoint(url: &str) -> String {
    let base = url.trim().trim_end_matches('/');
    if base.ends_with(OPENAI_ENDPOINT) || base.ends_with(ANTHROPIC_ENDPOINT) {
        return base.to_string();
    }
    if base.contains("anthropic.com") {
        format!("{}{}", base, ANTHROPIC_ENDPOINT)
    } else {
        format!("{}{}", base, OPENAI_ENDPOINT)
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{ErrorKind, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve exactly one HTTP response and hand back the raw request
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });

        (url, handle)
    }

    fn read_request(stream: &mut std::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn client_for(url: &str, key: Option<&str>) -> LlmClient {
        LlmClient::new(
            key.map(String::from),
            url.to_string(),
            "gpt-test".into(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = client_for("https://api.example.com", Some("test-key"));
        assert_eq!(client.api_key.as_deref(), Some("test-key"));
        assert_eq!(client.api_url, "https://api.example.com/chat/completions");
        assert_eq!(client.model, "gpt-test");
        assert_eq!(client.api_format, ApiFormat::OpenAI);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.api_key = Some("k".into());
        config.temperature = 0.7;
        let client = LlmClient::from_config(&config).unwrap();
        assert_eq!(client.model, config.model);
        assert!((client.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_detect_api_format() {
        assert_eq!(
            LlmClient::detect_api_format("https://api.anthropic.com/v1/messages"),
            ApiFormat::Anthropic
        );
        assert_eq!(
            LlmClient::detect_api_format("https://api.openai.com/v1/chat/completions"),
            ApiFormat::OpenAI
        );
        assert_eq!(
            LlmClient::detect_api_format("https://api.deepseek.com/chat/completions"),
            ApiFormat::OpenAI
        );
    }

    #[test]
    fn test_resolve_endpoint() {
        assert_eq!(
            resolve_endpoint("https://api.openai.com/v1"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            resolve_endpoint("https://api.deepseek.com/v1/"),
            "https://api.deepseek.com/v1/chat/completions"
        );
        assert_eq!(
            resolve_endpoint("https://api.anthropic.com/v1"),
            "https://api.anthropic.com/v1/messages"
        );
        assert_eq!(
            resolve_endpoint("https://api.openai.com/v1/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            resolve_endpoint("http://localhost:8080/v1/messages"),
            "http://localhost:8080/v1/messages"
        );
    }

    #[test]
    fn test_base_url_posts_to_chat_completions() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"content":"Command: ls\nWhy: List files"}}]}"#,
        );
        let base = url.trim_end_matches("/chat/completions").to_string();
        assert!(base.ends_with("/v1"));

        let client = client_for(&base, Some("sk-test"));
        assert_eq!(client.api_format(), &ApiFormat::OpenAI);
        client.send("list files").unwrap();

        let request = server.join().unwrap();
        assert!(
            request.starts_with("POST /v1/chat/completions HTTP/1.1"),
            "{request}"
        );
    }

    #[test]
    fn test_missing_key_fails_before_any_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());

        for key in [None, Some(""), Some("   ")] {
            let err = client_for(&url, key).send("list files").unwrap_err();
            assert!(matches!(err, TaiError::Auth(_)), "got {err:?}");
        }

        match listener.accept() {
            Err(e) => assert_eq!(e.kind(), ErrorKind::WouldBlock),
            Ok(_) => panic!("client connected despite missing credentials"),
        }
    }

    #[test]
    fn test_openai_success() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"  Command: ls\nWhy: List files  "}}]}"#,
        );
        let text = client_for(&url, Some("sk-test")).send("list files").unwrap();
        assert_eq!(text, "Command: ls\nWhy: List files");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /v1/chat/completions"));
        assert!(request.to_lowercase().contains("authorization: bearer sk-test"));
        assert!(request.contains(r#""model":"gpt-test""#));
        assert!(request.contains("list files"));
    }

    #[test]
    fn test_anthropic_success() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/messages", listener.local_addr().unwrap());
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let body = r#"{"content":[{"type":"text","text":"Command: pwd\nWhy: Print directory"}]}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });

        let client = client_for(&url, Some("ak-test"));
        assert_eq!(client.api_format(), &ApiFormat::Anthropic);
        assert_eq!(client.send("where am I").unwrap(), "Command: pwd\nWhy: Print directory");

        let request = server.join().unwrap().to_lowercase();
        assert!(request.contains("x-api-key: ak-test"));
        assert!(request.contains("anthropic-version"));
    }

    #[test]
    fn test_non_success_status_is_transport_error() {
        let (url, server) = serve_once("401 Unauthorized", r#"{"error":"bad key"}"#);
        let err = client_for(&url, Some("sk-wrong")).send("hi").unwrap_err();
        match err {
            TaiError::Transport(msg) => {
                assert!(msg.contains("401"), "{msg}");
                assert!(msg.contains("bad key"), "{msg}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_undecodable_body_is_transport_error() {
        let (url, server) = serve_once("200 OK", "not json at all");
        let err = client_for(&url, Some("sk-test")).send("hi").unwrap_err();
        assert!(matches!(err, TaiError::Serde(_)), "got {err:?}");
        assert_eq!(err.exit_code(), 3);
        server.join().unwrap();
    }

    #[test]
    fn test_empty_choices_is_transport_error() {
        let (url, server) = serve_once("200 OK", r#"{"choices":[]}"#);
        let err = client_for(&url, Some("sk-test")).send("hi").unwrap_err();
        assert!(matches!(err, TaiError::Transport(_)));
        server.join().unwrap();
    }

    #[test]
    fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v1/chat/completions", listener.local_addr().unwrap());
        drop(listener);

        let err = client_for(&url, Some("sk-test")).send("hi").unwrap_err();
        assert!(matches!(err, TaiError::Transport(_)));
    }
}
