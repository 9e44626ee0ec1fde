use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::InferenceProvider;
use crate::config::ProviderConfig;
use crate::error::InferenceError;
use crate::types::{ContentBlock, InferenceRequest, InferenceResponse, StopReason, Usage};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(8);

/// Native client option. Applied in order; a later option for the same
/// setting overrides an earlier one. Headers are keyed case-insensitively
/// and replace any header the client would otherwise send under that name.
#[derive(Debug, Clone)]
pub enum RequestOption {
    ApiKey(String),
    BaseUrl(String),
    Organization(String),
    Project(String),
    HttpClient(reqwest::Client),
    RequestTimeout(Duration),
    MaxRetries(u32),
    Header(String, String),
}

/// OpenAI-compatible provider. Works with vLLM, LM Studio, OpenRouter,
/// or any server that implements the `/v1/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    organization: Option<String>,
    project: Option<String>,
    timeout: Option<Duration>,
    max_retries: u32,
    headers: HeaderMap,
}

impl OpenAiProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut provider = Self {
            client: reqwest::Client::new(),
            base_url: String::new(),
            api_key: None,
            organization: None,
            project: None,
            timeout: None,
            max_retries: DEFAULT_MAX_RETRIES,
            headers: HeaderMap::new(),
        };
        provider.apply(RequestOption::BaseUrl(base_url.into()));
        provider
    }

    /// Start from the defaults and apply `options` in order.
    pub fn with_options(options: impl IntoIterator<Item = RequestOption>) -> Self {
        let mut provider = Self::new(DEFAULT_BASE_URL);
        for option in options {
            provider.apply(option);
        }
        provider
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::with_options(config.to_request_options())
    }

    /// Set an API key (required for OpenAI, OpenRouter, etc.).
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.apply(RequestOption::ApiKey(key.into()));
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.apply(RequestOption::HttpClient(client));
        self
    }

    fn apply(&mut self, option: RequestOption) {
        match option {
            RequestOption::ApiKey(key) => self.api_key = Some(key),
            RequestOption::BaseUrl(url) => self.base_url = url.trim_end_matches('/').to_string(),
            RequestOption::Organization(org) => self.organization = Some(org),
            RequestOption::Project(project) => self.project = Some(project),
            RequestOption::HttpClient(client) => self.client = client,
            RequestOption::RequestTimeout(timeout) => self.timeout = Some(timeout),
            RequestOption::MaxRetries(retries) => self.max_retries = retries,
            RequestOption::Header(key, value) => {
                match (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(&value),
                ) {
                    (Ok(name), Ok(value)) => {
                        self.headers.insert(name, value);
                    }
                    _ => warn!(header = %key, "skipping invalid request header"),
                }
            }
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Convert tool definitions (`name`, `description`, `input_schema`) to
    /// the function-calling format. Entries without a name are dropped.
    fn convert_tools(tools: &[Value]) -> Vec<Value> {
        tools
            .iter()
            .filter_map(|tool| {
                let name = tool["name"].as_str()?;
                let parameters = match tool.get("input_schema") {
                    Some(schema) if !schema.is_null() => schema.clone(),
                    _ => json!({ "type": "object", "properties": {} }),
                };
                Some(json!({
                    "type": "function",
                    "function": {
                        "name": name,
                        "description": tool.get("description").cloned().unwrap_or(Value::Null),
                        "parameters": parameters,
                    }
                }))
            })
            .collect()
    }

    fn build_body(request: &InferenceRequest) -> Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(ref system) = request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.extend(request.messages.iter().cloned());

        let mut body = json!({
            "model": request.model,
            "messages": messages,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if !request.tools.is_empty() {
            body["tools"] = Value::Array(Self::convert_tools(&request.tools));
        }
        body
    }

    fn request(&self, body: &Value) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("content-type", "application/json");

        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        if let Some(ref org) = self.organization {
            req = req.header("OpenAI-Organization", org);
        }
        if let Some(ref project) = self.project {
            req = req.header("OpenAI-Project", project);
        }
        if !self.headers.is_empty() {
            req = req.headers(self.headers.clone());
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        req.json(body)
    }

    /// Send the request, retrying transport failures, 429 and 5xx up to
    /// `max_retries` times. Returns the body of the first 2xx response.
    async fn send(&self, body: &Value) -> Result<String, InferenceError> {
        let mut attempt = 0u32;
        loop {
            let reason = match self.request(body).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp
                        .text()
                        .await
                        .map_err(|e| InferenceError::Request(e.to_string()))?;
                    if status.is_success() {
                        return Ok(text);
                    }
                    if !is_retryable(status) || attempt >= self.max_retries {
                        return Err(InferenceError::Api {
                            status: status.as_u16(),
                            body: text,
                        });
                    }
                    format!("status {status}")
                }
                Err(e) => {
                    if e.is_builder() || attempt >= self.max_retries {
                        return Err(InferenceError::Request(e.to_string()));
                    }
                    e.to_string()
                }
            };

            attempt += 1;
            let delay = backoff(attempt);
            warn!(
                attempt,
                max_retries = self.max_retries,
                reason = %reason,
                delay_ms = delay.as_millis() as u64,
                "retrying inference request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    fn parse_response(text: &str) -> Result<InferenceResponse, InferenceError> {
        let parsed: Value =
            serde_json::from_str(text).map_err(|e| InferenceError::Parse(e.to_string()))?;

        let choice = parsed["choices"]
            .get(0)
            .ok_or_else(|| InferenceError::Parse("response has no choices".into()))?;

        let stop_reason = match choice["finish_reason"].as_str().unwrap_or("stop") {
            "stop" => StopReason::EndTurn,
            "tool_calls" => StopReason::ToolUse,
            "length" => StopReason::MaxTokens,
            other => {
                debug!(finish_reason = %other, "unknown finish_reason, treating as EndTurn");
                StopReason::EndTurn
            }
        };

        let message = &choice["message"];
        let mut content = Vec::new();

        if let Some(text) = message["content"].as_str().filter(|t| !t.is_empty()) {
            content.push(ContentBlock::Text(text.to_string()));
        }

        for call in message["tool_calls"].as_array().into_iter().flatten() {
            let function = &call["function"];
            content.push(ContentBlock::ToolUse {
                id: call["id"].as_str().unwrap_or_default().to_string(),
                name: function["name"].as_str().unwrap_or_default().to_string(),
                arguments: function["arguments"].as_str().unwrap_or("{}").to_string(),
            });
        }

        let usage = Usage {
            input_tokens: parsed["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: parsed["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(InferenceResponse {
            stop_reason,
            content,
            usage,
        })
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn backoff(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    RETRY_BASE_DELAY.saturating_mul(factor).min(RETRY_MAX_DELAY)
}

#[async_trait]
impl InferenceProvider for OpenAiProvider {
    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let body = Self::build_body(&request);

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "openai inference request"
        );

        let text = self.send(&body).await?;
        Self::parse_response(&text)
    }
}
