//! Provider settings, kept free of the client's own option types.
//!
//! A [`ProviderConfig`] is assembled with `with_*` setters and translated
//! once into [`RequestOption`]s. Fields left at their zero value are not
//! translated, so the client falls back to its own defaults for them.

use std::collections::HashMap;
use std::time::Duration;

use crate::inference::openai::{OpenAiProvider, RequestOption, DEFAULT_MAX_RETRIES};

/// Environment variables read by [`ProviderConfig::from_env`].
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_ORGANIZATION: &str = "OPENAI_ORG_ID";
pub const ENV_PROJECT: &str = "OPENAI_PROJECT_ID";

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub organization: String,
    pub project: String,
    pub http_client: Option<reqwest::Client>,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub headers: HashMap<String, String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: String::new(),
            organization: String::new(),
            project: String::new(),
            http_client: None,
            request_timeout: Duration::ZERO,
            max_retries: DEFAULT_MAX_RETRIES,
            headers: HashMap::new(),
        }
    }
}

impl ProviderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults seeded from `OPENAI_API_KEY`, `OPENAI_BASE_URL`,
    /// `OPENAI_ORG_ID` and `OPENAI_PROJECT_ID`. Unset or empty variables
    /// leave the field empty.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty()).unwrap_or_default();
        Self {
            api_key: get(ENV_API_KEY),
            base_url: get(ENV_BASE_URL),
            organization: get(ENV_ORGANIZATION),
            project: get(ENV_PROJECT),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = organization.into();
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set one request header. Setting the same key again overwrites it.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Translate into client options: one per set field, in the order api
    /// key, base URL, organization, project, HTTP client, timeout, retries,
    /// then one per header in no particular order.
    ///
    /// `max_retries` is always emitted, so an explicit 0 disables retries
    /// instead of falling back to the client default.
    pub(crate) fn to_request_options(&self) -> Vec<RequestOption> {
        let mut opts = Vec::new();

        if !self.api_key.is_empty() {
            opts.push(RequestOption::ApiKey(self.api_key.clone()));
        }
        if !self.base_url.is_empty() {
            opts.push(RequestOption::BaseUrl(self.base_url.clone()));
        }
        if !self.organization.is_empty() {
            opts.push(RequestOption::Organization(self.organization.clone()));
        }
        if !self.project.is_empty() {
            opts.push(RequestOption::Project(self.project.clone()));
        }
        if let Some(ref client) = self.http_client {
            opts.push(RequestOption::HttpClient(client.clone()));
        }
        if !self.request_timeout.is_zero() {
            opts.push(RequestOption::RequestTimeout(self.request_timeout));
        }
        opts.push(RequestOption::MaxRetries(self.max_retries));

        for (key, value) in &self.headers {
            opts.push(RequestOption::Header(key.clone(), value.clone()));
        }

        opts
    }

    pub fn into_provider(self) -> OpenAiProvider {
        OpenAiProvider::from_config(&self)
    }
}
