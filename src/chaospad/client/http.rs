use super::{ApiClient, Method};
use crate::config::PanelConfig;
use crate::error::{ChaospadError, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const API_KEY_HEADER: &str = "X-Api-Key";

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// HTTP transport for a running backend.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    http: Client,
    server: Url,
    access_token: Option<String>,
    api_key: Option<String>,
}

impl HttpApiClient {
    pub fn new(server_url: &str) -> Result<Self> {
        let server = Url::parse(server_url)?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("chaospad/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            server,
            access_token: None,
            api_key: None,
        })
    }

    pub fn from_config(config: &PanelConfig) -> Result<Self> {
        let mut client = Self::new(&config.server_url)?;
        if let Some(token) = &config.access_token {
            client = client.with_access_token(token.as_str());
        }
        if let Some(key) = &config.api_key {
            client = client.with_api_key(key.as_str());
        }
        Ok(client)
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn server(&self) -> &Url {
        &self.server
    }

    /// Resolve `path` under the server URL, keeping any path prefix the server
    /// URL carries (e.g. a dashboard mounted at `/admin`).
    pub fn url_for(&self, path: &str) -> Result<Url> {
        let root = self.server.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{root}/{path}"))?)
    }
}

impl ApiClient for HttpApiClient {
    fn request(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.url_for(path)?;
        debug!(%method, %url, "sending request");

        let mut request = self.http.request(method.into(), url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;
        debug!(%method, status = status.as_u16(), bytes = text.len(), "response received");

        if !status.is_success() {
            return Err(ChaospadError::api(
                status.as_u16(),
                error_detail(status, &text),
            ));
        }
        decode_body(&text)
    }
}

fn decode_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

/// Human-readable message for a failed response.
///
/// The backend reports `{"detail": "..."}`; request validation failures carry a
/// list of `{"msg": "..."}` entries instead.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        match value.get("detail") {
            Some(Value::String(detail)) => return detail.clone(),
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('<') {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
