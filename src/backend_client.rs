use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientConfig;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-2xx status.
    #[error("Backend error: {status} {body}")]
    Status { status: u16, body: String },

    /// The request never completed (DNS, refused connection, timeout, ...).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx answer whose body is not JSON.
    #[error("Invalid response body: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Body of `POST /ask`.
#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    message: &'a str,
}

/// Reply of `POST /ask`.
///
/// Every field is optional. Keys that are missing or hold an unexpected JSON
/// type are left as `None`, extra keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskResponse {
    pub tool_called: Option<String>,
    pub response: Option<String>,
    pub demo_mode: Option<bool>,
}

impl AskResponse {
    pub fn from_json(value: &Value) -> Self {
        Self {
            tool_called: value
                .get("tool_called")
                .and_then(Value::as_str)
                .map(str::to_owned),
            response: value
                .get("response")
                .and_then(Value::as_str)
                .map(str::to_owned),
            demo_mode: value.get("demo_mode").and_then(Value::as_bool),
        }
    }
}

pub struct BackendClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Send `message` to `POST {base_url}/ask`.
    ///
    /// The message is passed through unmodified. Transport failures are
    /// returned as-is, a non-2xx status becomes [`BackendError::Status`]
    /// carrying the raw body text.
    pub async fn ask(&self, message: &str) -> Result<AskResponse, BackendError> {
        let url = self.config.endpoint("ask");
        debug!("Sending message to {}: {:?}", url, message);

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { message })
            .send()
            .await?;

        let body = Self::json_body(response).await?;
        debug!("Received response from backend: {}", body);

        Ok(AskResponse::from_json(&body))
    }

    /// Ping `GET {base_url}/health` and return whatever JSON it answers with.
    pub async fn health(&self) -> Result<Value, BackendError> {
        let url = self.config.endpoint("health");
        debug!("Checking backend health at {}", url);

        let response = self.client.get(&url).send().await?;
        Self::json_body(response).await
    }

    async fn json_body(response: reqwest::Response) -> Result<Value, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!("Backend request failed with status {}: {}", status, body);
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(BackendError::Decode)
    }
}
