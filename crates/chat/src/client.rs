use thiserror::Error;
use wello_shared::{ChatRequest, ChatResponse};

/// Ways one invoke round-trip can fail. They all surface to the user as
/// the same apology; the split exists for logs and tests.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The engine answered with a non-success status.
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
    /// A success status carrying a body we could not decode.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Send one message and decode the reply. Exactly one request per
    /// call; no timeout is applied, so a silent server keeps the future
    /// pending.
    pub async fn invoke(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let url = format!("{}/chat/invoke", self.base_url.trim_end_matches('/'));

        let response = self.client
            .post(&url)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
