//! HTTP transport for the Fooodis REST API.
//!
//! One `ApiClient` is shared by every store in a session. All helpers
//! return JSON bodies as `serde_json::Value`; envelope decoding is the
//! resource's job. Failures map onto the `ApiError` taxonomy: transport
//! errors, non-2xx responses carrying a JSON `{"error": "..."}` body, and
//! malformed bodies. No request is ever retried here.

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether a manual retry could plausibly succeed. Decode failures and
    /// 4xx responses are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Server { status, .. } => (500..=599).contains(status),
            ApiError::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            return Self::Decode(value.to_string());
        }
        Self::Network(value.to_string())
    }
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        Self::read_json(response).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::read_json(response).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Self::read_json(response).await
    }

    pub async fn delete(&self, path: &str, query: &[(String, String)]) -> Result<(), ApiError> {
        let response = self.http.delete(self.url(path)).query(query).send().await?;
        Self::read_json(response).await.map(|_| ())
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Value, ApiError> {
        let response = self.http.post(self.url(path)).multipart(form).send().await?;
        Self::read_json(response).await
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        // DELETE endpoints respond 204 with no body.
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
