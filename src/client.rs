use async_trait::async_trait;
use http::header;
use serde_json::{Map, Value};

use crate::error::AdapterError;
use crate::extract::extract_output_text;
use crate::models::responses::ResponsesUsage;

/// Outcome of a single Responses API call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult {
    Success {
        raw: Value,
        /// `None` when the payload carried no output text.
        text: Option<String>,
    },
    Failure {
        error: String,
        /// HTTP status for non-2xx responses; `None` for transport errors.
        status: Option<u16>,
    },
}

/// Successful call, unwrapped from [`ApiResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiSuccess {
    pub raw: Value,
    pub text: Option<String>,
}

impl ApiResult {
    pub fn failure(error: impl Into<String>, status: Option<u16>) -> Self {
        ApiResult::Failure {
            error: error.into(),
            status,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ApiResult::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiResult::Failure { status, .. } => *status,
            ApiResult::Success { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ApiResult::Success { text, .. } => text.as_deref(),
            ApiResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ApiResult::Failure { error, .. } => Some(error),
            ApiResult::Success { .. } => None,
        }
    }

    pub fn into_result(self) -> Result<ApiSuccess, AdapterError> {
        match self {
            ApiResult::Success { raw, text } => Ok(ApiSuccess { raw, text }),
            ApiResult::Failure { error, status } => Err(AdapterError::Upstream {
                status,
                message: error,
            }),
        }
    }
}

/// Anything that can execute a Responses API call.
///
/// Implemented by [`ResponsesClient`] for the real endpoint and by
/// [`crate::retry::Retrying`] as a decorator; tests supply scripted fakes.
#[async_trait]
pub trait ResponsesApi: Send + Sync {
    async fn create(&self, params: &Map<String, Value>) -> ApiResult;
}

#[async_trait]
impl<T: ResponsesApi + ?Sized> ResponsesApi for std::sync::Arc<T> {
    async fn create(&self, params: &Map<String, Value>) -> ApiResult {
        (**self).create(params).await
    }
}

/// HTTP caller for `POST {base_url}/responses`.
#[derive(Debug, Clone)]
pub struct ResponsesClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl ResponsesClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            http,
            url: format!("{}/responses", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    /// Build from `OPENAI_API_KEY` / `OPENAI_BASE_URL` and the env-configured HTTP client.
    pub fn from_env() -> Result<Self, AdapterError> {
        let key = crate::util::openai_api_key()
            .ok_or_else(|| AdapterError::MissingConfig("OPENAI_API_KEY".into()))?;
        Ok(Self::new(
            crate::util::build_http_client_from_env(),
            &crate::util::openai_base_url(),
            key,
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, params: &Map<String, Value>) -> Result<ApiResult, reqwest::Error> {
        let resp = self
            .http
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .json(params)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read error body");
                    String::new()
                }
            };
            tracing::warn!(status = status.as_u16(), body = %body, "Responses API returned an error");
            return Ok(ApiResult::failure(
                format!("Responses API error {}: {}", status.as_u16(), body),
                Some(status.as_u16()),
            ));
        }

        let raw: Value = resp.json().await?;
        if let Some(usage) = ResponsesUsage::from_payload(&raw) {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                total_tokens = usage.total_tokens,
                "Responses API usage"
            );
        }
        let text = extract_output_text(&raw);
        Ok(ApiResult::Success { raw, text })
    }
}

#[async_trait]
impl ResponsesApi for ResponsesClient {
    async fn create(&self, params: &Map<String, Value>) -> ApiResult {
        tracing::debug!(
            url = %self.url,
            model = params.get("model").and_then(|v| v.as_str()).unwrap_or(""),
            "calling Responses API"
        );
        match self.send(params).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "Responses API transport error");
                ApiResult::failure(e.to_string(), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_joins_without_double_slash() {
        let c = ResponsesClient::new(reqwest::Client::new(), "http://localhost:1/v1/", "k");
        assert_eq!(c.url(), "http://localhost:1/v1/responses");
    }

    #[test]
    fn failure_maps_to_upstream_error() {
        let err = ApiResult::failure("boom", Some(503)).into_result().unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn success_accessors() {
        let r = ApiResult::Success {
            raw: json!({"output_text": "ok"}),
            text: Some("ok".into()),
        };
        assert!(r.is_success());
        assert_eq!(r.text(), Some("ok"));
        assert_eq!(r.status(), None);
        assert_eq!(r.error(), None);
    }
}
