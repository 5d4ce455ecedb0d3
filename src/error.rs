use thiserror::Error;

/// Errors surfaced by the adapter layer.
///
/// The HTTP caller itself never returns these; it reports through
/// [`crate::client::ApiResult`]. Call-site adapters convert a failed result into
/// one of these variants when they decide to give up.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// A required setting (prompt text, API key) is absent from the config store.
    #[error("missing required setting: {0}")]
    MissingConfig(String),

    /// Request parameters that cannot be sent as-is.
    #[error("invalid request parameter: {0}")]
    InvalidParameter(String),

    /// Non-2xx from the Responses API, or a transport failure (status is `None`).
    #[error("upstream request failed: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// Successful response without any output text.
    #[error("response contained no output text")]
    NoOutputText,

    /// JSON mode was requested but the model returned something else.
    #[error("model output is not valid JSON: {0}")]
    MalformedJson(String),
}

impl AdapterError {
    /// Upstream HTTP status, when the error came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AdapterError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
