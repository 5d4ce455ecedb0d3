use axum::response::{IntoResponse, Response};
use http::StatusCode;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use crate::adapters::{ReasoningOverride, ToolAdapter};
use crate::client::{ResponsesApi, ResponsesClient};
use crate::config_store::{CachedConfig, ConfigProvider, EnvConfig, StaticConfig};
use crate::retry::{RetryPolicy, Retrying};
use crate::sink::{ResultSink, TracingSink};

/// Public OpenAI endpoint root.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Initialize dotenv and structured tracing based on RUST_LOG.
///
/// - Supports explicit env file paths via ENV_FILE, DOTENV_PATH
/// - Falls back to default .env discovery
/// - Logs the source used
pub fn init_tracing() {
    let mut env_source: String = "none".into();
    for key in ["ENV_FILE", "DOTENV_PATH"] {
        if let Ok(p) = std::env::var(key) {
            let p = p.trim();
            if !p.is_empty()
                && std::path::Path::new(p).is_file()
                && dotenvy::from_filename(p).is_ok()
            {
                env_source = format!("{p} ({key})");
                break;
            }
        }
    }

    if env_source == "none" {
        if let Ok(path) = dotenvy::dotenv() {
            env_source = path.display().to_string();
        }
    }

    // Respects RUST_LOG potentially provided by the env file
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("Environment loaded from: {}", env_source);
}

/// Get the bind address for the HTTP server from env or default to 0.0.0.0:8088.
pub fn env_bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8088".into())
}

/// Parse an env var, ignoring it when absent or malformed.
pub fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Truthy env flag: 1, true, yes, on.
pub fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v.trim().to_ascii_lowercase())
        .map(|v| v == "1" || v == "true" || v == "yes" || v == "on")
        .unwrap_or(false)
}

/// Resolve the OpenAI base URL from environment or use the public endpoint.
pub fn openai_base_url() -> String {
    std::env::var("OPENAI_BASE_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
}

/// Read the OpenAI API key; blank counts as unset.
pub fn openai_api_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Build an HTTP client honoring proxy and timeout environment variables.
///
/// Environment:
/// - LEXBRIDGE_NO_PROXY = 1|true|yes|on      -> disable all proxies
/// - LEXBRIDGE_PROXY_URL = <url>             -> proxy for all schemes
/// - LEXBRIDGE_HTTP_TIMEOUT_SECONDS          -> overall request timeout (u64)
///
/// Without a timeout variable, reqwest's defaults apply.
pub fn build_http_client_from_env() -> reqwest::Client {
    let mut builder = reqwest::Client::builder();

    if let Some(n) = env_parse::<u64>("LEXBRIDGE_HTTP_TIMEOUT_SECONDS") {
        builder = builder.timeout(std::time::Duration::from_secs(n));
    }

    if env_flag("LEXBRIDGE_NO_PROXY") {
        builder = builder.no_proxy();
    } else if let Ok(url) = std::env::var("LEXBRIDGE_PROXY_URL") {
        let u = url.trim();
        if !u.is_empty() {
            match reqwest::Proxy::all(u) {
                Ok(p) => builder = builder.proxy(p),
                Err(e) => tracing::warn!(error = %e, "ignoring LEXBRIDGE_PROXY_URL"),
            }
        }
    }

    builder = builder.user_agent(format!("lexbridge/{}", env!("CARGO_PKG_VERSION")));

    builder.build().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "falling back to default HTTP client");
        reqwest::Client::new()
    })
}

/// Shared application state used by the HTTP server and handlers.
pub struct AppState {
    pub tools: BTreeMap<String, ToolAdapter>,
}

impl AppState {
    pub fn new(tools: Vec<ToolAdapter>) -> Self {
        Self {
            tools: tools
                .into_iter()
                .map(|t| (t.name().to_string(), t))
                .collect(),
        }
    }

    /// Standard tool set over a rate-limit-retrying client built from env.
    ///
    /// Settings come from `settings` when given, else from `LEXBRIDGE_*` env vars.
    pub fn from_env(settings: Option<StaticConfig>) -> Result<Self, crate::error::AdapterError> {
        let config: Arc<dyn ConfigProvider> = match settings {
            Some(s) => Arc::new(s),
            None => Arc::new(CachedConfig::new(EnvConfig::default())),
        };
        let api: Arc<dyn ResponsesApi> = Arc::new(Retrying::new(
            ResponsesClient::from_env()?,
            RetryPolicy::from_env(),
        ));
        let sink: Arc<dyn ResultSink> = Arc::new(TracingSink);

        Ok(Self::new(ToolAdapter::standard_set(
            config,
            api,
            sink,
            ReasoningOverride::from_env(),
        )))
    }

    pub fn tool(&self, name: &str) -> Option<&ToolAdapter> {
        self.tools.get(name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }
}

/// Build a JSON error response with the given HTTP status and message.
pub fn error_response(status: StatusCode, msg: &str) -> Response {
    let body = serde_json::json!({ "error": { "message": msg } });
    (status, axum::Json(body)).into_response()
}

/// Build a CORS layer from environment variables.
///
/// Environment variables:
/// - CORS_ALLOWED_ORIGINS: "*" or comma-separated origins (e.g., "https://a.com, https://b.com")
/// - CORS_MAX_AGE: max age in seconds (u64)
///
/// Defaults are permissive (Any) when not configured.
pub fn cors_layer_from_env() -> tower_http::cors::CorsLayer {
    use std::time::Duration;
    use tower_http::cors::{AllowOrigin, Any, CorsLayer};

    let mut layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let origins: Vec<http::HeaderValue> = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .filter(|s| s.trim() != "*")
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .filter_map(|p| http::HeaderValue::from_str(p).ok())
                .collect()
        })
        .unwrap_or_default();

    layer = if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    };

    if let Some(n) = env_parse::<u64>("CORS_MAX_AGE") {
        layer = layer.max_age(Duration::from_secs(n));
    }

    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parse_ignores_garbage() {
        std::env::set_var("LEXBRIDGE_TEST_PARSE_A", " 42 ");
        std::env::set_var("LEXBRIDGE_TEST_PARSE_B", "forty-two");
        assert_eq!(env_parse::<u32>("LEXBRIDGE_TEST_PARSE_A"), Some(42));
        assert_eq!(env_parse::<u32>("LEXBRIDGE_TEST_PARSE_B"), None);
        assert_eq!(env_parse::<u32>("LEXBRIDGE_TEST_PARSE_UNSET"), None);
    }

    #[test]
    fn env_flag_truthy_values() {
        for (i, v) in ["1", "TRUE", "yes", " on "].iter().enumerate() {
            let key = format!("LEXBRIDGE_TEST_FLAG_{i}");
            std::env::set_var(&key, v);
            assert!(env_flag(&key), "{v}");
        }
        std::env::set_var("LEXBRIDGE_TEST_FLAG_OFF", "0");
        assert!(!env_flag("LEXBRIDGE_TEST_FLAG_OFF"));
    }
}
