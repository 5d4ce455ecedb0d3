#![forbid(unsafe_code)]
#![doc = r#"
Lexbridge

Call-site adapters for the legal drafting and review tools, built on a thin layer over
OpenAI's Responses API.

Crate highlights
- Library: pure request building via `to_responses_request(model, &RequestOptions)` and
  message conversion via `convert_messages(&[ChatMessage])`.
- Output text extraction that prefers `output_text` and falls back to the `output` array.
- An HTTP caller returning a discriminated `ApiResult`, plus a retry-on-rate-limit decorator.
- HTTP server (in `server`): `/status`, `/convert`, `/tools/:name`.

Modules
- `models`: Chat-style turns and Responses request/response shapes.
- `conversion`: Message converter and request parameter builder.
- `extract`: Output text extractor.
- `client`: HTTP caller (`ResponsesApi`, `ResponsesClient`).
- `retry`: Backoff policy and `Retrying` decorator.
- `config_store`: Injected configuration providers.
- `sink`: Result persistence.
- `adapters`: Per-tool orchestration.
- `server` / `util`: Axum router, env, tracing.
"#]

pub mod adapters;
pub mod client;
pub mod config_store;
pub mod conversion;
pub mod error;
pub mod extract;
pub mod models;
pub mod retry;
pub mod server;
pub mod sink;
pub mod util;

pub use crate::adapters::{AdapterSpec, ReasoningOverride, ToolAdapter, ToolInput, ToolOutput};
pub use crate::client::{ApiResult, ResponsesApi, ResponsesClient};
pub use crate::config_store::{ConfigProvider, DEFAULT_MODEL};
pub use crate::conversion::{convert_messages, to_responses_request};
pub use crate::error::AdapterError;
pub use crate::extract::extract_output_text;
pub use crate::retry::{RetryPolicy, Retrying};

// Re-export model namespaces for convenience (downstream users can do `use lexbridge::chat`).
pub use crate::models::{chat, responses};
