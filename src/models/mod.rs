//! Data models for both sides of the adapter.
//!
//! This module groups two submodules:
//! - `chat`: the legacy three-role message turns call-sites compose prompts with.
//! - `responses`: request and response shapes of the OpenAI Responses API.
//!
//! Mapping from `chat::ChatMessage` lists to `responses::RequestOptions` and then
//! to `responses::ResponsesRequest` lives in `crate::conversion`.

pub mod chat;
pub mod responses;

pub use chat::{ChatMessage, Role};
pub use responses::{
    ContentPart, InputMessage, InputRole, OutputItem, Reasoning, ReasoningEffort,
    RequestOptions, ResponsePayload, ResponsesInput, ResponsesRequest, ResponsesUsage,
    TextConfig, ToolDefinition,
};
