use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use std::str::FromStr;

use crate::error::AdapterError;

// ============================================================================
// Responses API Request Models
// ============================================================================

/// Roles accepted in the Responses `input` array.
///
/// "system" does not exist here: top-level framing goes to `instructions` and
/// any further system framing is sent as "developer".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputRole {
    Developer,
    User,
    Assistant,
}

/// One role-tagged turn of the Responses `input` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: InputRole,
    pub content: String,
}

impl InputMessage {
    pub fn new(role: InputRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// `input` is either a bare string or an ordered list of turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsesInput {
    Text(String),
    Messages(Vec<InputMessage>),
}

impl ResponsesInput {
    /// Every turn must carry non-empty content.
    pub fn validate(&self) -> Result<(), AdapterError> {
        if let ResponsesInput::Messages(turns) = self {
            if let Some(pos) = turns.iter().position(|t| t.content.trim().is_empty()) {
                return Err(AdapterError::InvalidParameter(format!(
                    "input[{pos}] has empty content"
                )));
            }
        }
        Ok(())
    }
}

impl From<&str> for ResponsesInput {
    fn from(s: &str) -> Self {
        ResponsesInput::Text(s.to_string())
    }
}

impl From<String> for ResponsesInput {
    fn from(s: String) -> Self {
        ResponsesInput::Text(s)
    }
}

impl From<Vec<InputMessage>> for ResponsesInput {
    fn from(turns: Vec<InputMessage>) -> Self {
        ResponsesInput::Messages(turns)
    }
}

impl Default for ResponsesInput {
    fn default() -> Self {
        ResponsesInput::Text(String::new())
    }
}

/// Reasoning budget hint for reasoning-capable models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl FromStr for ReasoningEffort {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(AdapterError::InvalidParameter(format!(
                "unknown reasoning effort '{other}'"
            ))),
        }
    }
}

/// `reasoning` request field.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    #[serde(default)]
    pub effort: Option<ReasoningEffort>,
    /// e.g. "auto" | "concise" | "detailed"
    #[serde(default)]
    pub summary: Option<String>,
}

impl Reasoning {
    pub fn with_effort(effort: ReasoningEffort) -> Self {
        Self {
            effort: Some(effort),
            summary: None,
        }
    }
}

/// Tool definition variants accepted by the Responses API.
///
/// Responses function tools are flat: `{ "type": "function", "name": ..., "parameters": ... }`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDefinition {
    Function {
        name: String,
        #[serde(default)]
        description: Option<String>,
        /// JSON Schema object describing the function parameters.
        parameters: Value,
        #[serde(default)]
        strict: Option<bool>,
    },
}

/// `text.format` selector. Only `json_object` is produced by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub format: TextFormat,
}

impl TextConfig {
    pub fn json_object() -> Self {
        Self {
            format: TextFormat {
                kind: "json_object".to_string(),
            },
        }
    }
}

/// Caller-facing description of a generation request.
///
/// Every optional field stays unset unless the call-site sets it; the builder
/// never injects defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub input: ResponsesInput,
    pub instructions: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub json_mode: bool,
    pub stream: Option<bool>,
    pub store: Option<bool>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<Value>,
    pub reasoning: Option<Reasoning>,
}

impl RequestOptions {
    pub fn new(input: impl Into<ResponsesInput>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }
}

/// Wire-shaped Responses API request.
///
/// Built by [`crate::conversion::to_responses_request`]. Absent fields are
/// omitted on serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsesRequest {
    pub model: String,
    pub input: ResponsesInput,
    pub instructions: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub text: Option<TextConfig>,
    pub stream: Option<bool>,
    pub store: Option<bool>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub tool_choice: Option<Value>,
    pub reasoning: Option<Reasoning>,
}

impl ResponsesRequest {
    /// Render the request as the JSON object sent upstream.
    pub fn to_params(&self) -> Result<serde_json::Map<String, Value>, AdapterError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(AdapterError::InvalidParameter(
                "request did not serialize to an object".into(),
            )),
            Err(e) => Err(AdapterError::InvalidParameter(e.to_string())),
        }
    }
}

impl Serialize for ResponsesRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde_json::{Map, Number};

        let mut root = Map::new();

        root.insert("model".to_string(), Value::String(self.model.clone()));
        root.insert(
            "input".to_string(),
            serde_json::to_value(&self.input).map_err(serde::ser::Error::custom)?,
        );

        if let Some(instr) = self.instructions.as_ref() {
            root.insert("instructions".into(), Value::String(instr.clone()));
        }
        if let Some(v) = self.max_output_tokens {
            root.insert("max_output_tokens".into(), Value::Number(v.into()));
        }
        if let Some(v) = self.temperature {
            let num = Number::from_f64(v)
                .ok_or_else(|| serde::ser::Error::custom(format!("invalid temperature {v}")))?;
            root.insert("temperature".into(), Value::Number(num));
        }
        if let Some(text) = self.text.as_ref() {
            root.insert(
                "text".into(),
                serde_json::to_value(text).map_err(serde::ser::Error::custom)?,
            );
        }
        if let Some(s) = self.stream {
            root.insert("stream".into(), Value::Bool(s));
        }
        if let Some(s) = self.store {
            root.insert("store".into(), Value::Bool(s));
        }
        if let Some(tools) = self.tools.as_ref() {
            root.insert(
                "tools".into(),
                serde_json::to_value(tools).map_err(serde::ser::Error::custom)?,
            );
        }
        if let Some(tc) = self.tool_choice.as_ref() {
            root.insert("tool_choice".into(), tc.clone());
        }
        if let Some(r) = self.reasoning.as_ref() {
            root.insert(
                "reasoning".into(),
                serde_json::to_value(r).map_err(serde::ser::Error::custom)?,
            );
        }

        Value::Object(root).serialize(serializer)
    }
}

// ============================================================================
// Responses API Response Models
// ============================================================================

/// One entry of a message item's `content` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    OutputText {
        #[serde(default)]
        text: String,
    },
    Text {
        #[serde(default)]
        text: String,
    },
    /// refusal, annotations-only parts, anything newer
    #[serde(other)]
    Other,
}

impl ContentPart {
    fn into_text(self) -> Option<String> {
        match self {
            ContentPart::OutputText { text } | ContentPart::Text { text } if !text.is_empty() => {
                Some(text)
            }
            _ => None,
        }
    }
}

/// One entry of the structured `output` array.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    Message { content: Vec<ContentPart> },
    /// reasoning, function_call, web_search_call, ...
    Other,
}

impl OutputItem {
    /// Lenient per-item parse: a malformed part or item degrades to `Other`.
    pub fn from_value(v: &Value) -> Self {
        if v.get("type").and_then(Value::as_str) != Some("message") {
            return OutputItem::Other;
        }
        let content = v
            .get("content")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .map(|p| serde_json::from_value(p.clone()).unwrap_or(ContentPart::Other))
                    .collect()
            })
            .unwrap_or_default();
        OutputItem::Message { content }
    }
}

/// The two shapes a Responses payload can carry its text in.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponsePayload {
    /// Top-level `output_text` convenience field.
    Shortcut(String),
    /// `output` array of items.
    Structured(Vec<OutputItem>),
    /// Neither field present.
    Empty,
}

impl ResponsePayload {
    pub fn from_value(v: &Value) -> Self {
        if let Some(text) = v
            .get("output_text")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
        {
            return ResponsePayload::Shortcut(text.to_string());
        }
        match v.get("output").and_then(Value::as_array) {
            Some(items) => {
                ResponsePayload::Structured(items.iter().map(OutputItem::from_value).collect())
            }
            None => ResponsePayload::Empty,
        }
    }

    /// Text of the shortcut field, else of the first message item's first text part.
    pub fn into_text(self) -> Option<String> {
        match self {
            ResponsePayload::Shortcut(text) => Some(text),
            ResponsePayload::Structured(items) => items
                .into_iter()
                .find_map(|item| match item {
                    OutputItem::Message { content } => Some(content),
                    OutputItem::Other => None,
                })?
                .into_iter()
                .find_map(ContentPart::into_text),
            ResponsePayload::Empty => None,
        }
    }
}

/// Usage statistics in a Responses API response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsesUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl ResponsesUsage {
    pub fn from_payload(v: &Value) -> Option<Self> {
        v.get("usage")
            .and_then(|u| serde_json::from_value(u.clone()).ok())
    }
}
