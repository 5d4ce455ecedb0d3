use crate::models::chat::{ChatMessage, Role};
use crate::models::responses::{
    InputMessage, InputRole, RequestOptions, ResponsesInput, ResponsesRequest, TextConfig,
};

/// Result of splitting a three-role message list into the Responses two-tier shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvertedMessages {
    /// Content of the first system turn, if any.
    pub instructions: Option<String>,
    pub input: Vec<InputMessage>,
}

impl ConvertedMessages {
    /// Seed a `RequestOptions` with the converted input and instructions.
    pub fn into_options(self) -> RequestOptions {
        RequestOptions {
            input: ResponsesInput::Messages(self.input),
            instructions: self.instructions,
            ..Default::default()
        }
    }
}

/// Convert system/user/assistant turns into `instructions` + `input`.
///
/// Mapping:
/// - the first system turn becomes `instructions`;
/// - every later system turn stays in place as a "developer" turn;
/// - user and assistant turns are copied unchanged.
pub fn convert_messages(messages: &[ChatMessage]) -> ConvertedMessages {
    let mut out = ConvertedMessages {
        instructions: None,
        input: Vec::with_capacity(messages.len()),
    };

    for m in messages {
        let role = match m.role {
            Role::System if out.instructions.is_none() => {
                out.instructions = Some(m.content.clone());
                continue;
            }
            Role::System => InputRole::Developer,
            Role::User => InputRole::User,
            Role::Assistant => InputRole::Assistant,
        };
        out.input.push(InputMessage::new(role, m.content.clone()));
    }

    out
}

/// Map generic request options onto the Responses wire request.
///
/// Mapping highlights:
/// - input: forwarded unchanged (string or turn list).
/// - instructions: only when non-empty.
/// - max_output_tokens / temperature / stream / store / reasoning: only when set.
/// - json_mode: `text.format.type = "json_object"`.
/// - tools and tool_choice: only when the tool list is non-empty.
pub fn to_responses_request(model: &str, opts: &RequestOptions) -> ResponsesRequest {
    let has_tools = !opts.tools.is_empty();

    ResponsesRequest {
        model: model.to_string(),
        input: opts.input.clone(),
        instructions: opts.instructions.clone().filter(|s| !s.is_empty()),
        max_output_tokens: opts.max_output_tokens,
        temperature: opts.temperature,
        text: opts.json_mode.then(TextConfig::json_object),
        stream: opts.stream,
        store: opts.store,
        tools: has_tools.then(|| opts.tools.clone()),
        tool_choice: if has_tools {
            opts.tool_choice.clone()
        } else {
            None
        },
        reasoning: opts.reasoning.clone(),
    }
}

/// Build the JSON parameter map for a chat-style message list in one step.
pub fn chat_to_params(
    model: &str,
    messages: &[ChatMessage],
    max_output_tokens: Option<u32>,
) -> crate::error::Result<serde_json::Map<String, serde_json::Value>> {
    let mut opts = convert_messages(messages).into_options();
    opts.max_output_tokens = max_output_tokens;
    to_responses_request(model, &opts).to_params()
}
