//! Call-site adapters: one narrow orchestration per AI tool.
//!
//! Each adapter reads its model and prompt from the injected [`ConfigProvider`],
//! frames the user's input, calls the Responses API through whatever
//! [`ResponsesApi`] it was given (normally a [`crate::retry::Retrying`] client),
//! and hands the outcome to a [`ResultSink`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::client::ResponsesApi;
use crate::config_store::{model_setting, require_setting, ConfigProvider};
use crate::conversion::{convert_messages, to_responses_request};
use crate::error::AdapterError;
use crate::models::chat::ChatMessage;
use crate::models::responses::{Reasoning, ReasoningEffort};
use crate::sink::{ResultSink, ToolRecord};

/// Static description of a tool: which settings it reads and how it calls the model.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterSpec {
    pub name: String,
    pub model_key: String,
    pub prompt_key: String,
    /// Prompt tried once when the primary attempt yields no text.
    pub fallback_prompt_key: Option<String>,
    pub reasoning_key: Option<String>,
    pub json_mode: bool,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl AdapterSpec {
    /// Plain-text tool reading `<name>_model` and `<name>_prompt`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            model_key: format!("{name}_model"),
            prompt_key: format!("{name}_prompt"),
            fallback_prompt_key: None,
            reasoning_key: None,
            json_mode: false,
            max_output_tokens: None,
            temperature: None,
        }
    }

    /// Structured review of an uploaded document (JSON findings).
    pub fn document_analysis() -> Self {
        Self {
            fallback_prompt_key: Some("document_analysis_fallback_prompt".into()),
            reasoning_key: Some("document_analysis_reasoning_effort".into()),
            json_mode: true,
            max_output_tokens: Some(4000),
            ..Self::new("document_analysis")
        }
    }

    /// Free-text drafting of a document section.
    pub fn document_drafting() -> Self {
        Self {
            fallback_prompt_key: Some("document_drafting_fallback_prompt".into()),
            max_output_tokens: Some(6000),
            temperature: Some(0.4),
            ..Self::new("document_drafting")
        }
    }

    /// Grades a trainee answer against the reference (JSON verdict).
    pub fn training_validation() -> Self {
        Self {
            reasoning_key: Some("training_validation_reasoning_effort".into()),
            json_mode: true,
            max_output_tokens: Some(1500),
            ..Self::new("training_validation")
        }
    }
}

/// Replaces the configured reasoning effort on JSON-mode calls.
///
/// Some reasoning models spend the whole output budget deliberating when asked
/// for JSON. Off unless configured; never adds reasoning to a call that has none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReasoningOverride {
    pub json_mode_effort: Option<ReasoningEffort>,
}

impl ReasoningOverride {
    /// From `LEXBRIDGE_JSON_REASONING_OVERRIDE` (low|medium|high).
    pub fn from_env() -> Self {
        let json_mode_effort = std::env::var("LEXBRIDGE_JSON_REASONING_OVERRIDE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .and_then(|v| match v.parse() {
                Ok(effort) => Some(effort),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring LEXBRIDGE_JSON_REASONING_OVERRIDE");
                    None
                }
            });
        Self { json_mode_effort }
    }

    pub fn apply(
        &self,
        json_mode: bool,
        configured: Option<ReasoningEffort>,
    ) -> Option<ReasoningEffort> {
        match (json_mode, configured, self.json_mode_effort) {
            (true, Some(_), Some(forced)) => Some(forced),
            _ => configured,
        }
    }
}

/// Inbound tool request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInput {
    pub input: String,
    /// Extra framing (document excerpt, reference answer) sent as a developer turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ToolInput {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutput {
    pub text: String,
    pub model: String,
    #[serde(skip)]
    pub raw: Value,
}

pub struct ToolAdapter {
    spec: AdapterSpec,
    config: Arc<dyn ConfigProvider>,
    api: Arc<dyn ResponsesApi>,
    sink: Arc<dyn ResultSink>,
    reasoning_override: ReasoningOverride,
}

impl ToolAdapter {
    pub fn new(
        spec: AdapterSpec,
        config: Arc<dyn ConfigProvider>,
        api: Arc<dyn ResponsesApi>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            spec,
            config,
            api,
            sink,
            reasoning_override: ReasoningOverride::default(),
        }
    }

    pub fn with_reasoning_override(mut self, policy: ReasoningOverride) -> Self {
        self.reasoning_override = policy;
        self
    }

    /// The analysis, drafting and training-validation tools sharing one config, API and sink.
    pub fn standard_set(
        config: Arc<dyn ConfigProvider>,
        api: Arc<dyn ResponsesApi>,
        sink: Arc<dyn ResultSink>,
        reasoning_override: ReasoningOverride,
    ) -> Vec<ToolAdapter> {
        [
            AdapterSpec::document_analysis(),
            AdapterSpec::document_drafting(),
            AdapterSpec::training_validation(),
        ]
        .into_iter()
        .map(|spec| {
            ToolAdapter::new(spec, config.clone(), api.clone(), sink.clone())
                .with_reasoning_override(reasoning_override)
        })
        .collect()
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &AdapterSpec {
        &self.spec
    }

    pub async fn run(&self, req: &ToolInput) -> Result<ToolOutput, AdapterError> {
        if req.input.trim().is_empty() {
            return Err(AdapterError::InvalidParameter("input is empty".into()));
        }

        let model = model_setting(&*self.config, &self.spec.model_key).await;
        let instructions = require_setting(&*self.config, &self.spec.prompt_key).await?;
        let effort = self
            .reasoning_override
            .apply(self.spec.json_mode, self.configured_effort().await);

        let outcome = match self.attempt(&model, &instructions, req, effort).await {
            Err(AdapterError::NoOutputText) => self.retry_with_fallback(&model, req, effort).await,
            other => other,
        };

        if let Err(e) = &outcome {
            tracing::error!(tool = %self.spec.name, model = %model, error = %e, "tool call failed");
        }
        self.persist(&model, req, outcome.as_ref().ok()).await;
        outcome
    }

    async fn configured_effort(&self) -> Option<ReasoningEffort> {
        let key = self.spec.reasoning_key.as_deref()?;
        let raw = self.config.get(key).await.filter(|v| !v.trim().is_empty())?;
        match raw.parse() {
            Ok(effort) => Some(effort),
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring reasoning effort setting");
                None
            }
        }
    }

    async fn retry_with_fallback(
        &self,
        model: &str,
        req: &ToolInput,
        effort: Option<ReasoningEffort>,
    ) -> Result<ToolOutput, AdapterError> {
        let Some(key) = self.spec.fallback_prompt_key.as_deref() else {
            return Err(AdapterError::NoOutputText);
        };
        let Some(prompt) = self.config.get(key).await.filter(|v| !v.trim().is_empty()) else {
            return Err(AdapterError::NoOutputText);
        };
        tracing::warn!(tool = %self.spec.name, "no output text; trying fallback prompt");
        self.attempt(model, &prompt, req, effort).await
    }

    async fn attempt(
        &self,
        model: &str,
        instructions: &str,
        req: &ToolInput,
        effort: Option<ReasoningEffort>,
    ) -> Result<ToolOutput, AdapterError> {
        let mut messages = vec![ChatMessage::system(instructions)];
        if let Some(ctx) = req.context.as_deref().filter(|c| !c.trim().is_empty()) {
            messages.push(ChatMessage::system(ctx));
        }
        messages.push(ChatMessage::user(req.input.as_str()));

        let mut opts = convert_messages(&messages).into_options();
        opts.max_output_tokens = self.spec.max_output_tokens;
        opts.temperature = self.spec.temperature;
        opts.json_mode = self.spec.json_mode;
        opts.reasoning = effort.map(Reasoning::with_effort);
        opts.input.validate()?;

        let params = to_responses_request(model, &opts).to_params()?;
        let success = self.api.create(&params).await.into_result()?;
        let text = success.text.ok_or(AdapterError::NoOutputText)?;

        if self.spec.json_mode {
            serde_json::from_str::<Value>(&text)
                .map_err(|e| AdapterError::MalformedJson(e.to_string()))?;
        }

        Ok(ToolOutput {
            text,
            model: model.to_string(),
            raw: success.raw,
        })
    }

    async fn persist(&self, model: &str, req: &ToolInput, output: Option<&ToolOutput>) {
        let record = ToolRecord::new(
            self.spec.name.as_str(),
            model,
            req.input.as_str(),
            output.map(|o| o.text.clone()),
        );
        if let Err(e) = self.sink.insert(record).await {
            tracing::warn!(tool = %self.spec.name, error = %e, "failed to persist tool result");
        }
    }
}
