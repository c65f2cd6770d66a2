use anyhow::Result;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::role::Role;
use crate::models::tool::ToolCall;
use crate::providers::base::{ModelOptions, Provider, Usage};
use crate::providers::configs::DEEPSEEK_MODEL;
use crate::tools::{execute_tool_call, registry};

pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "The user will ask you questions. Answer the question directly without any further explanation.";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub system_message: String,
    pub temperature: Option<f32>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEEPSEEK_MODEL.to_string(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: Message,
    pub usage: Option<Usage>,
}

/// What the model asked for when offered the builtin tools
#[derive(Debug, Clone)]
pub struct ToolDetection {
    pub assistant_message: Message,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
}

/// Receives the events of one streamed exchange
pub trait StreamHandler: Send {
    /// A non-empty text fragment, in transport order
    fn on_fragment(&mut self, fragment: &str);

    /// Messages added by a tool round, before the final answer starts streaming
    fn on_tool_round(&mut self, _messages: &[Message]) {}

    /// The stream ended normally; fires once per exchange
    fn on_complete(&mut self, _response: &ChatResponse) {}

    /// The exchange failed. Return true if handled; unhandled errors are returned
    /// to the caller.
    fn on_error(&mut self, _error: &anyhow::Error) -> bool {
        false
    }
}

/// Chat client for an OpenAI-compatible model.
///
/// Each exchange runs to completion or failure; there is no retry and no
/// cancellation.
pub struct ChatService {
    provider: Box<dyn Provider>,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(provider: Box<dyn Provider>, config: ChatConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Prepend the configured system prompt unless the sequence already has one
    pub fn messages_with_system(&self, messages: &[Message]) -> Vec<Message> {
        if messages.iter().any(|message| message.is_role(Role::System)) {
            return messages.to_vec();
        }

        let mut with_system = Vec::with_capacity(messages.len() + 1);
        with_system.push(Message::system().with_text(&self.config.system_message));
        with_system.extend_from_slice(messages);
        with_system
    }

    fn options(&self, request: &ChatRequest) -> ModelOptions {
        ModelOptions {
            model: Some(
                request
                    .model
                    .clone()
                    .unwrap_or_else(|| self.config.model.clone()),
            ),
            temperature: request.temperature.or(self.config.temperature),
        }
    }

    /// Stream a reply, delivering each fragment to `handler` as it arrives.
    ///
    /// On failure `handler.on_error` decides whether the error is swallowed or
    /// returned.
    pub async fn send_stream_message(
        &self,
        request: ChatRequest,
        handler: &mut dyn StreamHandler,
    ) -> Result<()> {
        match self.stream_reply(&request, handler).await {
            Ok(response) => {
                handler.on_complete(&response);
                Ok(())
            }
            Err(e) => self.fail(handler, e),
        }
    }

    async fn stream_reply(
        &self,
        request: &ChatRequest,
        handler: &mut dyn StreamHandler,
    ) -> Result<ChatResponse> {
        let messages = self.messages_with_system(&request.messages);
        let options = self.options(request);
        tracing::debug!(
            model = ?options.model,
            messages = messages.len(),
            "starting streamed reply"
        );

        let mut stream = self.provider.stream(&messages, &options).await?;
        let mut full_content = String::new();

        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            if fragment.is_empty() {
                continue;
            }
            tracing::trace!(fragment = %fragment, "received fragment");
            full_content.push_str(&fragment);
            handler.on_fragment(&fragment);
        }

        Ok(ChatResponse {
            message: Message::assistant().with_text(full_content),
            usage: None,
        })
    }

    fn fail(&self, handler: &mut dyn StreamHandler, error: anyhow::Error) -> Result<()> {
        tracing::error!("streamed chat request failed: {:#}", error);
        if handler.on_error(&error) {
            Ok(())
        } else {
            Err(error)
        }
    }

    /// Ask the model, with the builtin tools attached, whether it wants any of them run
    pub async fn detect_tool_calls(&self, messages: &[Message]) -> Result<ToolDetection> {
        self.detect_with_options(messages, &self.options(&ChatRequest::default()))
            .await
    }

    async fn detect_with_options(
        &self,
        messages: &[Message],
        options: &ModelOptions,
    ) -> Result<ToolDetection> {
        let (assistant_message, usage) = self
            .provider
            .complete(messages, &registry(), options)
            .await?;

        let tool_calls = assistant_message.tool_calls.clone();
        tracing::debug!(count = tool_calls.len(), "tool detection finished");

        Ok(ToolDetection {
            assistant_message,
            tool_calls,
            usage,
        })
    }

    /// Run one tool call against the builtin tools; never fails
    pub fn execute_tool_call(&self, call: &ToolCall) -> serde_json::Value {
        execute_tool_call(call)
    }

    /// One fixed-depth tool round followed by the streamed answer.
    ///
    /// If the model requests tools, its tool-call message and one tool message per
    /// call (in call order) are handed to `handler.on_tool_round` and sent along
    /// with the streaming request. A failing call only affects its own result.
    pub async fn send_with_tools(
        &self,
        request: ChatRequest,
        handler: &mut dyn StreamHandler,
    ) -> Result<()> {
        let mut messages = self.messages_with_system(&request.messages);

        let options = self.options(&request);
        let detection = match self.detect_with_options(&messages, &options).await {
            Ok(detection) => detection,
            Err(e) => return self.fail(handler, e),
        };

        if !detection.tool_calls.is_empty() {
            let mut round = Vec::with_capacity(detection.tool_calls.len() + 1);
            round.push(detection.assistant_message);
            for call in &detection.tool_calls {
                tracing::info!(tool = %call.name, id = %call.id, "executing tool call");
                let result = self.execute_tool_call(call);
                round.push(Message::tool(&call.id).with_text(result.to_string()));
            }

            handler.on_tool_round(&round);
            messages.extend(round);
        }

        self.send_stream_message(ChatRequest { messages, ..request }, handler)
            .await
    }
}
