use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Per-request overrides. Anything left unset falls back to the provider's config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// Text fragments of a streaming completion, in the order the transport delivered them
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Base trait for chat-completion providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message in one round trip, offering the given tools
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
        options: &ModelOptions,
    ) -> Result<(Message, Usage)>;

    /// Start a streaming completion and return its text fragments
    async fn stream(&self, messages: &[Message], options: &ModelOptions)
        -> Result<FragmentStream>;
}
