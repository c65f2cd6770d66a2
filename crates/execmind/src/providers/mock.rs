use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{FragmentStream, ModelOptions, Provider, Usage};

/// One scripted item of a streamed reply
#[derive(Debug, Clone)]
pub enum MockFragment {
    Text(String),
    Fail(String),
}

/// A mock provider that returns pre-configured completions and streams for testing
#[derive(Default)]
pub struct MockProvider {
    completions: Arc<Mutex<Vec<Result<Message, String>>>>,
    streams: Arc<Mutex<Vec<Vec<MockFragment>>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
    options: Arc<Mutex<Vec<ModelOptions>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a non-streaming completion
    pub fn with_completion(self, message: Message) -> Self {
        self.completions.lock().unwrap().push(Ok(message));
        self
    }

    /// Queue a non-streaming completion that fails with `reason`
    pub fn with_completion_error(self, reason: &str) -> Self {
        self.completions.lock().unwrap().push(Err(reason.to_string()));
        self
    }

    /// Queue a stream that yields the fragments and then ends normally
    pub fn with_stream(self, fragments: &[&str]) -> Self {
        let script = fragments
            .iter()
            .map(|text| MockFragment::Text(text.to_string()))
            .collect();
        self.with_script(script)
    }

    /// Queue a stream with an explicit script, e.g. one that fails part way
    pub fn with_script(self, script: Vec<MockFragment>) -> Self {
        self.streams.lock().unwrap().push(script);
        self
    }

    /// Every message list the provider was called with, in call order
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    /// The model options of every call, in call order
    pub fn options(&self) -> Vec<ModelOptions> {
        self.options.lock().unwrap().clone()
    }

    fn record(&self, messages: &[Message], options: &ModelOptions) {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.options.lock().unwrap().push(options.clone());
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[Tool],
        options: &ModelOptions,
    ) -> Result<(Message, Usage)> {
        self.record(messages, options);
        let mut completions = self.completions.lock().unwrap();
        if completions.is_empty() {
            // Return empty response if no more pre-configured responses
            return Ok((Message::assistant(), Usage::default()));
        }
        match completions.remove(0) {
            Ok(message) => Ok((message, Usage::default())),
            Err(reason) => Err(anyhow!(reason)),
        }
    }

    async fn stream(
        &self,
        messages: &[Message],
        options: &ModelOptions,
    ) -> Result<FragmentStream> {
        self.record(messages, options);
        let mut streams = self.streams.lock().unwrap();
        if streams.is_empty() {
            return Err(anyhow!("connection refused"));
        }
        let items: Vec<Result<String>> = streams
            .remove(0)
            .into_iter()
            .map(|fragment| match fragment {
                MockFragment::Text(text) => Ok(text),
                MockFragment::Fail(reason) => Err(anyhow!(reason)),
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }
}
