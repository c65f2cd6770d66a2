use anyhow::{anyhow, Result};
use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Value};

use super::base::{FragmentStream, ModelOptions, Provider, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{
    check_openai_context_length_error, messages_to_openai_spec, openai_response_to_message,
    stream_chunk_text, tools_to_openai_spec,
};
use crate::models::message::Message;
use crate::models::tool::Tool;

const STREAM_DONE: &str = "[DONE]";

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self> {
        // No request timeout: a streamed answer takes as long as the model needs
        let client = Client::builder().build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OpenAiProviderConfig {
        &self.config
    }

    fn get_usage(data: &Value) -> Usage {
        let Some(usage) = data.get("usage") else {
            return Usage::default();
        };

        let input_tokens = usage
            .get("prompt_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = usage
            .get("completion_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = usage
            .get("total_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
            .or_else(|| match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            });

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    fn build_payload(
        &self,
        messages: &[Message],
        tools: &[Tool],
        options: &ModelOptions,
        stream: bool,
    ) -> Result<Value> {
        let model = options.model.as_deref().unwrap_or(&self.config.model);
        let mut payload = json!({
            "model": model,
            "messages": messages_to_openai_spec(messages),
            "stream": stream,
        });
        let fields = payload
            .as_object_mut()
            .ok_or_else(|| anyhow!("payload is not an object"))?;

        if !tools.is_empty() {
            fields.insert("tools".to_string(), json!(tools_to_openai_spec(tools)?));
            fields.insert("tool_choice".to_string(), json!("auto"));
        }
        if let Some(temp) = options.temperature.or(self.config.temperature) {
            fields.insert("temperature".to_string(), json!(temp));
        }

        Ok(payload)
    }

    async fn post(&self, payload: &Value) -> Result<Response> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );
        tracing::debug!(%url, "posting chat completion");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response),
            status => {
                let body = response.text().await.unwrap_or_default();
                if let Ok(Value::Object(error_body)) = serde_json::from_str::<Value>(&body) {
                    if let Some(err) = error_body
                        .get("error")
                        .and_then(check_openai_context_length_error)
                    {
                        return Err(err.into());
                    }
                }
                Err(anyhow!("Request failed: {}\nBody: {}", status, body))
            }
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[Tool],
        options: &ModelOptions,
    ) -> Result<(Message, Usage)> {
        let payload = self.build_payload(messages, tools, options, false)?;
        let response: Value = self.post(&payload).await?.json().await?;

        // Some compatible servers answer 200 with an error body
        if let Some(error) = response.get("error") {
            if let Some(err) = check_openai_context_length_error(error) {
                return Err(err.into());
            }
            return Err(anyhow!("OpenAI API error: {}", error));
        }

        let message = openai_response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }

    async fn stream(
        &self,
        messages: &[Message],
        options: &ModelOptions,
    ) -> Result<FragmentStream> {
        let payload = self.build_payload(messages, &[], options, true)?;
        let response = self.post(&payload).await?;
        let mut events = Box::pin(response.bytes_stream().eventsource());

        Ok(Box::pin(async_stream::try_stream! {
            while let Some(event) = events.next().await {
                let event = event.map_err(|e| anyhow!("Stream error: {}", e))?;
                if event.data == STREAM_DONE {
                    break;
                }
                if let Some(text) = stream_chunk_text(&event.data)? {
                    yield text;
                }
            }
        }))
    }
}
