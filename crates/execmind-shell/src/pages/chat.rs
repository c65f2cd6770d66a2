use anyhow::{anyhow, Result};
use execmind::chat::{ChatRequest, ChatResponse, ChatService, StreamHandler};
use execmind::conversation::{Conversation, ConversationHandler};
use execmind::host::HostBridge;
use execmind::models::message::Message;
use execmind::models::role::Role;
use execmind::providers::openai::OpenAiProvider;

use crate::configuration::ChatSettings;
use crate::prompt::{InputType, Prompt};

pub const SEND_FAILED: &str = "Failed to send message, please retry";

pub struct ChatPage<'a> {
    bridge: &'a dyn HostBridge,
    service: ChatService,
    conversation: Conversation,
    use_tools: bool,
}

/// Feeds the conversation and remembers whether the exchange failed
struct ReplyHandler<'a> {
    conversation: ConversationHandler<'a>,
    failed: bool,
}

impl StreamHandler for ReplyHandler<'_> {
    fn on_fragment(&mut self, fragment: &str) {
        self.conversation.on_fragment(fragment);
    }

    fn on_tool_round(&mut self, messages: &[Message]) {
        self.conversation.on_tool_round(messages);
    }

    fn on_complete(&mut self, response: &ChatResponse) {
        self.conversation.on_complete(response);
    }

    fn on_error(&mut self, error: &anyhow::Error) -> bool {
        self.failed = true;
        self.conversation.on_error(error)
    }
}

impl<'a> ChatPage<'a> {
    /// Build a chat page talking to the configured provider. The API key is read
    /// through the host bridge.
    pub fn connect(bridge: &'a dyn HostBridge, settings: &ChatSettings) -> Result<Self> {
        let api_key = bridge
            .get_env(&settings.api_key_var)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("{} is not set", settings.api_key_var))?;

        let provider = OpenAiProvider::new(settings.provider_config(api_key))?;
        let service = ChatService::new(Box::new(provider), settings.chat_config());
        Ok(Self::new(bridge, service, settings.tools))
    }

    pub fn new(bridge: &'a dyn HostBridge, service: ChatService, use_tools: bool) -> Self {
        Self {
            bridge,
            service,
            conversation: Conversation::new(),
            use_tools,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub async fn run(&mut self, initial_query: Option<&str>, prompt: &mut dyn Prompt) -> Result<()> {
        prompt.title("Chat");

        if let Some(query) = initial_query {
            prompt.info(query);
            self.send_message(query, prompt).await?;
        }

        loop {
            let input = prompt.get_input("Message:")?;
            match input.input_type {
                InputType::Exit => return Ok(()),
                InputType::AskAgain => continue,
                InputType::Screenshot => {
                    let result = self.bridge.capture_screen();
                    match (result.success, result.file_path) {
                        (true, Some(path)) => prompt.info(&format!("{}: {}", result.message, path)),
                        _ => prompt.error(&result.message),
                    }
                }
                InputType::OpenWindow => {
                    if let Some(page) = input.content {
                        self.bridge.open_window(&page);
                        prompt.info(&format!("Opening {} when this window closes", page));
                    }
                }
                InputType::Message => {
                    if let Some(content) = input.content {
                        self.send_message(&content, prompt).await?;
                    }
                }
            }
        }
    }

    /// Send one user message and stream the reply into the conversation. A failed
    /// exchange leaves no trace of the reply and shows a retry notice.
    pub async fn send_message(&mut self, content: &str, prompt: &mut dyn Prompt) -> Result<()> {
        if content.trim().is_empty() {
            return Ok(());
        }

        self.conversation.push_user(content);
        self.conversation.begin_assistant();
        let request = ChatRequest::new(self.conversation.request_messages());

        let failed = {
            let mut handler = ReplyHandler {
                conversation: ConversationHandler::new(&mut self.conversation)
                    .observe(|fragment| prompt.render_fragment(fragment)),
                failed: false,
            };
            if self.use_tools {
                self.service.send_with_tools(request, &mut handler).await?;
            } else {
                self.service
                    .send_stream_message(request, &mut handler)
                    .await?;
            }
            handler.failed
        };

        prompt.end_reply();
        if failed {
            prompt.error(SEND_FAILED);
        } else if let Some(last) = self.conversation.messages().last() {
            if last.role == Role::Assistant && last.content.is_empty() {
                prompt.info("(empty reply)");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use execmind::chat::ChatConfig;
    use execmind::host::CaptureResult;
    use execmind::models::tool::{Tool, ToolCall};
    use execmind::providers::base::{FragmentStream, ModelOptions, Provider, Usage};
    use std::sync::Mutex;

    use crate::prompt::ScriptedPrompt;

    #[derive(Default)]
    struct FakeBridge {
        opened: Mutex<Vec<String>>,
    }

    impl HostBridge for FakeBridge {
        fn open_window(&self, page: &str) {
            self.opened.lock().unwrap().push(page.to_string());
        }

        fn get_env(&self, key: &str) -> Option<String> {
            (key == "DEEPSEEK_API_KEY").then(|| "sk-test".to_string())
        }

        fn capture_screen(&self) -> CaptureResult {
            CaptureResult::saved("/tmp/screenshot-1.png")
        }
    }

    /// Streams canned replies; a `None` reply fails after its first fragment
    struct CannedProvider {
        replies: Mutex<Vec<Option<Vec<&'static str>>>>,
        tool_call: Option<ToolCall>,
    }

    impl CannedProvider {
        fn new(replies: Vec<Option<Vec<&'static str>>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                tool_call: None,
            }
        }
    }

    #[async_trait]
    impl Provider for CannedProvider {
        async fn complete(
            &self,
            _messages: &[Message],
            _tools: &[Tool],
            _options: &ModelOptions,
        ) -> Result<(Message, Usage)> {
            let mut message = Message::assistant();
            if let Some(call) = &self.tool_call {
                message = message.with_tool_call(call.clone());
            }
            Ok((message, Usage::default()))
        }

        async fn stream(
            &self,
            _messages: &[Message],
            _options: &ModelOptions,
        ) -> Result<FragmentStream> {
            let reply = self.replies.lock().unwrap().remove(0);
            let items: Vec<Result<String>> = match reply {
                Some(fragments) => fragments.into_iter().map(|f| Ok(f.to_string())).collect(),
                None => vec![Ok("Hel".to_string()), Err(anyhow!("connection reset"))],
            };
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    fn page(bridge: &FakeBridge, provider: CannedProvider, use_tools: bool) -> ChatPage<'_> {
        let service = ChatService::new(Box::new(provider), ChatConfig::default());
        ChatPage::new(bridge, service, use_tools)
    }

    #[tokio::test]
    async fn test_initial_query_streams_reply() -> Result<()> {
        let bridge = FakeBridge::default();
        let mut page = page(
            &bridge,
            CannedProvider::new(vec![Some(vec!["Hel", "lo!"])]),
            false,
        );
        let mut prompt = ScriptedPrompt::new(&["/exit"]);

        page.run(Some("hi"), &mut prompt).await?;

        let messages = page.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Hello!");
        assert!(prompt.output.contains("Hello!"));
        assert!(prompt.errors.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_discards_reply_and_shows_notice() -> Result<()> {
        let bridge = FakeBridge::default();
        let mut page = page(
            &bridge,
            CannedProvider::new(vec![Some(vec!["first"]), None]),
            false,
        );
        let mut prompt = ScriptedPrompt::new(&["one", "two"]);

        page.run(None, &mut prompt).await?;

        let messages = page.conversation().messages();
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(messages[1].content, "first");
        assert_eq!(prompt.errors, vec![SEND_FAILED.to_string()]);
        assert!(!page.conversation().is_pending());
        Ok(())
    }

    #[tokio::test]
    async fn test_commands_go_through_bridge() -> Result<()> {
        let bridge = FakeBridge::default();
        let mut page = page(&bridge, CannedProvider::new(vec![]), false);
        let mut prompt = ScriptedPrompt::new(&["/screenshot", "/open about", "/exit"]);

        page.run(None, &mut prompt).await?;

        assert_eq!(*bridge.opened.lock().unwrap(), vec!["about".to_string()]);
        assert!(prompt.infos[0].ends_with("/tmp/screenshot-1.png"));
        assert!(page.conversation().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_tool_round_recorded_before_answer() -> Result<()> {
        let bridge = FakeBridge::default();
        let mut provider = CannedProvider::new(vec![Some(vec!["It is sunny."])]);
        provider.tool_call = Some(ToolCall::new(
            "call_1",
            "get_weather",
            r#"{"location":"Paris"}"#,
        ));
        let mut page = page(&bridge, provider, true);
        let mut prompt = ScriptedPrompt::new(&[]);

        page.send_message("weather in Paris?", &mut prompt).await?;

        let roles: Vec<Role> = page
            .conversation()
            .messages()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::Tool, Role::Assistant]
        );
        assert_eq!(
            page.conversation().messages()[3].content,
            "It is sunny."
        );
        Ok(())
    }

    #[test]
    fn test_connect_requires_api_key() {
        struct NoKey;
        impl HostBridge for NoKey {
            fn open_window(&self, _page: &str) {}
            fn get_env(&self, _key: &str) -> Option<String> {
                None
            }
            fn capture_screen(&self) -> CaptureResult {
                CaptureResult::failed("unsupported")
            }
        }

        let err = ChatPage::connect(&NoKey, &ChatSettings::default())
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "DEEPSEEK_API_KEY is not set");

        assert!(ChatPage::connect(&FakeBridge::default(), &ChatSettings::default()).is_ok());
    }
}
