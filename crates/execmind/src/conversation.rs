//! The message sequence a chat window owns.
//!
//! Prior entries are never edited. The one exception is the pending assistant
//! placeholder: it sits at the tail while a reply streams in, grows fragment by
//! fragment, and is either finished in place or dropped on failure.
use crate::chat::{ChatResponse, StreamHandler};
use crate::models::message::Message;
use crate::models::role::Role;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
    pending: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            pending: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// The placeholder currently receiving fragments, if a reply is streaming
    pub fn pending_message(&self) -> Option<&Message> {
        if self.pending {
            self.messages.last()
        } else {
            None
        }
    }

    /// Append messages and return the resulting sequence.
    ///
    /// While a reply is streaming the new messages go in front of the
    /// placeholder so it stays last.
    pub fn append<I>(&mut self, messages: I) -> &[Message]
    where
        I: IntoIterator<Item = Message>,
    {
        if self.pending {
            let placeholder = self.messages.pop();
            self.messages.extend(messages);
            self.messages.extend(placeholder);
        } else {
            self.messages.extend(messages);
        }
        &self.messages
    }

    pub fn push_user<S: AsRef<str>>(&mut self, text: S) {
        self.append([Message::user().with_text(text)]);
    }

    /// Add the empty assistant message that streamed fragments accumulate into
    pub fn begin_assistant(&mut self) {
        if self.pending {
            tracing::warn!("reply already streaming, keeping the existing placeholder");
            return;
        }
        self.messages.push(Message::assistant());
        self.pending = true;
    }

    /// Concatenate a fragment onto the pending placeholder. Returns false, leaving the
    /// sequence untouched, when there is no pending assistant message at the tail.
    pub fn append_fragment(&mut self, fragment: &str) -> bool {
        match self.messages.last_mut() {
            Some(last) if self.pending && last.role == Role::Assistant => {
                last.content.push_str(fragment);
                true
            }
            _ => {
                tracing::debug!("dropping fragment with no pending assistant message");
                false
            }
        }
    }

    /// Keep the placeholder as a regular message
    pub fn finish_assistant(&mut self) -> Option<&Message> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        self.messages.last()
    }

    /// Remove the placeholder, whatever it has accumulated so far
    pub fn discard_pending(&mut self) -> Option<Message> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        self.messages.pop()
    }

    /// The sequence to send to the model: everything except the pending placeholder
    pub fn request_messages(&self) -> Vec<Message> {
        let end = if self.pending {
            self.messages.len() - 1
        } else {
            self.messages.len()
        };
        self.messages[..end].to_vec()
    }
}

type FragmentObserver<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Routes a streamed reply into a conversation: fragments grow the placeholder,
/// completion keeps it, and failure removes it.
pub struct ConversationHandler<'a> {
    conversation: &'a mut Conversation,
    observer: Option<FragmentObserver<'a>>,
}

impl<'a> ConversationHandler<'a> {
    pub fn new(conversation: &'a mut Conversation) -> Self {
        Self {
            conversation,
            observer: None,
        }
    }

    /// Also hand every fragment to `observer`, e.g. to render it as it arrives
    pub fn observe<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&str) + Send + 'a,
    {
        self.observer = Some(Box::new(observer));
        self
    }
}

impl StreamHandler for ConversationHandler<'_> {
    fn on_fragment(&mut self, fragment: &str) {
        if self.conversation.append_fragment(fragment) {
            if let Some(observer) = self.observer.as_mut() {
                observer(fragment);
            }
        }
    }

    fn on_tool_round(&mut self, messages: &[Message]) {
        self.conversation.append(messages.iter().cloned());
    }

    fn on_complete(&mut self, _response: &ChatResponse) {
        self.conversation.finish_assistant();
    }

    fn on_error(&mut self, error: &anyhow::Error) -> bool {
        tracing::debug!("discarding pending reply: {}", error);
        self.conversation.discard_pending();
        true
    }
}
