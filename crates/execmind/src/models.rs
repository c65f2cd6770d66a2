//! These models represent the objects passed between the chat page, the chat service
//! and the remote model.
//!
//! Messages are kept close to the OpenAI chat-completion wire format, since every
//! provider we talk to speaks it: a role tag, a plain string body, and the optional
//! tool-call fields. Conversion to the exact request JSON lives in `providers::utils`.
pub mod message;
pub mod role;
pub mod tool;
