//! What a window shows. Each page drives its own input loop through a [`Prompt`]
//! and reaches the host only through [`execmind::host::HostBridge`].
//!
//! [`Prompt`]: crate::prompt::Prompt
pub mod about;
pub mod chat;
pub mod home;
