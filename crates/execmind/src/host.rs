//! The privileged operations a page may ask of the host shell.
//!
//! Chat logic depends only on this trait, never on the shell that implements it,
//! so pages run the same against the real desktop host and against test doubles.
use serde::{Deserialize, Serialize};

/// Outcome of a screen capture. Capture never fails across the boundary; failures
/// come back with `success: false` and a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    pub message: String,
}

impl CaptureResult {
    pub fn saved<S: Into<String>>(file_path: S) -> Self {
        Self {
            success: true,
            file_path: Some(file_path.into()),
            message: "Screenshot saved".to_string(),
        }
    }

    pub fn failed<S: AsRef<str>>(reason: S) -> Self {
        Self {
            success: false,
            file_path: None,
            message: format!("Screenshot failed: {}", reason.as_ref()),
        }
    }
}

pub trait HostBridge: Send + Sync {
    /// Ask the host to open a secondary window showing the named page. Fire-and-forget.
    fn open_window(&self, page: &str);

    /// Read a configuration value from the host environment
    fn get_env(&self, key: &str) -> Option<String>;

    /// Capture the primary screen to an image file
    fn capture_screen(&self) -> CaptureResult;
}
