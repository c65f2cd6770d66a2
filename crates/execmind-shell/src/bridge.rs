use execmind::host::{CaptureResult, HostBridge};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::capture::{capture_screen, ScreenSource, XcapScreen};

/// The host side of the page boundary. Window requests are queued for the shell
/// loop; configuration comes from the process environment.
pub struct DesktopBridge {
    window_requests: mpsc::UnboundedSender<String>,
    screen: Box<dyn ScreenSource>,
    capture_dir: PathBuf,
}

impl DesktopBridge {
    pub fn new(window_requests: mpsc::UnboundedSender<String>) -> Self {
        Self {
            window_requests,
            screen: Box::new(XcapScreen),
            capture_dir: std::env::temp_dir(),
        }
    }

    pub fn with_screen(mut self, screen: Box<dyn ScreenSource>, capture_dir: PathBuf) -> Self {
        self.screen = screen;
        self.capture_dir = capture_dir;
        self
    }
}

impl HostBridge for DesktopBridge {
    fn open_window(&self, page: &str) {
        if self.window_requests.send(page.to_string()).is_err() {
            tracing::warn!(page, "shell is shutting down, window request dropped");
        }
    }

    fn get_env(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn capture_screen(&self) -> CaptureResult {
        capture_screen(self.screen.as_ref(), &self.capture_dir)
    }
}
