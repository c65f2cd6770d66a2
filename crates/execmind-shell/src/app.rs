use anyhow::Result;
use std::collections::VecDeque;
use tokio::sync::mpsc;

use crate::bridge::DesktopBridge;
use crate::configuration::Settings;
use crate::pages::about::AboutPage;
use crate::pages::chat::ChatPage;
use crate::pages::home::HomePage;
use crate::prompt::Prompt;
use crate::window::{CreateWindowOptions, Route, WindowManager};

/// The host process. Owns the windows and the bridge handed to pages, and shows
/// one window at a time in the terminal.
pub struct Shell {
    settings: Settings,
    windows: WindowManager,
    bridge: DesktopBridge,
    requests: mpsc::UnboundedReceiver<String>,
}

impl Shell {
    pub fn new(settings: Settings) -> Self {
        let (tx, requests) = mpsc::unbounded_channel();
        Self::with_bridge(settings, DesktopBridge::new(tx), requests)
    }

    pub fn with_bridge(
        settings: Settings,
        bridge: DesktopBridge,
        requests: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        Self {
            windows: WindowManager::new(settings.window),
            settings,
            bridge,
            requests,
        }
    }

    pub fn windows(&self) -> &WindowManager {
        &self.windows
    }

    /// Open the main window at `start_page` (home when absent) and keep showing
    /// windows until none are left. Windows requested by a page open once the
    /// current one closes.
    pub async fn run(&mut self, start_page: Option<&str>, prompt: &mut dyn Prompt) -> Result<()> {
        let main = self.windows.create_window(CreateWindowOptions {
            page: start_page.map(str::to_string),
            ..Default::default()
        });

        let mut queue = VecDeque::from([main.id]);
        while let Some(id) = queue.pop_front() {
            self.show(id, prompt).await?;
            self.windows.close(id);

            while let Ok(page) = self.requests.try_recv() {
                queue.push_back(self.windows.open_secondary(&page).id);
            }
        }

        tracing::info!("all windows closed");
        Ok(())
    }

    async fn show(&mut self, id: u32, prompt: &mut dyn Prompt) -> Result<()> {
        loop {
            let Some(window) = self.windows.get(id) else {
                return Ok(());
            };

            match window.route.clone() {
                Route::Home => match HomePage.run(prompt)? {
                    Some(route) => {
                        self.windows.navigate(id, route);
                    }
                    None => return Ok(()),
                },
                Route::About => return AboutPage.run(prompt),
                Route::Chat { query } => {
                    match ChatPage::connect(&self.bridge, &self.settings.chat) {
                        Ok(mut page) => page.run(query.as_deref(), prompt).await?,
                        Err(e) => {
                            tracing::error!("could not start chat: {:#}", e);
                            prompt.error(&format!("Chat is unavailable: {}", e));
                        }
                    }
                    return Ok(());
                }
            }
        }
    }
}
