//! Windows and the pages they show.
//!
//! A window is identified by a numeric id and displays one route at a time. The main
//! window opens at the main size; windows opened on behalf of a page use the
//! secondary size.
use std::fmt;

use crate::configuration::WindowSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Chat { query: Option<String> },
    About,
}

impl Route {
    /// Resolve a logical page name such as `chat?query=hello%20there`.
    /// Unknown pages fall back to home.
    pub fn parse(page: &str) -> Route {
        let page = page.trim().trim_start_matches('/');
        let (name, params) = page.split_once('?').unwrap_or((page, ""));

        match name {
            "" | "home" => Route::Home,
            "about" => Route::About,
            "chat" => Route::Chat {
                query: query_param(params, "query").filter(|q| !q.trim().is_empty()),
            },
            other => {
                tracing::warn!("unknown page '{}', showing home instead", other);
                Route::Home
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "home"),
            Route::About => write!(f, "about"),
            Route::Chat { query: None } => write!(f, "chat"),
            Route::Chat { query: Some(query) } => {
                let params =
                    serde_urlencoded::to_string([("query", query)]).map_err(|_| fmt::Error)?;
                write!(f, "chat?{}", params)
            }
        }
    }
}

fn query_param(params: &str, key: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(params) {
        Ok(pairs) => pairs,
        Err(e) => {
            tracing::warn!("ignoring malformed page parameters '{}': {}", params, e);
            return None;
        }
    };
    pairs
        .into_iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    pub id: u32,
    pub route: Route,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default)]
pub struct CreateWindowOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub page: Option<String>,
}

pub struct WindowManager {
    settings: WindowSettings,
    windows: Vec<Window>,
    next_id: u32,
}

impl WindowManager {
    pub fn new(settings: WindowSettings) -> Self {
        Self {
            settings,
            windows: Vec::new(),
            next_id: 1,
        }
    }

    pub fn create_window(&mut self, options: CreateWindowOptions) -> Window {
        let window = Window {
            id: self.next_id,
            route: options
                .page
                .as_deref()
                .map(Route::parse)
                .unwrap_or(Route::Home),
            width: options.width.unwrap_or(self.settings.width),
            height: options.height.unwrap_or(self.settings.height),
        };
        self.next_id += 1;

        tracing::info!(
            id = window.id,
            route = %window.route,
            "created {}x{} window",
            window.width,
            window.height
        );
        self.windows.push(window.clone());
        window
    }

    /// Open a window for a page on behalf of another page
    pub fn open_secondary(&mut self, page: &str) -> Window {
        self.create_window(CreateWindowOptions {
            width: Some(self.settings.secondary_width),
            height: Some(self.settings.secondary_height),
            page: Some(page.to_string()),
        })
    }

    pub fn get(&self, id: u32) -> Option<&Window> {
        self.windows.iter().find(|window| window.id == id)
    }

    pub fn navigate(&mut self, id: u32, route: Route) -> Option<&Window> {
        let window = self.windows.iter_mut().find(|window| window.id == id)?;
        tracing::debug!(id, from = %window.route, to = %route, "navigating");
        window.route = route;
        Some(window)
    }

    pub fn close(&mut self, id: u32) -> Option<Window> {
        let index = self.windows.iter().position(|window| window.id == id)?;
        tracing::info!(id, "closed window");
        Some(self.windows.remove(index))
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }
}
