use anyhow::Result;

use crate::prompt::{InputType, Prompt};
use crate::window::Route;

pub struct HomePage;

impl HomePage {
    /// Ask for something to talk about. Returns the chat route to navigate to, or
    /// `None` when the user leaves.
    pub fn run(&self, prompt: &mut dyn Prompt) -> Result<Option<Route>> {
        prompt.title("Execute Mind");

        loop {
            let input = prompt.get_input("What's on your mind?")?;
            match input.input_type {
                InputType::Exit => return Ok(None),
                InputType::Message => {
                    let query = input.content.unwrap_or_default().trim().to_string();
                    if !query.is_empty() {
                        return Ok(Some(Route::Chat { query: Some(query) }));
                    }
                }
                _ => prompt.info("Type a question to start a chat, or /exit to quit."),
            }
        }
    }
}
