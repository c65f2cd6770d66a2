use anyhow::Result;

use crate::prompt::{InputType, Prompt};

pub struct AboutPage;

impl AboutPage {
    pub fn run(&self, prompt: &mut dyn Prompt) -> Result<()> {
        prompt.title("About Execute Mind");
        prompt.info(&format!(
            "Execute Mind {}: chat with a language model from your desktop.",
            env!("CARGO_PKG_VERSION")
        ));
        prompt.info("This page lives in its own window. Type /exit to close it.");

        loop {
            if prompt.get_input("")?.input_type == InputType::Exit {
                return Ok(());
            }
        }
    }
}
