use anyhow::Result;
use console::style;
use std::io::{self, Write};

/// How pages talk to the person at the keyboard
pub trait Prompt: Send {
    fn get_input(&mut self, label: &str) -> Result<Input>;
    fn title(&mut self, text: &str);
    /// Print part of a reply as it streams in
    fn render_fragment(&mut self, fragment: &str);
    fn end_reply(&mut self);
    fn info(&mut self, text: &str);
    fn error(&mut self, text: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Commands may carry an argument, e.g. the page to open
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    AskAgain,   // Ask the user for input again. Control flow command.
    Message,    // User sent a message
    Screenshot, // Capture the screen
    OpenWindow, // Open a secondary window for the page in `content`
    Exit,       // User wants to leave the page
}

impl Input {
    fn new(input_type: InputType, content: Option<String>) -> Self {
        Self {
            input_type,
            content,
        }
    }

    pub fn exit() -> Self {
        Self::new(InputType::Exit, None)
    }

    /// Interpret a line typed by the user
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            return Self::new(InputType::AskAgain, None);
        }

        match text.split_once(char::is_whitespace) {
            _ if text == "/exit" || text.eq_ignore_ascii_case("exit") => Self::exit(),
            _ if text == "/screenshot" => Self::new(InputType::Screenshot, None),
            Some(("/open", page)) if !page.trim().is_empty() => {
                Self::new(InputType::OpenWindow, Some(page.trim().to_string()))
            }
            _ if text == "/open" => Self::new(InputType::AskAgain, None),
            _ => Self::new(InputType::Message, Some(raw.to_string())),
        }
    }
}

pub struct CliclackPrompt {
    replying: bool,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt { replying: false }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for CliclackPrompt {
    fn get_input(&mut self, label: &str) -> Result<Input> {
        let result: io::Result<String> = cliclack::input(label).placeholder("").interact();
        match result {
            Ok(text) => Ok(Input::parse(&text)),
            // Ctrl-C / Esc leave the page
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Input::exit()),
            Err(e) => Err(e.into()),
        }
    }

    fn title(&mut self, text: &str) {
        let _ = cliclack::intro(style(text).bold().to_string());
    }

    fn render_fragment(&mut self, fragment: &str) {
        if !self.replying {
            self.replying = true;
            println!();
        }
        print!("{}", fragment);
        let _ = io::stdout().flush();
    }

    fn end_reply(&mut self) {
        if self.replying {
            self.replying = false;
            println!("\n");
        }
    }

    fn info(&mut self, text: &str) {
        let _ = cliclack::log::info(text);
    }

    fn error(&mut self, text: &str) {
        let _ = cliclack::log::error(text);
    }
}

/// Replays scripted input and records everything shown
#[cfg(test)]
#[derive(Default)]
pub struct ScriptedPrompt {
    pub inputs: std::collections::VecDeque<String>,
    pub output: String,
    pub infos: Vec<String>,
    pub errors: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompt {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|input| input.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
impl Prompt for ScriptedPrompt {
    fn get_input(&mut self, _label: &str) -> Result<Input> {
        Ok(self
            .inputs
            .pop_front()
            .map(|raw| Input::parse(&raw))
            .unwrap_or_else(Input::exit))
    }

    fn title(&mut self, text: &str) {
        self.output.push_str(&format!("# {}\n", text));
    }

    fn render_fragment(&mut self, fragment: &str) {
        self.output.push_str(fragment);
    }

    fn end_reply(&mut self) {
        self.output.push('\n');
    }

    fn info(&mut self, text: &str) {
        self.infos.push(text.to_string());
    }

    fn error(&mut self, text: &str) {
        self.errors.push(text.to_string());
    }
}
