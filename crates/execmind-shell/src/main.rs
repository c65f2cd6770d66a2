use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod bridge;
mod capture;
mod configuration;
mod error;
mod pages;
mod prompt;
mod window;

use crate::app::Shell;
use crate::configuration::Settings;
use crate::prompt::CliclackPrompt;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Page for the main window, e.g. `about` or `chat?query=hello`
    #[arg(short, long)]
    page: Option<String>,

    /// Let the model call the builtin tools before answering
    #[arg(long)]
    tools: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::new()?;
    if cli.tools {
        settings.chat.tools = true;
    }
    tracing::debug!(?settings, "loaded settings");

    let mut prompt = CliclackPrompt::new();
    Shell::new(settings)
        .run(cli.page.as_deref(), &mut prompt)
        .await?;

    cliclack::outro("Goodbye")?;
    Ok(())
}
