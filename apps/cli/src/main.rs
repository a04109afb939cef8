//! Contentible CLI: chat with the campaign generation service from a terminal.
//!
//! Sends prompts to the configured endpoint, renders campaign plans, ad copy
//! and link previews as plain text.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
