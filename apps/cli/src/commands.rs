//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use contentible_core::render::{render_preview, render_transcript, render_turn};
use contentible_core::{Assistant, Conversation, HttpGenerationClient, ProgressReporter};
use contentible_enrichment::Enricher;
use contentible_links::{display_url, extract_previews};
use contentible_shared::{
    AppConfig, ChatTurn, init_config, load_config, validate_config,
};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Contentible: marketing campaign assistant in the terminal.
#[derive(Parser)]
#[command(
    name = "contentible",
    version,
    about = "Chat with the Contentible generation service and preview the links it finds.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override the generation endpoint URL from the config file.
    #[arg(long, env = "CONTENTIBLE_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Send a single prompt and print the conversation.
    Ask {
        /// Prompt text.
        prompt: String,
    },

    /// Start an interactive chat session.
    Chat,

    /// Resolve link previews for one or more URLs.
    Preview {
        /// URLs to enrich.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Print previews as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Extract URLs from free text without fetching them.
    Extract {
        /// Text to scan.
        text: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "contentible=info",
        1 => "contentible=debug",
        _ => "contentible=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let endpoint = cli.endpoint;
    match cli.command {
        Command::Ask { prompt } => cmd_ask(endpoint.as_deref(), &prompt).await,
        Command::Chat => cmd_chat(endpoint.as_deref()).await,
        Command::Preview { urls, json } => cmd_preview(&urls, json).await,
        Command::Extract { text } => cmd_extract(&text),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(endpoint.as_deref()),
        },
    }
}

/// Load the config file and apply command-line overrides.
fn resolved_config(endpoint: Option<&str>) -> Result<AppConfig> {
    let mut config = load_config()?;
    if let Some(url) = endpoint {
        config.endpoint.url = url.to_string();
        validate_config(&config)?;
    }
    Ok(config)
}

fn build_conversation(config: &AppConfig) -> Result<Conversation> {
    let backend = HttpGenerationClient::new(&config.endpoint)?;
    let enricher = Enricher::new(&config.enrichment, &config.placeholders)?;
    Ok(Conversation::new(Assistant::new(Box::new(backend), enricher)))
}

// ---------------------------------------------------------------------------
// Chat commands
// ---------------------------------------------------------------------------

async fn cmd_ask(endpoint: Option<&str>, prompt: &str) -> Result<()> {
    let config = resolved_config(endpoint)?;
    let mut convo = build_conversation(&config)?;

    info!(endpoint = %config.endpoint.url, "sending prompt");
    convo.submit(prompt, &CliProgress::new()).await?;

    println!("{}", render_transcript(convo.turns()));
    Ok(())
}

const CHAT_HELP: &str = "Commands: /new starts a new chat, /1 /2 send a suggested follow-up, /quit exits.";

async fn cmd_chat(endpoint: Option<&str>) -> Result<()> {
    let config = resolved_config(endpoint)?;
    let mut convo = build_conversation(&config)?;

    println!("Contentible chat ({})", config.endpoint.url);
    println!("{CHAT_HELP}");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut follow_ups: &'static [&'static str] = &[];

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        let prompt = match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => {
                println!("{CHAT_HELP}");
                continue;
            }
            "/new" => {
                convo.reset();
                follow_ups = &[];
                println!("Started a new chat.\n");
                continue;
            }
            cmd if cmd.starts_with('/') => {
                let picked = cmd[1..]
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| follow_ups.get(i));
                match picked {
                    Some(prompt) => {
                        println!("> {prompt}");
                        (*prompt).to_string()
                    }
                    None => {
                        println!("Unknown command: {cmd}");
                        continue;
                    }
                }
            }
            text => text.to_string(),
        };

        let turn = convo.submit(&prompt, &CliProgress::new()).await?;
        follow_ups = turn
            .attachment
            .as_ref()
            .map(|a| a.follow_ups())
            .unwrap_or(&[]);
        println!("{}", render_turn(turn));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Link commands
// ---------------------------------------------------------------------------

async fn cmd_preview(urls: &[String], json: bool) -> Result<()> {
    let config = load_config()?;
    let enricher = Enricher::new(&config.enrichment, &config.placeholders)?;

    let spinner = CliProgress::new();
    spinner.phase(&format!("Fetching {} link preview(s)...", urls.len()));
    let previews = match urls {
        [single] => vec![enricher.enrich_one(single).await],
        _ => enricher.enrich_all(urls).await,
    };
    spinner.finish();

    if json {
        println!("{}", serde_json::to_string_pretty(&previews)?);
    } else {
        for (i, preview) in previews.iter().enumerate() {
            print!("{}", render_preview(i + 1, preview));
        }
    }
    Ok(())
}

fn cmd_extract(text: &str) -> Result<()> {
    let previews = extract_previews(text);
    if previews.is_empty() {
        return Err(eyre!("no URLs found in input"));
    }
    for preview in previews {
        println!("{}\t{}", display_url(&preview.url), preview.url);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _turn: &ChatTurn) {
        self.finish();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(endpoint: Option<&str>) -> Result<()> {
    let config = resolved_config(endpoint)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
