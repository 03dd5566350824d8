mod backend_client;
mod cli;
mod config;

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_print::cformat;
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::backend_client::BackendClient;
use crate::cli::chat::ChatContext;
use crate::config::{ClientConfig, DEFAULT_BACKEND_URL};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Message to send once, then exit
    #[arg(short, long)]
    input: Option<String>,

    /// Base URL of the backend
    #[arg(long, env = "BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Request timeout in seconds (waits indefinitely when unset)
    #[arg(long, env = "BACKEND_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat {
        /// Message to send once, then exit
        #[arg(short, long)]
        input: Option<String>,
    },
    /// Ping the backend health endpoint
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let config = ClientConfig::new(&cli.backend_url, cli.timeout.map(Duration::from_secs))?;
    info!("Starting SafeSpace CLI against {}", config.base_url);

    let client = BackendClient::new(&config)?;

    match cli.command {
        Some(Commands::Health) => check_health(&client).await,
        Some(Commands::Chat { input }) => run_chat(client, input.or(cli.input)).await,
        None => run_chat(client, cli.input).await,
    }
}

async fn run_chat(client: BackendClient, input: Option<String>) -> Result<ExitCode> {
    let interactive = io::stdout().is_terminal();
    let mut chat_context = ChatContext::new(Box::new(io::stdout()), input, interactive, client);
    chat_context.run().await
}

async fn check_health(client: &BackendClient) -> Result<ExitCode> {
    match client.health().await {
        Ok(status) => {
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{}", cformat!("<red>Health check failed:</red> {}", e));
            Ok(ExitCode::FAILURE)
        }
    }
}
