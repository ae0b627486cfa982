//! `farewell`: terminal front end for the farewell gift event.

mod config;
mod flow_ui;
mod tester;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use event_api::{ApiOptions, Envelope, EventApiClient};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "farewell", version, about = "Apply for the farewell event gift")]
struct Cli {
    /// Backend base URL (overrides EVENT_API_BASE_URL)
    #[arg(long)]
    base_url: Option<Url>,

    /// Envelope field the backend wraps payloads in: data or result
    /// (overrides EVENT_API_ENVELOPE)
    #[arg(long)]
    envelope: Option<Envelope>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Walk the interactive application flow (the default)
    Flow,
    /// Exercise the backend endpoints one by one
    Test {
        /// Which endpoint to exercise; the whole sequence when omitted
        #[arg(value_enum)]
        step: Option<TestStep>,
    },
    /// Show the remaining gift stock (admin token required)
    Stock,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TestStep {
    Send,
    Verify,
    Apply,
    Status,
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env().context("Failed to load configuration")?;

    let base_url = cli.base_url.unwrap_or(config.base_url.clone());
    let envelope = cli.envelope.unwrap_or(config.envelope);
    let client = EventApiClient::new(ApiOptions::new(base_url).with_envelope(envelope))
        .context("Failed to build the backend client")?;

    match cli.command.unwrap_or(Command::Flow) {
        Command::Flow => flow_ui::run(client).await,
        Command::Test { step } => tester::run(&client, step.unwrap_or(TestStep::All)).await,
        Command::Stock => {
            let token = config
                .admin_token
                .context("EVENT_ADMIN_TOKEN must be set for the stock command")?;
            let stock = client.event_stock(&token).await?;
            println!("Remaining gift stock: {}", stock.to_string().bold());
            Ok(())
        }
    }
}
