use std::sync::Arc;

use anyhow::{Context, Result};
use askrelay::telegram::{Bot, Router, TelegramApi};
use askrelay::{Config, ConfigError, QueryService};
use clap::{Parser, Subcommand};
use tracing::info;

/// askrelay - relay chat questions to a document library and reply with cited answers
#[derive(Parser)]
#[command(name = "askrelay")]
#[command(about = "Relays Telegram questions to a library ask endpoint")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Start the Telegram bot
    Run,
    /// Ask a single question and print the formatted answer
    Ask(AskCommand),
}

/// Ask a single question
#[derive(Parser)]
struct AskCommand {
    /// The question to send
    #[arg(value_name = "QUERY")]
    query: String,
}

fn main() {
    let cli = Cli::parse();
    askrelay::telemetry::init();

    let result = Config::load()
        .context("Failed to load configuration")
        .and_then(|config| match &cli.command {
            Commands::Run => handle_run(&config),
            Commands::Ask(cmd) => handle_ask(&config, cmd),
        });

    if let Err(e) = result {
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Configuration problems are user errors; everything else is a runtime failure.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| cause.is::<ConfigError>())
}

fn build_service(config: &Config) -> Result<QueryService> {
    QueryService::from_config(config).context("Failed to create answer backend client")
}

/// Starts the bot and polls until the process is stopped.
fn handle_run(config: &Config) -> Result<()> {
    let token = config.require_bot_token()?;
    let api = TelegramApi::new(token).context("Failed to create Telegram client")?;
    let service = build_service(config)?;
    let router = Router::new(config.bot_name.clone(), config.allow_list.clone());

    info!(
        model = %config.model,
        library_id = %config.library_id,
        restricted = !config.allow_list.is_unrestricted(),
        "starting bot"
    );

    Bot::new(Arc::new(api), Arc::new(service), router)
        .run()
        .context("Telegram bot stopped")
}

/// Sends one query and prints the formatted answer.
fn handle_ask(config: &Config, cmd: &AskCommand) -> Result<()> {
    let service = build_service(config)?;
    let answer = service
        .ask(cmd.query.trim())
        .context("Failed to get an answer")?;
    println!("{answer}");
    Ok(())
}
