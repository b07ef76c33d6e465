use botpro::cli::commands::{Cli, Commands};
use botpro::config::{broker_credentials_from_env, AppConfig};
use botpro::domain::entities::credentials::Credentials;
use botpro::domain::ports::broker::{OptionChainRequest, QuoteRequest};
use botpro::server::run_server;
use botpro::BotPro;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("botpro=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Missing SmartAPI credentials are fatal here, at startup, for anything
    // that talks to the broker. Store-only commands and the paper broker run
    // without them.
    let credentials = if cli.command.needs_broker() {
        match broker_credentials_from_env(config.broker) {
            Ok(creds) => creds,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    } else {
        Credentials::default()
    };

    let app = match BotPro::new(&config, credentials) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error initializing botpro: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_command(app, &config, cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run_command(app: BotPro, config: &AppConfig, cmd: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        Commands::Serve { bind } => {
            let app = Arc::new(app);
            // Login failure is reported, not fatal: store endpoints keep working.
            let outcome = app.ensure_connected().await;
            if !outcome.connected {
                eprintln!("Warning: broker login failed at startup: {}", outcome.message);
            }
            let addr = bind.unwrap_or_else(|| config.bind_addr.clone());
            run_server(&addr, app).await?;
        }
        Commands::Ingest { file, source } => {
            let bytes = std::fs::read(&file)?;
            let text = String::from_utf8_lossy(&bytes);
            let report = app.ingest(&source, &text)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Recent { limit } => {
            let docs = app.recent(limit)?;
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
        Commands::Ask { question, limit } => {
            let answer = app.answer(&question, limit)?;
            println!("{}", serde_json::to_string_pretty(&answer)?);
        }
        Commands::Search { text, limit } => {
            let docs = app.search(&text, limit)?;
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
        Commands::Stats => {
            let stats = app.stats()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Connect => {
            let outcome = app.connect().await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if !outcome.connected {
                return Err(outcome.message.into());
            }
        }
        Commands::Balance => {
            let data = app.balance().await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Commands::Ltp {
            exchange,
            symbol,
            token,
        } => {
            let quote = QuoteRequest {
                exchange,
                tradingsymbol: symbol,
                symboltoken: token,
            };
            let data = app.ltp(&quote).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Commands::OptionChain { name, expiry } => {
            let request = OptionChainRequest {
                name,
                expirydate: expiry,
            };
            let data = app.option_chain(&request).await?;
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
    }
    Ok(())
}
