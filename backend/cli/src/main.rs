mod config;
mod generate_cmd;
mod session_cmd;
mod status_cmd;
mod terminal_output;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ideaforge_client::IdeaStreamClient;
use ideaforge_core::{Category, Mode};
use ideaforge_gateway::{start_server, RelayState};
use ideaforge_providers::AiGatewayProvider;

use config::Config;

#[derive(Parser)]
#[command(name = "ideaforge")]
#[command(about = "IdeaForge: streaming idea generation relay and client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind the HTTP server to
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Generate ideas once and stream them to stdout
    Generate {
        #[arg(short, long, default_value = "list")]
        mode: Mode,
        /// Topic for list/single mode
        topic: Option<String>,
        /// Domain hint for random mode
        #[arg(short, long)]
        category: Option<Category>,
        /// Relay endpoint (defaults to IDEAFORGE_ENDPOINT)
        #[arg(short, long)]
        endpoint: Option<String>,
    },
    /// Interactive session with a three-entry history
    Session {
        #[arg(short, long)]
        endpoint: Option<String>,
    },
    /// Show a running relay's health
    Status {
        /// Relay base URL (defaults to the local port)
        #[arg(short, long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();
    ideaforge_logging::init_logger(&config.log_options());

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                bind_address: bind.unwrap_or(config.bind_address),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Generate {
            mode,
            topic,
            category,
            endpoint,
        } => {
            let client = stream_client(&config, endpoint);
            generate_cmd::run(&client, mode, topic, category).await?;
        }
        Commands::Session { endpoint } => {
            session_cmd::run(stream_client(&config, endpoint)).await?;
        }
        Commands::Status { url } => {
            let url = url.unwrap_or_else(|| format!("http://localhost:{}", config.port));
            status_cmd::run(&url).await?;
        }
    }

    Ok(())
}

fn stream_client(config: &Config, endpoint: Option<String>) -> IdeaStreamClient {
    let mut client = IdeaStreamClient::new(endpoint.unwrap_or_else(|| config.endpoint.clone()))
        .with_timeouts(config.connect_timeout(), config.stream_timeout());
    if let Some(key) = &config.anon_key {
        client = client.with_anon_key(key.clone());
    }
    client
}

fn relay_state(config: &Config) -> RelayState {
    match &config.api_key {
        Some(key) => {
            let provider = AiGatewayProvider::new(key.clone())
                .with_base_url(config.gateway_url.clone())
                .with_timeouts(config.connect_timeout(), config.stream_timeout());
            info!(endpoint = %provider.endpoint(), model = %config.model, "Registered AI gateway provider");
            RelayState::new(Arc::new(provider), config.model.clone())
        }
        None => RelayState::unconfigured("AI_GATEWAY_API_KEY", config.model.clone()),
    }
}

async fn run_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.bind_address, config.port))?;

    info!(addr = %addr, model = %config.model, "Starting IdeaForge relay");
    start_server(addr, relay_state(&config)).await
}
