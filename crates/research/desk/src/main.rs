//! Research Desk - web UI for the research assistant workflow
//!
//! Collects a topic, shows the generated analysts for approval or revision,
//! then displays the final report.

use clap::Parser;
use research_desk::config::{startup_banner, Deployment, DeskConfig, EngineConfig};
use research_desk::error::{DeskError, DeskResult};
use research_desk::server::Server;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Research Desk CLI
#[derive(Parser)]
#[command(name = "research-desk")]
#[command(about = "Research Desk - human-in-the-loop research assistant UI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RESEARCH_DESK_CONFIG")]
    config: Option<String>,

    /// Listen address, overriding PORT and RAILWAY_ENVIRONMENT
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    json: bool,

    /// Base URL of a hosted research graph; selects the remote engine
    #[arg(long, env = "RESEARCH_ENGINE_URL")]
    engine_url: Option<String>,

    /// Graph to run on the remote engine
    #[arg(long, env = "RESEARCH_ASSISTANT_ID", default_value = "research_assistant")]
    assistant_id: String,

    /// API key for the remote engine
    #[arg(long, env = "RESEARCH_ENGINE_API_KEY", hide_env_values = true)]
    engine_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> DeskResult<()> {
    dotenvy::dotenv_override().ok();

    let cli = Cli::parse();

    // Load configuration
    let mut config = DeskConfig::load(cli.config.as_deref())
        .map_err(|e| DeskError::Config(e.to_string()))?;

    let deployment = Deployment::detect().map_err(DeskError::Config)?;
    config.apply_deployment(&deployment);

    // Override with CLI args
    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.logging.json = true;
    }
    if let Some(url) = cli.engine_url {
        let mut engine = EngineConfig::remote(url, cli.assistant_id);
        if let EngineConfig::Remote { api_key, .. } = &mut engine {
            *api_key = cli.engine_api_key;
        }
        config.engine = engine;
    }

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    println!("{}", startup_banner(&config, &deployment));

    let server = Server::new(config, deployment.label())?;
    server.run().await
}
