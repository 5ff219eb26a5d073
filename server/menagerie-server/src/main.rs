use std::{env, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use tracing::{info, Level};
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use menagerie_server::{create_app, MenagerieServer, ServerConfig};

/// Menagerie HTTP Server
#[derive(Parser, Debug)]
#[command(name = "menagerie-server")]
#[command(about = "Per-user zoo and animal resource API with OAuth login")]
struct Args {
    /// Server bind address (overrides server.host)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides server.port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, default_value = "menagerie.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(args.verbose);

    let mut config = match ServerConfig::load(Some(args.config.as_path())) {
        Ok(config) => config,
        Err(e) => {
            error_common::log_error("configuration", &e);
            return Err(e)
                .with_context(|| format!("loading configuration from {}", args.config.display()));
        }
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let addr = config.bind_address();
    let enable_wipe = config.server.enable_wipe;
    info!("{}", "Starting Menagerie HTTP Server".bright_cyan());
    info!("Version: {}", env!("CARGO_PKG_VERSION").bright_white());
    info!("Store backend: {:?}", config.store.backend);

    let server = MenagerieServer::from_config(config)
        .await
        .context("initializing server state")?;
    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!("{}", format!("Menagerie running on http://{addr}").bright_green());
    info!("{}", format!("Log in at: http://{addr}/login/").bright_blue());
    info!("{}", format!("API docs at: http://{addr}/swagger-ui").bright_blue());
    if enable_wipe {
        tracing::warn!("DELETE /delete is mounted and unauthenticated");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let is_production = env::var("MENAGERIE_ENV").is_ok_and(|value| value == "production");

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("menagerie_server={level},tower_http=info").into());

    if is_production {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339()),
            )
            .init();
        print_startup_banner();
    }
}

fn print_startup_banner() {
    println!("{}", "╔════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║               MENAGERIE                ║".bright_cyan());
    println!("{}", "║     zoos, animals, and who holds them  ║".bright_cyan());
    println!("{}", "╚════════════════════════════════════════╝".bright_cyan());
    println!();
}
