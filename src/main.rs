mod api;
mod auth;
mod config;
mod db;
mod error;
mod greeting;
mod integrations;
mod knowledge;
mod pipeline;
mod ratelimit;
mod responder;
mod sessions;
mod twilio;

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use api::AppState;
use config::Config;
use db::Database;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("--version") => println!("voicebot {VERSION}"),
        Some("--help") | Some("-h") => print_usage(),
        Some(other) => {
            eprintln!("Unknown option: {other}");
            print_usage();
            std::process::exit(1);
        }
        None => {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    eprintln!("Failed to create tokio runtime: {e}");
                    std::process::exit(1);
                }
            };
            if let Err(e) = rt.block_on(server()) {
                eprintln!("voicebot: {e}");
                std::process::exit(1);
            }
        }
    }
}

fn print_usage() {
    println!("voicebot {VERSION}");
    println!("Customer-support voice and text chatbot backend");
    println!();
    println!("Usage: voicebot [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --version   Print version");
    println!("  --help, -h  Print this help message");
    println!();
    println!("Without options, starts the API server.");
    println!("Config is read from $VOICEBOT_CONFIG or ~/.voicebot/config.toml.");
}

async fn server() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voicebot=info,tower_http=info".into()),
        )
        .init();

    let config = Config::load().map_err(|e| format!("Failed to load config: {e}"))?;

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting voicebot"
    );

    let db = Database::open(&config.database.path)?;
    tracing::info!(path = %config.database.path.display(), "Database ready");

    let state = AppState::new(config.clone(), db);
    tracing::info!(
        live_model = state.assistant.is_live(),
        live_stt = state.stt.is_live(),
        tts = state.tts.is_enabled(),
        knowledge = state.knowledge.is_enabled(),
        documents = state.knowledge.len(),
        "Services configured"
    );
    if config.twilio.is_configured() {
        tracing::info!(number = %config.twilio.phone_number, "Twilio webhooks enabled");
    } else {
        tracing::info!("Twilio credentials not set");
    }

    let shutdown = CancellationToken::new();
    let sweeper = state.sessions.spawn_sweeper(shutdown.clone());

    let app = api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| format!("Invalid server address: {e}"))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    let signal = shutdown.clone();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
        }
        tracing::info!("Shutting down");
        signal.cancel();
    })
    .await?;

    shutdown.cancel();
    let _ = sweeper.await;
    Ok(())
}
