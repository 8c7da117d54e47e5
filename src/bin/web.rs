use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use basketbase::api::nba_stats_api::NbaStatsClient;
use basketbase::config::Config;
use basketbase::routes::{router, AppState};
use basketbase::utils::fetcher::StatLogFetcher;
use basketbase::utils::player_directory::PlayerDirectory;
use basketbase::{load_directory, roster_source};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = Config::from_env().context("Invalid configuration")?;

    let nba = Arc::new(
        NbaStatsClient::new(&config.nba_stats_base_url, config.fetch_timeout)
            .context("Failed to build NBA stats client")?,
    );
    let fetcher = StatLogFetcher::new(nba.clone(), config.retry.clone());
    let roster = roster_source(&config, nba);

    println!("Loading player directory...");

    // Start with an empty directory if the roster is unavailable; it can be refreshed later
    let directory = match load_directory(roster.as_ref()).await {
        Ok(directory) => {
            println!("  - {} active players", directory.len());
            directory
        }
        Err(e) => {
            warn!("Error loading players: {:#}", e);
            eprintln!("Server will start but player lookups will fail until /api/players/refresh");
            PlayerDirectory::default()
        }
    };

    let origin: HeaderValue = config
        .frontend_origin
        .parse()
        .with_context(|| format!("Invalid FRONTEND_ORIGIN '{}'", config.frontend_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    let app = router(AppState::new(fetcher, directory, roster))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    println!("\nStarting web server at http://{}", config.bind_addr);
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
