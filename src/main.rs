use axum::serve;
use colabri_sheet::build_app;
use colabri_sheet::collab::{CollaborationServer, Palette};
use colabri_sheet::config::Config;
use tracing::{info, error, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use std::panic;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() {

    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "colabri_sheet=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    // Build the peer palette once; a seed makes colors reproducible
    let palette = Palette::generate(config.palette_size, config.palette_seed);
    if config.palette_seed.is_some() {
        info!("Using seeded palette with {} colors", palette.len());
    }

    let settings = config.server_settings();
    info!(
        "{}: {}x{} grid, up to {} clients",
        config.service_name, settings.bounds.rows, settings.bounds.cols, settings.max_clients
    );
    let server = Arc::new(CollaborationServer::new(settings, palette));

    let app = build_app(server, &config);

    // Start the HTTP/WebSocket server
    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("🚀 Server running on http://{}", config.server_address());
    info!("📡 WebSocket available at ws://{}/ws/{{clientId}}", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    serve(listener, app)
        .await
        .expect("Server failed to start");
}
