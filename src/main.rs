// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, store, request cache, and start HTTP server

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use places_explorer::config::{self, Config};
use places_explorer::handlers::{self, SearchState};
use places_explorer::services::{ProviderClients, ReqwestTransport, RequestCache};
use std::io;
use std::time::Duration;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            config.log_level.as_str()
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting places-explorer...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Open the local store
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    // 5. Load the request cache
    let transport = match ReqwestTransport::new(Duration::from_secs(config.http_timeout)) {
        Ok(transport) => transport,
        Err(e) => {
            log::error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let cache = RequestCache::load(&config.cache_path, transport);
    let search_state = web::Data::new(SearchState::new(
        cache,
        ProviderClients::from_config(&config),
        config.fetch_review_photos,
    ));

    // 6. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let config_data = web::Data::new(config);
    let pool_data = web::Data::new(pool);

    HttpServer::new(move || {
        App::new()
            // Application state (store, config, search state)
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .app_data(search_state.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::places_config)
            .configure(handlers::searches_config::<ReqwestTransport>)
    })
    .bind(&server_addr)?
    .run()
    .await
}
