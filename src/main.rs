mod api;
mod app;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;
mod views;

use actix_web::{middleware::Compress, middleware::Logger, HttpServer};
use app::{build_app, AppState};
use config::{Config, StoreBackend};
use dotenv::dotenv;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("❌ {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("🚀 Starting Form Builder...");

    let state = match config.store_backend {
        StoreBackend::MongoDB => {
            log::info!("📊 Database: {} / {}", config.mongo_uri, config.database_name);
            let db = database::MongoDB::new(&config.mongo_uri, &config.database_name)
                .await
                .map_err(|e| {
                    log::error!("❌ Failed to connect to MongoDB: {}", e);
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
                })?;
            log::info!("✅ MongoDB connected successfully");
            AppState::with_backend(Arc::new(db), config.bcrypt_cost, config.cookie_secure)
        }
        StoreBackend::Memory => {
            log::warn!("⚠️  Using the in-memory store; data is lost on restart");
            AppState::with_backend(
                Arc::new(database::MemoryStore::new()),
                config.bcrypt_cost,
                config.cookie_secure,
            )
        }
    };

    log::info!("🌐 Server starting on http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        build_app(state.clone())
            .wrap(Compress::default())
            .wrap(Logger::default())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
