//! Main entry point for the Campgrounds backend server.
//! This crate wires configuration, storage and external services into the REST API.

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use auth_services::jwt::JwtService;
use auth_services::middleware::AuthMiddleware;
use campgrounds::{CampgroundStore, ExternalServices, ListingService, MutationService};
use postgres::PgCampgroundStore;
use postgres::database::*;
use web_handlers::*;

mod config;
use config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting campgrounds server...");

    let config = AppConfig::from_env();

    // Create database connection pool
    let pool = match create_connection_pool(&config.database_url).await {
        Ok(pool) => {
            log::info!("🗃️ Database pool created successfully");

            if let Err(e) = test_connection(&pool).await {
                log::error!("❌ Database connection test failed: {}", e);
            }
            pool
        }
        Err(e) => {
            log::error!("❌ Failed to create database pool: {}", e);
            log::error!("💡 Make sure PostgreSQL is running and DATABASE_URL is correct");
            std::process::exit(1);
        }
    };

    if let Err(e) = apply_schema(&pool).await {
        log::error!("❌ Failed to apply database schema: {}", e);
        std::process::exit(1);
    }

    let services = match ExternalServices::from_config(&config.services) {
        Ok(services) => services,
        Err(e) => {
            log::error!("❌ Failed to initialize external services: {}", e);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn CampgroundStore> = Arc::new(PgCampgroundStore::new(pool));
    let listing_service = ListingService::new(store.clone());
    let mutation_service = MutationService::new(store, services);
    let jwt_service = JwtService::new(&config.jwt_secret);

    log::info!("🌐 Server will be available at: http://{}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(listing_service.clone()))
            .app_data(web::Data::new(mutation_service.clone()))
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(Logger::default())
            .service(campground_routes())
            .route("/health", web::get().to(health))
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
