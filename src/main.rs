use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;

use pushkind_catalog::config::ServerConfig;
use pushkind_catalog::db::{establish_connection_pool, run_migrations};
use pushkind_catalog::repository::DieselRepository;
use pushkind_catalog::routes::{self, AppProductService};
use pushkind_catalog::services::products::ProductService;
use pushkind_catalog::storage::ImageStore;
use pushkind_catalog::storage::cloudinary::CloudinaryStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = run_migrations(&pool) {
        log::error!("Unable to prepare database: {e}");
        std::process::exit(1);
    }

    if let Err(e) = std::fs::create_dir_all(&config.upload_dir) {
        log::error!(
            "Failed to create upload directory {}: {e}",
            config.upload_dir.display()
        );
        std::process::exit(1);
    }

    let store: Arc<dyn ImageStore> = match CloudinaryStore::new(config.cloudinary.clone()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("Failed to initialise image store: {e}");
            std::process::exit(1);
        }
    };

    let repo = DieselRepository::new(pool);
    let service: web::Data<AppProductService> = web::Data::new(ProductService::new(repo, store));

    let address = config.address.clone();
    let port = config.port;
    log::info!(
        "Server running in {} mode on http://{address}:{port}",
        config.app_env.as_str()
    );
    log::info!("Server health check: http://{address}:{port}/health");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .app_data(service.clone())
            .configure(routes::configure(
                config.upload_dir.clone(),
                config.max_upload_bytes,
            ))
            .default_service(web::to(routes::main::not_found))
    })
    .bind((address, port))?
    .run()
    .await
}
