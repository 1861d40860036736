mod config;
mod error;
mod routes;
mod upstream;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use config::Config;
use routes::{configure_routes, Gateway};
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let gateway = Gateway::from_config(&config).map_err(|e| {
        log::error!("Failed to build removal service client: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    match gateway.upstream() {
        Some(client) => log::info!("Forwarding removal requests to {}", client.url()),
        None => log::warn!(
            "REMOVAL_SERVICE_URL is not set. /api/remove-watermark will answer 503 until it is configured."
        ),
    }

    let frontend_dir = config.frontend_dir.clone();
    log::info!("Serving frontend from {}", frontend_dir);

    let bind_address = format!("0.0.0.0:{}", config.port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(gateway.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
