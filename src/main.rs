use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use log::info;

use taskboard::auth::PasswordHasher;
use taskboard::config::Config;
use taskboard::routes::{self, health};
use taskboard::store::PgStore;
use taskboard::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("Invalid configuration")?;

    let store = PgStore::connect(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    store
        .migrate()
        .await
        .context("Failed to run database migrations")?;

    let state = web::Data::new(AppState::new(
        Arc::new(store),
        PasswordHasher::new(config.bcrypt_cost),
    ));

    info!("Starting taskboard server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
            .default_service(web::route().to(health::not_found))
    })
    .bind((config.server_host.as_str(), config.server_port))
    .with_context(|| format!("Failed to bind {}", config.server_url()))?
    .run()
    .await?;

    Ok(())
}
