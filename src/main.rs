mod config;
mod db;
mod error;
mod mailer;
mod middleware;
mod models;
mod permissions;
mod routes;
mod services;
mod utils;

#[cfg(test)]
mod tests;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("yamdb=info,actix_web=info,sea_orm=warn")),
        )
        .init();

    let settings = Settings::from_env().context("Invalid configuration")?;

    tracing::info!("Connecting to database...");
    let db = db::establish_connection(&settings.database)
        .await
        .context("Failed to connect to database")?;
    db::create_schema(&db).await.context("Failed to create schema")?;
    tracing::info!("Database connected");

    let mailer = web::Data::from(mailer::from_settings(&settings.mail));
    let bind = (settings.server.bind_addr.clone(), settings.server.port);
    let db = web::Data::new(db);
    let settings = web::Data::new(settings);

    tracing::info!(addr = %bind.0, port = bind.1, "Starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(settings.clone())
            .app_data(mailer.clone())
            .configure(routes::configure_extractors)
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
