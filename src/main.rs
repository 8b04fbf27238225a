use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

use crate::config::app_config::{mask_database_url, AppConfig};
use crate::config::dispatch_config::{DispatchConfig, SimulationConfig};
use crate::config::gateway_config::GatewayConfig;
use crate::logger::init_logger;
use crate::services::campaign_service::CampaignService;
use crate::services::dispatch_service::DispatchService;
use crate::services::gateway_service::AfricasTalkingGateway;
use crate::services::simulation_service::SimulationService;
use crate::services::sms_service::SmsService;

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

async fn setup_database(app_config: &AppConfig) -> Result<Pool<Sqlite>> {
    // 1) Crear la carpeta del archivo SQLite si hace falta
    if let Some(db_path) = app_config.sqlite_file_path() {
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("No se pudo crear directorio {}", dir.display()))?;
        }
    }

    log::info!(
        "Conectando a SQLite en {}",
        mask_database_url(&app_config.database_url)
    );

    // 2) Conectarnos con SQLx (crea el archivo si no existe)
    let options = SqliteConnectOptions::from_str(&app_config.database_url)
        .context("DATABASE_URL inválida")?
        .create_if_missing(true);

    let db_pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("No se pudo conectar a la base de datos SQLite.")?;

    Ok(db_pool)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let app_config = AppConfig::from_env();

    // Conectarnos a la DB
    let db_pool = setup_database(&app_config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("{:#}", e)))?;

    // CampaignService (+ migraciones de campaigns y sms_records)
    let campaign_service = CampaignService::new(db_pool.clone());
    if let Err(e) = campaign_service.run_migrations().await {
        panic!("Fallo en migraciones de 'campaigns': {:?}", e);
    }

    // Gateway (simula si no hay API key)
    let simulator = SimulationService::new(SimulationConfig::default());
    let gateway = AfricasTalkingGateway::new(GatewayConfig::from_env(), simulator)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("{:#}", e)))?;

    let dispatcher = DispatchService::new(gateway, DispatchConfig::from_env());
    let sms_service = SmsService::new(dispatcher, campaign_service.clone());

    // Levantar servidor
    log::info!(
        "Starting Bulk SMS Broadcasting Application on 0.0.0.0:{}",
        app_config.port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(campaign_service.clone()))
            .app_data(web::Data::new(sms_service.clone()))
            .configure(app::init_app)
    })
    .workers(1)
    .bind(("0.0.0.0", app_config.port))?
    .run()
    .await
}
