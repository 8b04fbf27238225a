//! config/mod.rs
//! Configuración de la app: servidor, gateway SMS, simulación y despacho.

pub mod app_config;
pub mod dispatch_config;
pub mod gateway_config;
