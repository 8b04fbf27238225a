//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod campaign_service;
pub mod delivery_service;
pub mod dispatch_service;
pub mod gateway_service;
pub mod simulation_service;
pub mod sms_service;
