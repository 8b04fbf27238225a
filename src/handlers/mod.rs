//! handlers/mod.rs
//! Módulo que agrupa los handlers HTTP (SMS y campañas).
pub mod campaign_handler;
pub mod sms_handler;
