//! tests/support.rs
//! Helpers compartidos: pool SQLite en memoria y dobles de gateway/store.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::time::Duration;

use crate::config::dispatch_config::{DispatchConfig, SimulationConfig};
use crate::config::gateway_config::GatewayConfig;
use crate::models::delivery_model::DeliveryStatus;
use crate::models::sms_model::MessageOutcome;
use crate::services::campaign_service::CampaignService;
use crate::services::delivery_service::DeliveryStore;
use crate::services::gateway_service::{AfricasTalkingGateway, SmsGateway};
use crate::services::simulation_service::SimulationService;

/// Pool en memoria con una sola conexión (cada conexión sería otra base).
pub async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria");

    CampaignService::new(pool.clone())
        .run_migrations()
        .await
        .expect("Fallo en migraciones de test");

    pool
}

/// Sin pausas entre destinatarios.
pub fn fast_dispatch_config(commit_every: usize) -> DispatchConfig {
    DispatchConfig {
        throttle: Duration::ZERO,
        commit_every,
    }
}

/// Gateway real sin credenciales y sin latencia simulada.
pub fn simulated_gateway() -> AfricasTalkingGateway {
    AfricasTalkingGateway::new(
        GatewayConfig::unconfigured(),
        SimulationService::new(SimulationConfig::instant()),
    )
    .expect("No se pudo crear el gateway")
}

pub fn phones(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("+2547000000{:02}", i)).collect()
}

/// Gateway que responde según una función del número.
pub struct FnGateway<F>(pub F);

#[async_trait]
impl<F> SmsGateway for FnGateway<F>
where
    F: Fn(&str) -> Result<MessageOutcome> + Send + Sync,
{
    async fn send(&self, _message: &str, phone_number: &str) -> Result<MessageOutcome> {
        (self.0)(phone_number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub id: i64,
    pub campaign_id: i64,
    pub phone_number: String,
    pub status: DeliveryStatus,
    pub message_id: Option<String>,
    pub cost: Option<f64>,
    pub error_message: Option<String>,
    pub committed: bool,
}

/// Store en memoria; puede fallar a propósito en la N-ésima creación
/// o en el N-ésimo commit.
#[derive(Default)]
pub struct MemoryDeliveryStore {
    pub records: Vec<MemoryRecord>,
    pub commits: usize,
    pub fail_on_create: Option<usize>,
    pub fail_on_commit: Option<usize>,
}

#[async_trait]
impl DeliveryStore for MemoryDeliveryStore {
    async fn create_pending(&mut self, campaign_id: i64, phone_number: &str) -> Result<i64> {
        if self.fail_on_create == Some(self.records.len() + 1) {
            return Err(anyhow!("database is locked"));
        }
        let id = self.records.len() as i64 + 1;
        self.records.push(MemoryRecord {
            id,
            campaign_id,
            phone_number: phone_number.to_string(),
            status: DeliveryStatus::Pending,
            message_id: None,
            cost: None,
            error_message: None,
            committed: false,
        });
        Ok(id)
    }

    async fn mark_success(
        &mut self,
        record_id: i64,
        message_id: Option<&str>,
        cost: f64,
    ) -> Result<()> {
        let rec = self.find(record_id)?;
        rec.status = DeliveryStatus::Success;
        rec.message_id = message_id.map(str::to_string);
        rec.cost = Some(cost);
        Ok(())
    }

    async fn mark_failed(&mut self, record_id: i64, error_message: &str) -> Result<()> {
        let rec = self.find(record_id)?;
        rec.status = DeliveryStatus::Failed;
        rec.error_message = Some(error_message.to_string());
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if self.fail_on_commit == Some(self.commits + 1) {
            return Err(anyhow!("disk I/O error"));
        }
        self.commits += 1;
        for rec in &mut self.records {
            rec.committed = true;
        }
        Ok(())
    }
}

impl MemoryDeliveryStore {
    fn find(&mut self, record_id: i64) -> Result<&mut MemoryRecord> {
        self.records
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| anyhow!("record {} no existe", record_id))
    }
}
