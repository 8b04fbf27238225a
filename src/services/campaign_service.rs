use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Sqlite};

use crate::{
    models::{
        campaign_model::{CampaignRecord, CreateCampaignRequest},
        delivery_model::DeliveryRecord,
        sms_model::DispatchReport,
    },
    services::delivery_service::SqliteDeliveryStore,
};

#[derive(FromRow)]
struct CampaignRow {
    id: i64,
    name: String,
    message: String,
    total_recipients: i64,
    status: String,
    successful_count: i64,
    failed_count: i64,
    total_cost: f64,
    error_message: Option<String>,
    created_at: String,
    completed_at: Option<String>,
}

#[derive(FromRow)]
struct SmsRecordRow {
    id: i64,
    campaign_id: i64,
    phone_number: String,
    status: String,
    message_id: Option<String>,
    cost: Option<f64>,
    error_message: Option<String>,
    sent_at: Option<String>,
    created_at: String,
}

#[derive(Clone, Debug)]
pub struct CampaignService {
    db_pool: Pool<Sqlite>,
}

impl CampaignService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        CampaignService { db_pool }
    }

    /// Corre migraciones con sqlx (campaigns + sms_records)
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Failed to run campaign migrations")?;
        Ok(())
    }

    /// Unidad de trabajo para los registros de entrega de un lote.
    pub fn delivery_store(&self) -> SqliteDeliveryStore {
        SqliteDeliveryStore::new(self.db_pool.clone())
    }

    /// Crea la campaña en estado "pending" y devuelve su id.
    pub async fn create_campaign(&self, req: CreateCampaignRequest) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        let total = req.total_recipients as i64;

        let result = sqlx::query(
            r#"
            INSERT INTO campaigns (name, message, total_recipients, status, created_at)
            VALUES (?1, ?2, ?3, 'pending', ?4)
            "#,
        )
        .bind(&req.name)
        .bind(&req.message)
        .bind(total)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar campaign")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn mark_running(&self, campaign_id: i64) -> Result<()> {
        sqlx::query(r#"UPDATE campaigns SET status = 'running' WHERE id = ?1"#)
            .bind(campaign_id)
            .execute(&self.db_pool)
            .await
            .context("Fallo al actualizar campaign a running")?;
        Ok(())
    }

    /// Guarda los totales del reporte y cierra la campaña.
    pub async fn complete_campaign(&self, campaign_id: i64, report: &DispatchReport) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE campaigns
            SET status = 'completed',
                successful_count = ?2,
                failed_count = ?3,
                total_cost = ?4,
                completed_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(campaign_id)
        .bind(report.successful_count as i64)
        .bind(report.failed_count as i64)
        .bind(report.total_cost)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al completar campaign")?;

        Ok(())
    }

    pub async fn mark_campaign_failed(&self, campaign_id: i64, error: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE campaigns
            SET status = 'failed',
                error_message = ?2,
                completed_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(campaign_id)
        .bind(error)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar campaign como failed")?;

        Ok(())
    }

    pub async fn get_campaign(&self, campaign_id: i64) -> Result<Option<CampaignRecord>> {
        let row = sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT id, name, message, total_recipients, status,
                   successful_count, failed_count, total_cost,
                   error_message, created_at, completed_at
            FROM campaigns
            WHERE id = ?1
            "#,
        )
        .bind(campaign_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al consultar campaign")?;

        let Some(r) = row else {
            return Ok(None);
        };

        Ok(Some(CampaignRecord {
            id: r.id,
            name: r.name,
            message: r.message,
            total_recipients: r.total_recipients,
            status: r.status,
            successful_count: r.successful_count,
            failed_count: r.failed_count,
            total_cost: r.total_cost,
            error_message: r.error_message,
            created_at: parse_timestamp(&r.created_at)?,
            completed_at: r.completed_at.as_deref().map(parse_timestamp).transpose()?,
        }))
    }

    /// Registros de entrega de una campaña, en orden de creación.
    pub async fn list_records(&self, campaign_id: i64) -> Result<Vec<DeliveryRecord>> {
        let rows = sqlx::query_as::<_, SmsRecordRow>(
            r#"
            SELECT id, campaign_id, phone_number, status, message_id,
                   cost, error_message, sent_at, created_at
            FROM sms_records
            WHERE campaign_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar sms_records")?;

        let mut result = Vec::with_capacity(rows.len());
        for r in rows {
            result.push(DeliveryRecord {
                id: r.id,
                campaign_id: r.campaign_id,
                phone_number: r.phone_number,
                status: r.status.parse()?,
                message_id: r.message_id,
                cost: r.cost,
                error_message: r.error_message,
                sent_at: r.sent_at.as_deref().map(parse_timestamp).transpose()?,
                created_at: parse_timestamp(&r.created_at)?,
            });
        }
        Ok(result)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Fecha inválida '{}': {}", raw, e))
}
