//! services/delivery_service.rs
//! Registro de entregas (`sms_records`) como unidad de trabajo: las escrituras
//! van a una transacción abierta y solo se confirman en `commit()`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite, Transaction};

use crate::models::delivery_model::DeliveryStatus;

#[async_trait]
pub trait DeliveryStore: Send {
    /// Crea el registro en PENDING y devuelve su id.
    async fn create_pending(&mut self, campaign_id: i64, phone_number: &str) -> Result<i64>;

    async fn mark_success(
        &mut self,
        record_id: i64,
        message_id: Option<&str>,
        cost: f64,
    ) -> Result<()>;

    async fn mark_failed(&mut self, record_id: i64, error_message: &str) -> Result<()>;

    /// Confirma todo lo escrito desde el último commit.
    async fn commit(&mut self) -> Result<()>;
}

pub struct SqliteDeliveryStore {
    db_pool: Pool<Sqlite>,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteDeliveryStore {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SqliteDeliveryStore { db_pool, tx: None }
    }

    pub fn has_uncommitted(&self) -> bool {
        self.tx.is_some()
    }

    /// Abre la transacción de forma perezosa; tras un commit no queda ninguna
    /// conexión tomada hasta la siguiente escritura.
    async fn transaction(&mut self) -> Result<&mut Transaction<'static, Sqlite>> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => self
                .db_pool
                .begin()
                .await
                .context("No se pudo abrir transacción para sms_records")?,
        };
        Ok(self.tx.insert(tx))
    }
}

#[async_trait]
impl DeliveryStore for SqliteDeliveryStore {
    async fn create_pending(&mut self, campaign_id: i64, phone_number: &str) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        let tx = self.transaction().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO sms_records (campaign_id, phone_number, status, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(campaign_id)
        .bind(phone_number)
        .bind(DeliveryStatus::Pending.as_str())
        .bind(now)
        .execute(&mut **tx)
        .await
        .context("Fallo al insertar sms_record")?;

        Ok(result.last_insert_rowid())
    }

    async fn mark_success(
        &mut self,
        record_id: i64,
        message_id: Option<&str>,
        cost: f64,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.transaction().await?;

        sqlx::query(
            r#"
            UPDATE sms_records
            SET status = ?2,
                message_id = ?3,
                cost = ?4,
                error_message = NULL,
                sent_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(record_id)
        .bind(DeliveryStatus::Success.as_str())
        .bind(message_id)
        .bind(cost)
        .bind(now)
        .execute(&mut **tx)
        .await
        .context("Fallo al marcar sms_record como SUCCESS")?;

        Ok(())
    }

    async fn mark_failed(&mut self, record_id: i64, error_message: &str) -> Result<()> {
        let tx = self.transaction().await?;

        sqlx::query(
            r#"
            UPDATE sms_records
            SET status = ?2,
                error_message = ?3
            WHERE id = ?1
            "#,
        )
        .bind(record_id)
        .bind(DeliveryStatus::Failed.as_str())
        .bind(error_message)
        .execute(&mut **tx)
        .await
        .context("Fallo al marcar sms_record como FAILED")?;

        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        if let Some(tx) = self.tx.take() {
            tx.commit()
                .await
                .context("Fallo al hacer commit de sms_records")?;
        }
        Ok(())
    }
}
