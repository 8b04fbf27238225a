//! services/dispatch_service.rs
//! Motor de envío masivo: recorre los destinatarios en orden, uno por uno,
//! acumula el reporte y (si hay campaña) deja un registro por destinatario.

use anyhow::Result;
use std::sync::Arc;

use crate::{
    config::dispatch_config::DispatchConfig,
    models::sms_model::{DispatchReport, DispatchRequest, MessageOutcome},
    services::{delivery_service::DeliveryStore, gateway_service::SmsGateway},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchProgress {
    pub processed: usize,
    pub total: usize,
}

pub type ProgressObserver = Arc<dyn Fn(DispatchProgress) + Send + Sync>;

#[derive(Clone)]
pub struct DispatchService<G> {
    gateway: G,
    config: DispatchConfig,
    observer: Option<ProgressObserver>,
}

impl<G: SmsGateway> DispatchService<G> {
    pub fn new(gateway: G, config: DispatchConfig) -> Self {
        Self {
            gateway,
            config: config.normalized(),
            observer: None,
        }
    }

    /// Se llama cada `commit_every` destinatarios, junto con el commit.
    pub fn with_progress_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(DispatchProgress) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Envía `req.message` a cada destinatario.
    ///
    /// Los fallos por destinatario quedan en el reporte y no cortan el lote.
    /// Los registros solo se escriben si hay `campaign_id` y `store`; un error
    /// de persistencia sí corta el lote y se devuelve al caller.
    pub async fn dispatch(
        &self,
        req: &DispatchRequest,
        store: Option<&mut dyn DeliveryStore>,
    ) -> Result<DispatchReport> {
        let total = req.recipients.len();
        let mut report = DispatchReport::default();

        let mut sink = match (req.campaign_id, store) {
            (Some(campaign_id), Some(store)) => Some((campaign_id, store)),
            (Some(campaign_id), None) => {
                log::warn!(
                    "(dispatch) Campaña {} sin store de entregas; no se guardarán registros.",
                    campaign_id
                );
                None
            }
            (None, _) => None,
        };

        match req.campaign_id {
            Some(campaign_id) => log::info!(
                "Starting bulk SMS send to {} numbers for campaign {}",
                total,
                campaign_id
            ),
            None => log::info!("Starting bulk SMS send to {} numbers", total),
        }

        for (i, phone_number) in req.recipients.iter().enumerate() {
            // 1) Registro PENDING antes de intentar el envío
            let record_id = match sink.as_mut() {
                Some((campaign_id, store)) => {
                    Some(store.create_pending(*campaign_id, phone_number).await?)
                }
                None => None,
            };

            // 2) Envío; cualquier error se vuelve un resultado fallido
            let outcome = match self.gateway.send(&req.message, phone_number).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!(
                        "(dispatch) Error processing phone number {}: {:?}",
                        phone_number,
                        e
                    );
                    MessageOutcome::failed(phone_number, format!("{:#}", e))
                }
            };

            // 3) Acumular
            let cost = report.record(outcome);

            // 4) Actualizar el registro
            if let (Some((_, store)), Some(record_id)) = (sink.as_mut(), record_id) {
                if let Some(outcome) = report.details.last() {
                    if outcome.success {
                        store
                            .mark_success(record_id, outcome.provider_message_id.as_deref(), cost)
                            .await?;
                    } else {
                        let error = outcome.error.as_deref().unwrap_or("Unknown error");
                        store.mark_failed(record_id, error).await?;
                    }
                }
            }

            // 5) Pausa fija entre destinatarios
            let processed = i + 1;
            if processed < total && !self.config.throttle.is_zero() {
                tokio::time::sleep(self.config.throttle).await;
            }

            // 6) Commit y progreso cada N
            if processed % self.config.commit_every == 0 {
                if let Some((_, store)) = sink.as_mut() {
                    store.commit().await?;
                }
                self.observe(DispatchProgress { processed, total });
            }
        }

        if let Some((_, store)) = sink.as_mut() {
            store.commit().await?;
        }

        log::info!(
            "Bulk SMS completed. Success: {}, Failed: {}, Total cost: {:.4}",
            report.successful_count,
            report.failed_count,
            report.total_cost
        );
        Ok(report)
    }

    fn observe(&self, progress: DispatchProgress) {
        log::info!(
            "Processed {}/{} messages",
            progress.processed,
            progress.total
        );
        if let Some(observer) = &self.observer {
            observer(progress);
        }
    }
}
