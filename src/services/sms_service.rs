use anyhow::{bail, Result};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    models::{
        campaign_model::CreateCampaignRequest,
        sms_model::{DispatchRequest, SendSmsRequest, SendSmsResponse, ServiceStatus},
    },
    services::{
        campaign_service::CampaignService, dispatch_service::DispatchService,
        gateway_service::AfricasTalkingGateway,
    },
};

/// Punto de entrada de los handlers: campaña + despacho + cierre.
#[derive(Clone)]
pub struct SmsService {
    dispatcher: DispatchService<AfricasTalkingGateway>,
    campaign_service: CampaignService,
    // Un solo lote persistido a la vez: el store mantiene abierta la
    // transacción de escritura de SQLite entre commits.
    dispatch_lock: Arc<Mutex<()>>,
}

impl SmsService {
    pub fn new(
        dispatcher: DispatchService<AfricasTalkingGateway>,
        campaign_service: CampaignService,
    ) -> Self {
        Self {
            dispatcher,
            campaign_service,
            dispatch_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn status(&self) -> ServiceStatus {
        self.dispatcher.gateway().status()
    }

    pub async fn send_bulk(&self, req: SendSmsRequest) -> Result<SendSmsResponse> {
        if req.message.trim().is_empty() {
            bail!("El mensaje no puede estar vacío");
        }

        if !req.persist {
            let dispatch_req = DispatchRequest::new(req.message, req.recipients);
            let report = self.dispatcher.dispatch(&dispatch_req, None).await?;
            return Ok(SendSmsResponse {
                success: true,
                campaign_id: None,
                report,
            });
        }

        let _guard = self.dispatch_lock.lock().await;

        let name = req
            .campaign_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("Campaign {}", Utc::now().format("%Y-%m-%d %H:%M:%S")));

        let campaign_id = self
            .campaign_service
            .create_campaign(CreateCampaignRequest {
                name,
                message: req.message.clone(),
                total_recipients: req.recipients.len(),
            })
            .await?;
        self.campaign_service.mark_running(campaign_id).await?;

        log::info!(
            "(send_bulk) Campaña {} creada con {} destinatarios",
            campaign_id,
            req.recipients.len()
        );

        let dispatch_req = DispatchRequest::new(req.message, req.recipients).for_campaign(campaign_id);
        let mut store = self.campaign_service.delivery_store();
        let result = self.dispatcher.dispatch(&dispatch_req, Some(&mut store)).await;
        // Libera la transacción pendiente (rollback) antes de tocar la campaña
        drop(store);

        match result {
            Ok(report) => {
                self.campaign_service
                    .complete_campaign(campaign_id, &report)
                    .await?;
                Ok(SendSmsResponse {
                    success: true,
                    campaign_id: Some(campaign_id),
                    report,
                })
            }
            Err(e) => {
                log::error!("(send_bulk) Falló la campaña {}: {:?}", campaign_id, e);
                if let Err(mark_err) = self
                    .campaign_service
                    .mark_campaign_failed(campaign_id, &format!("{:#}", e))
                    .await
                {
                    log::error!(
                        "(send_bulk) No se pudo marcar la campaña {} como failed: {:?}",
                        campaign_id,
                        mark_err
                    );
                }
                Err(e)
            }
        }
    }
}
