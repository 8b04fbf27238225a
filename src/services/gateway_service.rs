//! services/gateway_service.rs
//! Cliente del gateway SMS (Africa's Talking). Si no hay credenciales,
//! o el proveedor falla, el envío se simula para no cortar el lote.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::{
    config::gateway_config::GatewayConfig,
    models::sms_model::{GatewayResult, MessageOutcome, ServiceStatus},
    services::simulation_service::SimulationService,
};

/// Envío de un SMS a un destinatario.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, message: &str, phone_number: &str) -> Result<MessageOutcome>;
}

#[derive(Debug, Deserialize)]
struct MessagingResponse {
    #[serde(rename = "SMSMessageData")]
    data: SmsMessageData,
}

#[derive(Debug, Deserialize)]
struct SmsMessageData {
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "Recipients", default)]
    recipients: Vec<RecipientStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipientStatus {
    status: String,
    message_id: Option<String>,
    cost: Option<String>,
}

#[derive(Clone)]
pub struct AfricasTalkingGateway {
    config: GatewayConfig,
    simulator: SimulationService,
    http_client: Client,
}

impl AfricasTalkingGateway {
    pub fn new(config: GatewayConfig, simulator: SimulationService) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("No se pudo construir el cliente HTTP del gateway")?;

        if !config.is_configured() {
            log::warn!("API key not configured. SMS sending will be simulated.");
        } else {
            log::info!(
                "Gateway SMS inicializado: username={}, url={}, timeout={}s",
                config.account_id,
                config.base_url,
                config.timeout.as_secs()
            );
            if config.is_sandbox() {
                log::warn!("Running in SANDBOX mode. No real SMS messages will be delivered.");
            }
        }

        Ok(Self {
            config,
            simulator,
            http_client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            initialized: self.is_configured(),
            username: self.config.account_id.clone(),
            api_key_configured: self.is_configured(),
            sandbox: self.config.is_sandbox(),
        }
    }

    /// Una llamada real al proveedor, sin degradar.
    pub async fn submit(&self, api_key: &str, message: &str, phone_number: &str) -> GatewayResult {
        let form = [
            ("username", self.config.account_id.as_str()),
            ("to", phone_number),
            ("message", message),
        ];

        let resp = match self
            .http_client
            .post(self.config.messaging_url())
            .header("Accept", "application/json")
            .header("ApiKey", api_key)
            .form(&form)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                return GatewayResult::TransportFailure {
                    reason: format!("Request timeout: {}", e),
                }
            }
            Err(e) => {
                return GatewayResult::TransportFailure {
                    reason: format!("Request failed: {}", e),
                }
            }
        };

        let status = resp.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body_txt = resp.text().await.unwrap_or_default();
            return GatewayResult::TransportFailure {
                reason: format!("HTTP {}: {}", status.as_u16(), body_txt),
            };
        }

        match resp.json::<MessagingResponse>().await {
            Ok(body) => interpret_response(body),
            Err(e) => GatewayResult::TransportFailure {
                reason: format!("Malformed response body: {}", e),
            },
        }
    }

    fn live_api_key(&self) -> Option<&str> {
        if self.config.is_configured() {
            self.config.api_key.as_deref().map(str::trim)
        } else {
            None
        }
    }
}

#[async_trait]
impl SmsGateway for AfricasTalkingGateway {
    async fn send(&self, message: &str, phone_number: &str) -> Result<MessageOutcome> {
        let Some(api_key) = self.live_api_key() else {
            return Ok(self.simulator.simulate(phone_number).await);
        };

        log::info!("(send) Sending SMS to {} using direct API call", phone_number);

        let outcome = match self.submit(api_key, message, phone_number).await {
            GatewayResult::Success { message_id, cost } => {
                MessageOutcome::delivered(phone_number, message_id, cost)
            }
            GatewayResult::ProviderFailure { reason } => {
                log::warn!(
                    "(send) El proveedor rechazó el envío a {}: {}",
                    phone_number,
                    reason
                );
                MessageOutcome::failed(phone_number, reason)
            }
            GatewayResult::TransportFailure { reason } => {
                log::warn!(
                    "(send) API call failed for {} ({}), simulating SMS",
                    phone_number,
                    reason
                );
                SimulationService::degraded_success(phone_number)
            }
        };

        Ok(outcome)
    }
}

fn interpret_response(body: MessagingResponse) -> GatewayResult {
    let Some(recipient) = body.data.recipients.into_iter().next() else {
        // Sin destinatarios: el proveedor explica el motivo en "Message"
        return match body.data.message.filter(|m| !m.trim().is_empty()) {
            Some(reason) => GatewayResult::ProviderFailure { reason },
            None => GatewayResult::TransportFailure {
                reason: "Unexpected response format: no recipients".to_string(),
            },
        };
    };

    if recipient.status != "Success" {
        return GatewayResult::ProviderFailure {
            reason: recipient.status,
        };
    }

    match recipient.message_id.filter(|id| !id.is_empty() && id != "None") {
        Some(message_id) => GatewayResult::Success {
            message_id,
            cost: recipient.cost,
        },
        None => GatewayResult::TransportFailure {
            reason: "Unexpected response format: missing messageId".to_string(),
        },
    }
}
