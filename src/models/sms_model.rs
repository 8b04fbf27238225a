use serde::{Deserialize, Deserializer, Serialize};

/// Entrada del motor de despacho.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub message: String,
    /// Puede traer duplicados; el orden solo importa para el progreso.
    pub recipients: Vec<String>,
    pub campaign_id: Option<i64>,
}

impl DispatchRequest {
    pub fn new(message: impl Into<String>, recipients: Vec<String>) -> Self {
        DispatchRequest {
            message: message.into(),
            recipients,
            campaign_id: None,
        }
    }

    pub fn for_campaign(mut self, campaign_id: i64) -> Self {
        self.campaign_id = Some(campaign_id);
        self
    }
}

/// Resultado de un envío a un destinatario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageOutcome {
    pub phone_number: String,
    pub success: bool,
    pub provider_message_id: Option<String>,
    pub cost: Option<String>, // texto tal cual lo reporta el proveedor, ej. "KES 0.8000"
    pub error: Option<String>,
    pub simulated: bool,
}

impl MessageOutcome {
    pub fn delivered(
        phone_number: &str,
        message_id: impl Into<String>,
        cost: Option<String>,
    ) -> Self {
        MessageOutcome {
            phone_number: phone_number.to_string(),
            success: true,
            provider_message_id: Some(message_id.into()),
            cost,
            error: None,
            simulated: false,
        }
    }

    pub fn failed(phone_number: &str, error: impl Into<String>) -> Self {
        MessageOutcome {
            phone_number: phone_number.to_string(),
            success: false,
            provider_message_id: None,
            cost: None,
            error: Some(error.into()),
            simulated: false,
        }
    }

    pub fn simulated(mut self) -> Self {
        self.simulated = true;
        self
    }
}

/// Resultado crudo de una llamada real al proveedor.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResult {
    Success {
        message_id: String,
        cost: Option<String>,
    },
    /// El proveedor respondió bien pero rechazó el destinatario
    ProviderFailure { reason: String },
    /// Red, timeout, status fuera de 200/201 o cuerpo malformado
    TransportFailure { reason: String },
}

/// Reporte agregado del lote.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub successful_count: usize,
    pub failed_count: usize,
    pub total_cost: f64,
    pub details: Vec<MessageOutcome>,
}

impl DispatchReport {
    /// Agrega un resultado y devuelve el costo que aportó (0 si falló o no se pudo parsear).
    pub fn record(&mut self, outcome: MessageOutcome) -> f64 {
        let mut contributed = 0.0;
        if outcome.success {
            self.successful_count += 1;
            contributed = outcome.cost.as_deref().and_then(parse_cost).unwrap_or(0.0);
            self.total_cost += contributed;
        } else {
            self.failed_count += 1;
        }
        self.details.push(outcome);
        contributed
    }
}

/// "KES 0.8000" / "USD 0.05" / "0.5" -> f64. Negativos o basura -> None.
pub fn parse_cost(raw: &str) -> Option<f64> {
    let cleaned = raw.replace("KES", "").replace("USD", "");
    let value: f64 = cleaned.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Request del endpoint POST /api/sms/send
#[derive(Debug, Clone, Deserialize)]
pub struct SendSmsRequest {
    pub message: String,
    /// Acepta lista JSON o texto libre ("a, b\nc")
    #[serde(deserialize_with = "deserialize_recipients")]
    pub recipients: Vec<String>,
    pub campaign_name: Option<String>,
    /// Si es false no se crea campaña ni se guardan registros
    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_persist() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecipientsInput {
    List(Vec<String>),
    Text(String),
}

fn deserialize_recipients<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match RecipientsInput::deserialize(deserializer)? {
        RecipientsInput::List(items) => items
            .iter()
            .flat_map(|item| parse_recipients(item))
            .collect(),
        RecipientsInput::Text(text) => parse_recipients(&text),
    };
    Ok(parsed)
}

/// Separa por comas, punto y coma o saltos de línea. Conserva orden y duplicados.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c == ';' || c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct SendSmsResponse {
    pub success: bool,
    pub campaign_id: Option<i64>,
    pub report: DispatchReport,
}

/// Estado del servicio (GET /api/sms/status)
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub initialized: bool,
    pub username: String,
    pub api_key_configured: bool,
    pub sandbox: bool,
}
