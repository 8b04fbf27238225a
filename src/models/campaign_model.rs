use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CampaignRecord {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub total_recipients: i64,
    pub status: String, // "pending", "running", "completed", "failed"
    pub successful_count: i64,
    pub failed_count: i64,
    pub total_cost: f64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Request para crear una campaña
#[derive(Debug, Clone)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub message: String,
    pub total_recipients: usize,
}
