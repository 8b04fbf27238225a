//! handlers/campaign_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::services::campaign_service::CampaignService;

/// GET /api/campaigns/{id}
pub async fn get_campaign_endpoint(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<i64>,
) -> HttpResponse {
    let campaign_id = path.into_inner();

    match campaign_service.get_campaign(campaign_id).await {
        Ok(Some(campaign)) => HttpResponse::Ok().json(campaign),
        Ok(None) => HttpResponse::NotFound().json(json!({
            "error": "Campaign not found",
            "campaign_id": campaign_id
        })),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}

/// GET /api/campaigns/{id}/records
pub async fn list_campaign_records_endpoint(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<i64>,
) -> HttpResponse {
    let campaign_id = path.into_inner();

    match campaign_service.get_campaign(campaign_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({
                "error": "Campaign not found",
                "campaign_id": campaign_id
            }))
        }
        Err(e) => {
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error",
                "details": format!("{:?}", e)
            }))
        }
    }

    match campaign_service.list_records(campaign_id).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}
