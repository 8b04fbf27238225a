//! handlers/sms_handler.rs
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::{models::sms_model::SendSmsRequest, services::sms_service::SmsService};

/// POST /api/sms/send
pub async fn send_sms_endpoint(
    sms_service: web::Data<SmsService>,
    body: web::Json<SendSmsRequest>,
) -> HttpResponse {
    let req_data = body.into_inner();

    if req_data.message.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "Message is required"
        }));
    }
    if req_data.recipients.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "At least one phone number is required"
        }));
    }

    match sms_service.send_bulk(req_data).await {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => {
            log::error!("Bulk SMS error: {:?}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": format!("{:#}", e)
            }))
        }
    }
}

/// GET /api/sms/status
pub async fn sms_status_endpoint(sms_service: web::Data<SmsService>) -> HttpResponse {
    HttpResponse::Ok().json(sms_service.status())
}
