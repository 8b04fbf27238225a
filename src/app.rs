//! app.rs
use crate::handlers::{campaign_handler, sms_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/sms")
                    .route("/send", web::post().to(sms_handler::send_sms_endpoint))
                    .route("/status", web::get().to(sms_handler::sms_status_endpoint)),
            )
            .service(
                web::scope("/campaigns")
                    .route(
                        "/{id}",
                        web::get().to(campaign_handler::get_campaign_endpoint),
                    )
                    .route(
                        "/{id}/records",
                        web::get().to(campaign_handler::list_campaign_records_endpoint),
                    ),
            ),
    );
}
